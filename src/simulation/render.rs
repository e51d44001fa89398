//! Software rasterizer for the blob field.
//!
//! Rendering is a pure function of blob state and consumes no randomness.

use super::{Blob, PixelBuffer, Rgb};

const BACKGROUND: Rgb = Rgb::new(12, 12, 20);

/// Warm wash laid over the whole lamp to fake light diffusion.
const DIFFUSION_COLOR: Rgb = Rgb::new(255, 140, 0);
const DIFFUSION_ALPHA: f32 = 0.06;

/// Number of rings a blob's glow is drawn with.
const GLOW_RINGS: i64 = 12;

/// Renders blobs onto a fresh `width` x `height` buffer.
pub fn render(width: u32, height: u32, blobs: &[Blob]) -> PixelBuffer {
    let mut buf = PixelBuffer::filled(width, height, BACKGROUND);
    let short_side = f64::from(width.min(height));

    for blob in blobs {
        let cx = (blob.x * f64::from(width)) as i64;
        let cy = (blob.y * f64::from(height)) as i64;
        let r = (blob.radius * short_side) as i64;
        draw_soft_blob(&mut buf, cx, cy, r, blob.color);
    }

    let (w, h) = (i64::from(width), i64::from(height));
    let (rx, ry) = ((w / 2) / 2, (h / 2) / 2);
    fill_ellipse(
        &mut buf,
        (w / 4 + rx) as f64,
        (h / 4 + ry) as f64,
        rx as f64,
        ry as f64,
        DIFFUSION_COLOR,
        DIFFUSION_ALPHA,
    );

    buf
}

/// Concentric discs from the rim inward: outer rings are faint and dim,
/// inner rings opaque and brighter.
fn draw_soft_blob(buf: &mut PixelBuffer, cx: i64, cy: i64, r: i64, color: Rgb) {
    if r <= 0 {
        return;
    }
    let step = (r / GLOW_RINGS).max(1) as usize;

    for i in (1..=r).rev().step_by(step) {
        let depth = i as f64 / r as f64;
        let alpha = (depth as f32 * 0.6).max(0.02);
        let shade = color.scaled(1.0 + 0.25 * (1.0 - depth));
        fill_ellipse(buf, cx as f64, cy as f64, i as f64, i as f64, shade, alpha);
    }
}

/// Blends every pixel whose center lies inside the ellipse.
fn fill_ellipse(buf: &mut PixelBuffer, cx: f64, cy: f64, rx: f64, ry: f64, color: Rgb, alpha: f32) {
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let x0 = (cx - rx).floor().max(0.0) as u32;
    let y0 = (cy - ry).floor().max(0.0) as u32;
    let x1 = ((cx + rx).ceil().max(0.0) as u32).min(buf.width());
    let y1 = ((cy + ry).ceil().max(0.0) as u32).min(buf.height());

    for y in y0..y1 {
        let dy = (f64::from(y) + 0.5 - cy) / ry;
        for x in x0..x1 {
            let dx = (f64::from(x) + 0.5 - cx) / rx;
            if dx * dx + dy * dy <= 1.0 {
                buf.blend(x, y, color, alpha);
            }
        }
    }
}
