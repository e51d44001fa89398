//! Raw entropy sampling from a rendered frame.

use zeroize::Zeroizing;

use crate::noise::{draw, Clock, NoiseSource};
use crate::simulation::PixelBuffer;

/// Bytes of monotonic-clock jitter appended to every sample.
pub const JITTER_BYTES: usize = 8;

/// Bytes of fresh randomness appended to every sample.
pub const NOISE_BYTES: usize = 32;

/// Length of a sample taken from a `width` x `height` frame at `quality`.
///
/// A quality of zero is treated as one.
pub fn sample_len(width: u32, height: u32, quality: usize) -> usize {
    let q = quality.max(1);
    (height as usize).div_ceil(q) * (width as usize).div_ceil(q) + JITTER_BYTES + NOISE_BYTES
}

/// Grayscale pixels on a `quality` grid, then clock jitter, then noise.
pub(super) fn sample(
    buffer: Option<&PixelBuffer>,
    quality: usize,
    clock: &dyn Clock,
    noise: &dyn NoiseSource,
) -> Zeroizing<Vec<u8>> {
    let Some(buffer) = buffer else {
        return Zeroizing::new(Vec::new());
    };
    let q = quality.max(1);

    let mut out = Zeroizing::new(Vec::with_capacity(sample_len(
        buffer.width(),
        buffer.height(),
        q,
    )));

    for y in (0..buffer.height()).step_by(q) {
        for x in (0..buffer.width()).step_by(q) {
            let [r, g, b] = buffer.rgb_at(x, y).unwrap_or_default();
            let gray = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
            out.push(gray as u8);
        }
    }

    let ticks = u64::try_from(clock.now().as_nanos()).unwrap_or(u64::MAX);
    out.extend_from_slice(&ticks.to_le_bytes());

    let fresh = draw::<NOISE_BYTES>(noise);
    out.extend_from_slice(fresh.as_ref());

    out
}
