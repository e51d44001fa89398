//! The blob-field simulator.

use std::sync::Arc;
use std::time::Duration;

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use sha2::{Digest, Sha256};

use super::{render, Blob, ColorMode, PixelBuffer};
use crate::noise::Clock;

/// Per-tick velocity damping.
pub const DAMPING: f64 = 0.999;

/// Fraction of speed kept after hitting a wall.
const RESTITUTION: f64 = 0.6;

/// Half-width of the per-tick velocity perturbation.
const JITTER: f64 = 0.01;

/// Lower bound on a tick's time delta, in seconds.
const MIN_DT: f64 = 1e-6;

/// Fixed parameters of a blob field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Number of blobs.
    pub blobs: usize,
    /// How blobs are colored.
    pub colors: ColorMode,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 192,
            blobs: 12,
            colors: ColorMode::RandomPerBlob,
        }
    }
}

/// Simulates a field of soft bouncing blobs.
///
/// All randomness comes from a private ChaCha20 stream derived from the
/// construction seed, and only [`BlobField::step`] consumes it. Given the
/// same seed and the same sequence of clock readings, two fields produce
/// identical frames.
pub struct BlobField {
    width: u32,
    height: u32,
    blobs: Vec<Blob>,
    rng: ChaCha20Rng,
    clock: Arc<dyn Clock>,
    last_update: Duration,
    steps: u64,
}

impl BlobField {
    /// Creates a field whose private random stream is derived from `seed`.
    pub fn new(config: &FieldConfig, seed: &[u8], clock: Arc<dyn Clock>) -> Self {
        let mut rng = ChaCha20Rng::from_seed(Sha256::digest(seed).into());

        let blobs = (0..config.blobs)
            .map(|i| {
                let x = 0.2 + unit(&mut rng) * 0.6;
                let y = 0.2 + unit(&mut rng) * 0.6;
                let vx = (unit(&mut rng) - 0.5) * 0.2;
                let vy = (unit(&mut rng) - 0.5) * 0.2;
                let radius = 0.08 + unit(&mut rng) * 0.2;
                let color = config.colors.pick(i, &mut rng);
                Blob {
                    x,
                    y,
                    vx,
                    vy,
                    radius,
                    color,
                }
            })
            .collect();

        let last_update = clock.now();

        tracing::debug!(
            width = config.width,
            height = config.height,
            blobs = config.blobs,
            colors = ?config.colors,
            "Blob field created"
        );

        Self {
            width: config.width,
            height: config.height,
            blobs,
            rng,
            clock,
            last_update,
            steps: 0,
        }
    }

    /// Advances every blob by one tick and renders the result.
    pub fn step(&mut self) -> PixelBuffer {
        let now = self.clock.now();
        let dt = now.saturating_sub(self.last_update).as_secs_f64().max(MIN_DT);
        self.last_update = now;

        for blob in &mut self.blobs {
            let jitter_x = (unit(&mut self.rng) - 0.5) * 2.0 * JITTER;
            let jitter_y = (unit(&mut self.rng) - 0.5) * 2.0 * JITTER;
            blob.advance((jitter_x, jitter_y), DAMPING, dt, RESTITUTION);
        }
        self.steps += 1;

        tracing::trace!(step = self.steps, dt, "Blob field stepped");

        self.render()
    }

    /// Renders the current state without advancing it.
    pub fn render(&self) -> PixelBuffer {
        render(self.width, self.height, &self.blobs)
    }

    /// Returns the blobs in construction order.
    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    /// Returns the canvas width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the canvas height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the number of completed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl std::fmt::Debug for BlobField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobField")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("blobs", &self.blobs.len())
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

/// Uniform draw in [0, 1) with 53 bits of precision.
pub(crate) fn unit(rng: &mut impl RngCore) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}
