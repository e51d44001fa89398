//! One simulator plus one DRBG behind a single lock.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use thiserror::Error;

use super::snapshot::{SnapshotEvent, SnapshotSink};
use crate::conditioning::{Conditioner, HashAlgorithm};
use crate::drbg::HmacDrbg;
use crate::noise::{draw, Clock, NoiseSource};
use crate::simulation::{BlobField, FieldConfig, PixelBuffer};

/// Discarded simulation steps between conditioning samples.
pub const DIFFUSION_STEPS: usize = 6;

/// Fresh system randomness mixed into every reseed.
pub const SYSTEM_NOISE_BYTES: usize = 16;

/// Errors surfaced by a lamp.
#[derive(Debug, Error)]
pub enum LampError {
    /// A previous call panicked while holding the lamp; its state can no
    /// longer be trusted.
    #[error("lamp {id} state lock poisoned")]
    Poisoned { id: u32 },
}

/// Fixed per-lamp parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LampConfig {
    /// Simulator canvas, blob count and colors.
    pub field: FieldConfig,
    /// Sampling stride. Zero is treated as one.
    pub quality: usize,
    /// Whitening hash.
    pub hash: HashAlgorithm,
    /// Emit a snapshot every this many generation cycles. Zero disables.
    pub snapshot_interval: u64,
}

impl Default for LampConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            quality: 8,
            hash: HashAlgorithm::Sha256,
            snapshot_interval: 5,
        }
    }
}

/// Process-level capabilities shared by every lamp.
#[derive(Clone)]
pub struct LampServices {
    /// Cryptographic randomness for samples and system noise.
    pub noise: Arc<dyn NoiseSource>,
    /// Monotonic clock for physics deltas and sample jitter.
    pub clock: Arc<dyn Clock>,
    /// Persistence collaborator for periodic snapshots.
    pub sink: Arc<dyn SnapshotSink>,
}

impl LampServices {
    /// OS randomness, the wall clock and no snapshot persistence.
    pub fn system() -> Self {
        Self {
            noise: Arc::new(crate::noise::OsNoise),
            clock: Arc::new(crate::noise::MonotonicClock::new()),
            sink: Arc::new(super::NullSink),
        }
    }

    /// Replaces the snapshot sink.
    pub fn with_sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.sink = sink;
        self
    }
}

impl std::fmt::Debug for LampServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LampServices").finish_non_exhaustive()
    }
}

/// Counters describing a lamp's activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LampStats {
    /// Lamp id.
    pub id: u32,
    /// Completed generation cycles.
    pub generation: u64,
    /// Simulation steps taken, for display and diffusion alike.
    pub frames_rendered: u64,
    /// Random bytes handed out.
    pub bytes_generated: u64,
    /// Snapshot events accepted by the sink.
    pub snapshots_saved: u64,
    /// Snapshot events the sink rejected.
    pub snapshot_failures: u64,
}

struct LampState {
    field: BlobField,
    drbg: HmacDrbg,
    generation: u64,
    bytes_generated: u64,
    snapshots_saved: u64,
    snapshot_failures: u64,
}

/// An independent simulator and DRBG pairing.
///
/// The two public operations, [`render_frame`](Self::render_frame) and
/// [`mix_and_generate`](Self::mix_and_generate), each hold the lamp's lock
/// for their whole body, so they never interleave on one lamp. Distinct
/// lamps share nothing mutable and may run fully in parallel.
pub struct LampInstance {
    id: u32,
    quality: usize,
    snapshot_interval: u64,
    conditioner: Conditioner,
    noise: Arc<dyn NoiseSource>,
    sink: Arc<dyn SnapshotSink>,
    state: Mutex<LampState>,
}

impl LampInstance {
    /// Builds a lamp whose simulator is seeded from `initial_seed`.
    ///
    /// The DRBG is instantiated from the whitened sample of the first
    /// rendered frame.
    pub fn new(id: u32, config: &LampConfig, initial_seed: &[u8], services: &LampServices) -> Self {
        let quality = config.quality.max(1);
        let conditioner = Conditioner::new(
            config.hash,
            Arc::clone(&services.noise),
            Arc::clone(&services.clock),
        );

        let mut field = BlobField::new(&config.field, initial_seed, Arc::clone(&services.clock));
        let first = field.step();
        let sample = conditioner.sample(Some(&first), quality);
        let seed = conditioner.whiten(&sample);
        let drbg = HmacDrbg::new(seed.as_bytes());

        tracing::debug!(
            lamp = id,
            quality,
            sample_bytes = sample.len(),
            "Lamp instantiated"
        );

        Self {
            id,
            quality,
            snapshot_interval: config.snapshot_interval,
            conditioner,
            noise: Arc::clone(&services.noise),
            sink: Arc::clone(&services.sink),
            state: Mutex::new(LampState {
                field,
                drbg,
                generation: 0,
                bytes_generated: 0,
                snapshots_saved: 0,
                snapshot_failures: 0,
            }),
        }
    }

    /// Returns the lamp id.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Returns the effective sampling stride.
    pub fn quality(&self) -> usize {
        self.quality
    }

    /// Advances the simulator one step and returns the frame.
    ///
    /// Does not touch the DRBG.
    pub fn render_frame(&self) -> Result<PixelBuffer, LampError> {
        let mut state = self.lock()?;
        Ok(state.field.step())
    }

    /// Runs one full generation cycle and returns `n` random bytes.
    ///
    /// 1. Step the simulator [`DIFFUSION_STEPS`] times, discarding frames.
    /// 2. Render one more frame, sample it and whiten the sample.
    /// 3. Draw [`SYSTEM_NOISE_BYTES`] of system noise and whiten
    ///    `whitened_sample || noise`.
    /// 4. Reseed the DRBG with that digest.
    /// 5. Generate `n` bytes.
    /// 6. Bump the generation counter and, on every
    ///    `snapshot_interval`-th cycle, hand the frame to the sink.
    pub fn mix_and_generate(&self, n: usize) -> Result<Vec<u8>, LampError> {
        let mut state = self.lock()?;

        for _ in 0..DIFFUSION_STEPS {
            state.field.step();
        }

        let frame = state.field.step();
        let whitened = {
            let sample = self.conditioner.sample(Some(&frame), self.quality);
            self.conditioner.whiten(&sample)
        };

        let system_noise = draw::<SYSTEM_NOISE_BYTES>(self.noise.as_ref());
        let material = self
            .conditioner
            .whiten_pair(whitened.as_bytes(), system_noise.as_ref());

        state.drbg.reseed(Some(material.as_bytes()));
        let output = state.drbg.generate(n);

        state.generation += 1;
        state.bytes_generated += n as u64;

        tracing::debug!(
            lamp = self.id,
            generation = state.generation,
            bytes = n,
            "Generation cycle complete"
        );

        if self.snapshot_interval > 0 && state.generation % self.snapshot_interval == 0 {
            self.emit_snapshot(&mut state, frame);
        }

        Ok(output)
    }

    /// Returns a copy of the lamp's counters.
    pub fn stats(&self) -> Result<LampStats, LampError> {
        let state = self.lock()?;
        Ok(LampStats {
            id: self.id,
            generation: state.generation,
            frames_rendered: state.field.steps(),
            bytes_generated: state.bytes_generated,
            snapshots_saved: state.snapshots_saved,
            snapshot_failures: state.snapshot_failures,
        })
    }

    fn emit_snapshot(&self, state: &mut LampState, frame: PixelBuffer) {
        let event = SnapshotEvent {
            lamp: self.id,
            generation: state.generation,
            captured_at: Utc::now(),
            frame,
        };

        match self.sink.save(event) {
            Ok(()) => state.snapshots_saved += 1,
            Err(e) => {
                state.snapshot_failures += 1;
                tracing::warn!(
                    lamp = self.id,
                    generation = state.generation,
                    error = %e,
                    "Snapshot save failed"
                );
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LampState>, LampError> {
        self.state
            .lock()
            .map_err(|_| LampError::Poisoned { id: self.id })
    }
}

impl std::fmt::Debug for LampInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LampInstance")
            .field("id", &self.id)
            .field("quality", &self.quality)
            .field("conditioner", &self.conditioner)
            .finish_non_exhaustive()
    }
}
