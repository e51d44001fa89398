//! Lamp instances.
//!
//! A lamp pairs one blob-field simulator with one DRBG and runs the
//! diffusion, conditioning, reseed and generate cycle behind a single lock.

mod instance;
mod snapshot;

pub use instance::{
    LampConfig, LampError, LampInstance, LampServices, LampStats, DIFFUSION_STEPS,
    SYSTEM_NOISE_BYTES,
};
pub use snapshot::{ChannelSink, LogSink, NullSink, SnapshotError, SnapshotEvent, SnapshotSink};
