//! Process-level randomness and timing sources.
//!
//! Every component that needs fresh cryptographic bytes or a monotonic
//! timestamp receives them through the capabilities defined here, so tests
//! can substitute deterministic stand-ins while production code uses the
//! operating system.

mod clock;
mod random;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use random::{draw, NoiseSource, OsNoise, SeededNoise};
