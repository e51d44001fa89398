//! Multi-lamp pool and XOR mixer.
//!
//! Holds a fixed set of lamps keyed by id and combines their outputs so
//! that one healthy lamp is enough for the combined stream to be uniform.

mod mixer;

pub use mixer::{
    xor_into, LampPool, LampSelection, PoolConfig, PoolError, PoolStats, MAX_REQUEST_BYTES,
};
