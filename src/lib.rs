//! Lava Entropy Library
//!
//! A cryptographically secure random byte service whose seed material comes
//! from a simulated lava lamp. Each lamp pairs a blob-field simulator with an
//! HMAC-SHA256 DRBG; a pool XOR-combines the outputs of many lamps.
//!
//! # Architecture
//!
//! Every generation cycle follows an explicit data flow:
//!
//! ```text
//! simulation → conditioning → drbg → pool (XOR mix)
//!      ↑             ↑
//!    clock    noise (OS randomness)
//! ```
//!
//! # Design Principles
//!
//! - **The simulation is a mixing source**: pixels are hashed together with
//!   clock jitter and fresh OS randomness, so output strength rests on the OS
//!   source and HMAC-SHA256, not on the physics
//! - **Independent lamps**: each lamp owns its simulator and DRBG behind its
//!   own lock; lamps run in parallel and share nothing mutable
//! - **Injectable capabilities**: randomness, time and snapshot persistence
//!   are passed in, so every component can be driven deterministically
//! - **Sensitive buffers are wiped**: DRBG state, whitened seeds and raw
//!   samples are zeroed when dropped
//!
//! # Example
//!
//! ```no_run
//! use lava_entropy::{LampPool, LampSelection, LampServices, PoolConfig};
//!
//! let pool = LampPool::from_config(&PoolConfig::default(), &LampServices::system());
//!
//! let bytes = pool.combined_random(32, LampSelection::All).unwrap();
//! println!("{}", hex::encode(bytes));
//!
//! let frame = pool.frame_for(0).unwrap();
//! assert_eq!(frame.width(), 256);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod conditioning;
pub mod config;
pub mod drbg;
pub mod lamp;
pub mod metrics;
pub mod noise;
pub mod pool;
#[cfg(feature = "server")]
pub mod server;
pub mod simulation;

// Re-export commonly used types at crate root
pub use analysis::ByteStatistics;
pub use conditioning::{Conditioner, HashAlgorithm, WhitenedSeed};
pub use config::FileConfig;
pub use drbg::HmacDrbg;
pub use lamp::{LampConfig, LampError, LampInstance, LampServices, SnapshotSink};
pub use noise::{Clock, NoiseSource};
pub use pool::{LampPool, LampSelection, PoolConfig, PoolError};
pub use simulation::{BlobField, FieldConfig, PixelBuffer};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
