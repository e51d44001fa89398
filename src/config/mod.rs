//! File-based configuration.
//!
//! The pool is built once at startup from a TOML file (or defaults) and is
//! never reconfigured at runtime.

mod file;

pub use file::{ConfigError, FileConfig, LampSection, PoolSection, ServerSection, SnapshotSection};
