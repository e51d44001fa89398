//! Prometheus metrics for the lamp pool.
//!
//! # Metrics Exposed
//!
//! - `lava_entropy_lamps` - Number of lamps in the pool
//! - `lava_entropy_generation_cycles_total` - Completed generation cycles
//! - `lava_entropy_frames_rendered_total` - Simulation steps across all lamps
//! - `lava_entropy_bytes_generated_total` - Bytes produced by lamps before mixing
//! - `lava_entropy_snapshots_saved_total` - Snapshot events accepted by the sink
//! - `lava_entropy_snapshot_failures_total` - Snapshot events the sink rejected
//!
//! # Example
//!
//! ```no_run
//! use lava_entropy::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     lamps: 10,
//!     generation_cycles: 40,
//!     frames_rendered: 400,
//!     bytes_generated: 1280,
//!     snapshots_saved: 8,
//!     snapshot_failures: 0,
//! };
//!
//! registry.update(&snapshot);
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
