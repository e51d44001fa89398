//! Metrics collection and registry.

use std::sync::{Mutex, PoisonError};

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

use crate::pool::PoolStats;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of pool state for metrics update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Lamps in the pool.
    pub lamps: usize,
    /// Completed generation cycles across all lamps.
    pub generation_cycles: u64,
    /// Simulation steps across all lamps.
    pub frames_rendered: u64,
    /// Bytes generated by lamps before mixing.
    pub bytes_generated: u64,
    /// Snapshot events accepted.
    pub snapshots_saved: u64,
    /// Snapshot events rejected.
    pub snapshot_failures: u64,
}

impl MetricsSnapshot {
    /// Creates a snapshot from pool counters.
    pub fn from_pool_stats(stats: &PoolStats) -> Self {
        Self {
            lamps: stats.lamps.len(),
            generation_cycles: stats.generations(),
            frames_rendered: stats.frames_rendered(),
            bytes_generated: stats.bytes_generated(),
            snapshots_saved: stats.snapshots_saved(),
            snapshot_failures: stats.snapshot_failures(),
        }
    }
}

/// Prometheus metrics registry for the lamp pool.
///
/// Safe to update from concurrent scrapes: updates are serialized so each
/// counter moves to the snapshot total exactly once.
pub struct MetricsRegistry {
    registry: Registry,
    update_lock: Mutex<()>,
    lamps: IntGauge,
    generation_cycles: IntCounter,
    frames_rendered: IntCounter,
    bytes_generated: IntCounter,
    snapshots_saved: IntCounter,
    snapshot_failures: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new registry with all pool metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let lamps = IntGauge::new("lava_entropy_lamps", "Number of lamps in the pool")?;
        let generation_cycles = IntCounter::new(
            "lava_entropy_generation_cycles_total",
            "Completed generation cycles across all lamps",
        )?;
        let frames_rendered = IntCounter::new(
            "lava_entropy_frames_rendered_total",
            "Simulation steps across all lamps",
        )?;
        let bytes_generated = IntCounter::new(
            "lava_entropy_bytes_generated_total",
            "Bytes produced by lamps before mixing",
        )?;
        let snapshots_saved = IntCounter::new(
            "lava_entropy_snapshots_saved_total",
            "Snapshot events accepted by the sink",
        )?;
        let snapshot_failures = IntCounter::new(
            "lava_entropy_snapshot_failures_total",
            "Snapshot events rejected by the sink",
        )?;

        registry.register(Box::new(lamps.clone()))?;
        registry.register(Box::new(generation_cycles.clone()))?;
        registry.register(Box::new(frames_rendered.clone()))?;
        registry.register(Box::new(bytes_generated.clone()))?;
        registry.register(Box::new(snapshots_saved.clone()))?;
        registry.register(Box::new(snapshot_failures.clone()))?;

        Ok(Self {
            registry,
            update_lock: Mutex::new(()),
            lamps,
            generation_cycles,
            frames_rendered,
            bytes_generated,
            snapshots_saved,
            snapshot_failures,
        })
    }

    /// Updates all metrics from a snapshot of pool state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // Read-then-increment below must not interleave with another update
        let _guard = self.update_lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.lamps.set(snapshot.lamps as i64);

        // Counters only move forward, so increment by the difference
        advance(&self.generation_cycles, snapshot.generation_cycles);
        advance(&self.frames_rendered, snapshot.frames_rendered);
        advance(&self.bytes_generated, snapshot.bytes_generated);
        advance(&self.snapshots_saved, snapshot.snapshots_saved);
        advance(&self.snapshot_failures, snapshot.snapshot_failures);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lamp::LampStats;

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            lamps: 3,
            generation_cycles: 12,
            frames_rendered: 90,
            bytes_generated: 384,
            snapshots_saved: 2,
            snapshot_failures: 1,
        };
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("lava_entropy_lamps 3"));
        assert!(output.contains("lava_entropy_generation_cycles_total 12"));
        assert!(output.contains("lava_entropy_snapshot_failures_total 1"));
    }

    #[test]
    fn test_counters_never_go_backwards() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&MetricsSnapshot {
            generation_cycles: 10,
            ..Default::default()
        });
        registry.update(&MetricsSnapshot {
            generation_cycles: 4,
            ..Default::default()
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("lava_entropy_generation_cycles_total 10"));
    }

    #[test]
    fn test_concurrent_updates_do_not_overcount() {
        let registry = MetricsRegistry::new().unwrap();
        let snapshot = MetricsSnapshot {
            lamps: 2,
            generation_cycles: 1_000,
            frames_rendered: 7_000,
            bytes_generated: 32_000,
            snapshots_saved: 200,
            snapshot_failures: 3,
        };

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..50 {
                        registry.update(&snapshot);
                    }
                });
            }
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("lava_entropy_generation_cycles_total 1000"));
        assert!(output.contains("lava_entropy_frames_rendered_total 7000"));
        assert!(output.contains("lava_entropy_bytes_generated_total 32000"));
        assert!(output.contains("lava_entropy_snapshots_saved_total 200"));
        assert!(output.contains("lava_entropy_snapshot_failures_total 3"));
    }

    #[test]
    fn test_snapshot_from_pool_stats() {
        let stats = PoolStats {
            lamps: vec![
                LampStats {
                    id: 0,
                    generation: 2,
                    frames_rendered: 15,
                    bytes_generated: 64,
                    snapshots_saved: 0,
                    snapshot_failures: 0,
                },
                LampStats {
                    id: 1,
                    generation: 5,
                    frames_rendered: 36,
                    bytes_generated: 160,
                    snapshots_saved: 1,
                    snapshot_failures: 0,
                },
            ],
        };

        let snapshot = MetricsSnapshot::from_pool_stats(&stats);
        assert_eq!(snapshot.lamps, 2);
        assert_eq!(snapshot.generation_cycles, 7);
        assert_eq!(snapshot.frames_rendered, 51);
        assert_eq!(snapshot.bytes_generated, 224);
        assert_eq!(snapshot.snapshots_saved, 1);
    }
}
