//! Snapshot events for the persistence collaborator.
//!
//! Every few generation cycles a lamp hands its conditioning frame to a
//! [`SnapshotSink`]. Sinks must return quickly; a failing sink is logged and
//! never interrupts generation.

use std::sync::mpsc::Sender;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::simulation::PixelBuffer;

/// Errors a sink may report.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot receiver disconnected")]
    Disconnected,
    #[error("snapshot sink failed: {0}")]
    Failed(String),
}

/// A frame captured at the end of a generation cycle.
#[derive(Debug, Clone)]
pub struct SnapshotEvent {
    /// Lamp that produced the frame.
    pub lamp: u32,
    /// Generation counter after the cycle completed.
    pub generation: u64,
    /// Wall-clock capture time.
    pub captured_at: DateTime<Utc>,
    /// The frame that was sampled for conditioning.
    pub frame: PixelBuffer,
}

impl SnapshotEvent {
    /// Suggested file stem, e.g. `lamp3_gen000010_20240101_120000_123`.
    pub fn file_stem(&self) -> String {
        format!(
            "lamp{}_gen{:06}_{}",
            self.lamp,
            self.generation,
            self.captured_at.format("%Y%m%d_%H%M%S_%3f")
        )
    }
}

/// Receives snapshot events.
///
/// [`save`](Self::save) is called from inside
/// [`LampInstance::mix_and_generate`](super::LampInstance::mix_and_generate)
/// while that lamp's lock is held. Implementations must not block: no file
/// or network I/O, no waiting on bounded queues. A slow sink stalls every
/// caller of that lamp, including [`render_frame`](super::LampInstance::render_frame).
/// Sinks that persist frames should hand them to another thread, as
/// [`ChannelSink`] does.
pub trait SnapshotSink: Send + Sync {
    /// Accepts one event and returns without blocking.
    fn save(&self, event: SnapshotEvent) -> Result<(), SnapshotError>;
}

/// Discards every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn save(&self, _event: SnapshotEvent) -> Result<(), SnapshotError> {
        Ok(())
    }
}

/// Logs snapshot metadata and drops the frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SnapshotSink for LogSink {
    fn save(&self, event: SnapshotEvent) -> Result<(), SnapshotError> {
        tracing::info!(
            lamp = event.lamp,
            generation = event.generation,
            width = event.frame.width(),
            height = event.frame.height(),
            name = %event.file_stem(),
            "Snapshot captured"
        );
        Ok(())
    }
}

/// Forwards events over a channel to a writer running elsewhere.
///
/// The channel is unbounded, so sending never blocks and a slow writer
/// cannot stall generation.
pub struct ChannelSink {
    tx: Sender<SnapshotEvent>,
}

impl ChannelSink {
    /// Wraps the sending half of an unbounded channel.
    pub fn new(tx: Sender<SnapshotEvent>) -> Self {
        Self { tx }
    }
}

impl SnapshotSink for ChannelSink {
    fn save(&self, event: SnapshotEvent) -> Result<(), SnapshotError> {
        self.tx.send(event).map_err(|_| SnapshotError::Disconnected)
    }
}

impl std::fmt::Debug for ChannelSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSink").finish_non_exhaustive()
    }
}
