//! Lamp pool with fan-out generation.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::thread;

use thiserror::Error;
use zeroize::Zeroizing;

use crate::lamp::{LampConfig, LampError, LampInstance, LampServices, LampStats};
use crate::noise::draw;
use crate::simulation::{ColorMode, PixelBuffer, Rgb};

/// Bytes of initial seed drawn per lamp.
const INITIAL_SEED_BYTES: usize = 32;

/// Largest output a front end hands to [`LampPool::combined_random`] in one
/// request. The pool itself does not enforce it; every lamp allocates the
/// full request, so callers taking sizes from the outside must check first.
pub const MAX_REQUEST_BYTES: usize = 1 << 20;

/// Errors surfaced by the pool.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("lamp {0} not found")]
    UnknownLamp(u32),
    #[error("pool has no lamps")]
    Empty,
    #[error("invalid lamp selection: {0:?}")]
    InvalidSelection(String),
    #[error("generation worker panicked")]
    WorkerPanicked,
    #[error(transparent)]
    Lamp(#[from] LampError),
}

/// Which lamps contribute to a combined output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LampSelection {
    /// Every lamp in the pool.
    #[default]
    All,
    /// Only the lamp with this id.
    Single(u32),
}

impl FromStr for LampSelection {
    type Err = PoolError;

    /// Parses `all` or a non-negative integer id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse()
            .map(Self::Single)
            .map_err(|_| PoolError::InvalidSelection(s.to_string()))
    }
}

/// Pool construction parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    /// Number of lamps, with ids `0..lamps`.
    pub lamps: u32,
    /// Parameters shared by every lamp. The field's color mode is
    /// overridden per lamp when a palette is set.
    pub lamp: LampConfig,
    /// Fixed colors handed out to lamps round-robin. Empty keeps the
    /// lamp config's color mode.
    pub palette: Vec<Rgb>,
    /// Give each lamp two consecutive palette colors instead of one.
    pub alternate: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            lamps: 10,
            lamp: LampConfig::default(),
            palette: vec![
                Rgb::RED,
                Rgb::YELLOW,
                Rgb::GREEN,
                Rgb::BLUE,
                Rgb::MAGENTA,
                Rgb::CYAN,
            ],
            alternate: false,
        }
    }
}

impl PoolConfig {
    /// Color mode for the lamp at `index`.
    pub fn colors_for(&self, index: usize) -> ColorMode {
        let len = self.palette.len();
        if len == 0 {
            return self.lamp.field.colors;
        }
        let first = self.palette[index % len];
        if self.alternate {
            ColorMode::Alternating(first, self.palette[(index + 1) % len])
        } else {
            ColorMode::Single(first)
        }
    }
}

/// Aggregate counters across the pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Per-lamp counters in id order.
    pub lamps: Vec<LampStats>,
}

impl PoolStats {
    /// Total generation cycles.
    pub fn generations(&self) -> u64 {
        self.lamps.iter().map(|l| l.generation).sum()
    }

    /// Total simulation steps.
    pub fn frames_rendered(&self) -> u64 {
        self.lamps.iter().map(|l| l.frames_rendered).sum()
    }

    /// Total bytes generated by lamps (before mixing).
    pub fn bytes_generated(&self) -> u64 {
        self.lamps.iter().map(|l| l.bytes_generated).sum()
    }

    /// Total snapshots accepted by the sink.
    pub fn snapshots_saved(&self) -> u64 {
        self.lamps.iter().map(|l| l.snapshots_saved).sum()
    }

    /// Total snapshots the sink rejected.
    pub fn snapshot_failures(&self) -> u64 {
        self.lamps.iter().map(|l| l.snapshot_failures).sum()
    }
}

/// A fixed set of lamps keyed by id.
///
/// The id map is built once and never changes, so lookups need no
/// synchronization; each lamp guards its own state.
#[derive(Debug)]
pub struct LampPool {
    lamps: BTreeMap<u32, LampInstance>,
}

impl LampPool {
    /// Wraps already-built lamps. Later lamps replace earlier ones with the
    /// same id.
    pub fn new(lamps: impl IntoIterator<Item = LampInstance>) -> Self {
        Self {
            lamps: lamps.into_iter().map(|lamp| (lamp.id(), lamp)).collect(),
        }
    }

    /// Builds `config.lamps` lamps, each seeded with fresh bytes from the
    /// services' noise source.
    pub fn from_config(config: &PoolConfig, services: &LampServices) -> Self {
        let lamps = (0..config.lamps).map(|id| {
            let seed = draw::<INITIAL_SEED_BYTES>(services.noise.as_ref());
            let mut lamp_config = config.lamp.clone();
            lamp_config.field.colors = config.colors_for(id as usize);
            LampInstance::new(id, &lamp_config, seed.as_ref(), services)
        });
        let pool = Self::new(lamps);

        tracing::info!(
            lamps = pool.len(),
            width = config.lamp.field.width,
            height = config.lamp.field.height,
            blobs = config.lamp.field.blobs,
            quality = config.lamp.quality,
            "Lamp pool ready"
        );

        pool
    }

    /// Number of lamps.
    pub fn len(&self) -> usize {
        self.lamps.len()
    }

    /// Returns true if the pool has no lamps.
    pub fn is_empty(&self) -> bool {
        self.lamps.is_empty()
    }

    /// Lamp ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.lamps.keys().copied()
    }

    /// Looks up a lamp.
    pub fn get(&self, id: u32) -> Result<&LampInstance, PoolError> {
        self.lamps.get(&id).ok_or(PoolError::UnknownLamp(id))
    }

    /// Renders the next frame of lamp `id`.
    pub fn frame_for(&self, id: u32) -> Result<PixelBuffer, PoolError> {
        Ok(self.get(id)?.render_frame()?)
    }

    /// Runs a generation cycle on the selected lamps and XOR-folds the
    /// results into `n` bytes.
    ///
    /// With [`LampSelection::All`] every lamp runs on its own scoped worker
    /// thread. XOR is commutative, so join order does not matter.
    pub fn combined_random(&self, n: usize, selection: LampSelection) -> Result<Vec<u8>, PoolError> {
        let outputs: Vec<Zeroizing<Vec<u8>>> = match selection {
            LampSelection::Single(id) => vec![Zeroizing::new(self.get(id)?.mix_and_generate(n)?)],
            LampSelection::All => {
                if self.lamps.is_empty() {
                    return Err(PoolError::Empty);
                }
                self.fan_out(n)?
            }
        };

        let mut acc = vec![0u8; n];
        for out in &outputs {
            xor_into(&mut acc, out);
        }

        tracing::debug!(
            bytes = n,
            lamps = outputs.len(),
            "Combined random output"
        );

        Ok(acc)
    }

    /// Snapshot of every lamp's counters.
    pub fn stats(&self) -> Result<PoolStats, PoolError> {
        let lamps = self
            .lamps
            .values()
            .map(LampInstance::stats)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PoolStats { lamps })
    }

    fn fan_out(&self, n: usize) -> Result<Vec<Zeroizing<Vec<u8>>>, PoolError> {
        thread::scope(|s| {
            let handles: Vec<_> = self
                .lamps
                .values()
                .map(|lamp| s.spawn(move || lamp.mix_and_generate(n).map(Zeroizing::new)))
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(result) => result.map_err(PoolError::from),
                    Err(_) => Err(PoolError::WorkerPanicked),
                })
                .collect()
        })
    }
}

/// XORs `src` into `acc` byte by byte over their common length.
pub fn xor_into(acc: &mut [u8], src: &[u8]) {
    for (a, b) in acc.iter_mut().zip(src) {
        *a ^= b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditioning::HashAlgorithm;
    use crate::lamp::NullSink;
    use crate::noise::{ManualClock, SeededNoise};
    use crate::simulation::FieldConfig;
    use std::sync::Arc;
    use std::time::Duration;

    fn small_pool_config(lamps: u32) -> PoolConfig {
        PoolConfig {
            lamps,
            lamp: LampConfig {
                field: FieldConfig {
                    width: 16,
                    height: 16,
                    blobs: 3,
                    colors: ColorMode::RandomPerBlob,
                },
                quality: 4,
                hash: HashAlgorithm::Sha256,
                snapshot_interval: 0,
            },
            palette: vec![Rgb::RED, Rgb::BLUE],
            alternate: false,
        }
    }

    fn services(seed: u8) -> LampServices {
        LampServices {
            noise: Arc::new(SeededNoise::from_seed([seed; 32])),
            clock: Arc::new(ManualClock::ticking(Duration::from_millis(5))),
            sink: Arc::new(NullSink),
        }
    }

    #[test]
    fn test_selection_parsing() {
        assert_eq!("all".parse::<LampSelection>().unwrap(), LampSelection::All);
        assert_eq!(" 3 ".parse::<LampSelection>().unwrap(), LampSelection::Single(3));
        assert!(matches!(
            "lamp".parse::<LampSelection>(),
            Err(PoolError::InvalidSelection(_))
        ));
        assert!("-1".parse::<LampSelection>().is_err());
    }

    #[test]
    fn test_palette_assignment() {
        let mut config = small_pool_config(3);
        assert_eq!(config.colors_for(0), ColorMode::Single(Rgb::RED));
        assert_eq!(config.colors_for(3), ColorMode::Single(Rgb::BLUE));

        config.alternate = true;
        assert_eq!(config.colors_for(1), ColorMode::Alternating(Rgb::BLUE, Rgb::RED));

        config.palette.clear();
        assert_eq!(config.colors_for(1), ColorMode::RandomPerBlob);
    }

    #[test]
    fn test_from_config_ids() {
        let pool = LampPool::from_config(&small_pool_config(4), &services(1));
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.ids().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_frame_for_unknown_id() {
        let pool = LampPool::from_config(&small_pool_config(2), &services(1));
        assert!(pool.frame_for(1).is_ok());
        assert!(matches!(pool.frame_for(2), Err(PoolError::UnknownLamp(2))));
    }

    #[test]
    fn test_combined_random_length() {
        let pool = LampPool::from_config(&small_pool_config(3), &services(1));
        assert_eq!(pool.combined_random(0, LampSelection::All).unwrap().len(), 0);
        assert_eq!(pool.combined_random(100, LampSelection::All).unwrap().len(), 100);
    }

    #[test]
    fn test_combined_random_runs_every_lamp() {
        let pool = LampPool::from_config(&small_pool_config(3), &services(1));
        pool.combined_random(8, LampSelection::All).unwrap();

        let stats = pool.stats().unwrap();
        assert!(stats.lamps.iter().all(|l| l.generation == 1));
        assert_eq!(stats.bytes_generated(), 24);
    }

    #[test]
    fn test_single_selection_touches_one_lamp() {
        let pool = LampPool::from_config(&small_pool_config(3), &services(1));
        pool.combined_random(8, LampSelection::Single(1)).unwrap();

        let generations: Vec<u64> = pool.stats().unwrap().lamps.iter().map(|l| l.generation).collect();
        assert_eq!(generations, vec![0, 1, 0]);
    }

    #[test]
    fn test_single_unknown_lamp() {
        let pool = LampPool::from_config(&small_pool_config(1), &services(1));
        assert!(matches!(
            pool.combined_random(8, LampSelection::Single(9)),
            Err(PoolError::UnknownLamp(9))
        ));
    }

    #[test]
    fn test_empty_pool() {
        let pool = LampPool::new(Vec::new());
        assert!(pool.is_empty());
        assert!(matches!(
            pool.combined_random(8, LampSelection::All),
            Err(PoolError::Empty)
        ));
    }

    #[test]
    fn test_xor_into() {
        let mut acc = vec![0u8; 4];
        xor_into(&mut acc, &[0xF0, 0x0F, 0xFF, 0x00]);
        xor_into(&mut acc, &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(acc, vec![0x0F, 0xF0, 0x00, 0xFF]);
    }

    #[test]
    fn test_xor_of_single_lamp_is_its_output() {
        // Identical fully-seeded pools produce the same lamp output, so the
        // mixer must return it unchanged for a single selection.
        let a = LampPool::from_config(&small_pool_config(1), &services(4));
        let b = LampPool::from_config(&small_pool_config(1), &services(4));

        let mixed = a.combined_random(32, LampSelection::All).unwrap();
        let direct = b.get(0).unwrap().mix_and_generate(32).unwrap();
        assert_eq!(mixed, direct);
    }
}
