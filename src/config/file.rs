//! TOML configuration format.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::conditioning::HashAlgorithm;
use crate::lamp::LampConfig;
use crate::pool::PoolConfig;
use crate::simulation::{ColorMode, FieldConfig, Rgb};

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid canvas dimensions")]
    InvalidDimensions,
    #[error("lamps need at least one blob")]
    InvalidBlobCount,
    #[error("pool needs at least one lamp")]
    NoLamps,
    #[error("at most two fixed colors per lamp, got {0}")]
    TooManyColors(usize),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub pool: PoolSection,
    #[serde(default)]
    pub lamp: LampSection,
    #[serde(default)]
    pub snapshots: SnapshotSection,
    #[serde(default)]
    pub server: ServerSection,
}

/// Pool layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoolSection {
    /// Number of lamps.
    pub lamps: u32,
    /// Colors handed out to lamps round-robin. Empty falls back to the
    /// lamp section's colors.
    pub palette: Vec<Rgb>,
    /// Give each lamp two consecutive palette colors.
    pub alternate: bool,
}

impl Default for PoolSection {
    fn default() -> Self {
        let defaults = PoolConfig::default();
        Self {
            lamps: defaults.lamps,
            palette: defaults.palette,
            alternate: defaults.alternate,
        }
    }
}

/// Per-lamp parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LampSection {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Blobs per lamp.
    pub blobs: usize,
    /// Sampling stride; 0 is treated as 1.
    pub quality: usize,
    /// Whitening hash.
    pub hash: HashAlgorithm,
    /// Zero, one or two fixed colors used when the pool palette is empty.
    pub colors: Vec<Rgb>,
}

impl Default for LampSection {
    fn default() -> Self {
        let defaults = LampConfig::default();
        Self {
            width: defaults.field.width,
            height: defaults.field.height,
            blobs: defaults.field.blobs,
            quality: defaults.quality,
            hash: defaults.hash,
            colors: Vec::new(),
        }
    }
}

/// Snapshot emission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnapshotSection {
    /// Emit a snapshot every this many generation cycles (0 disables).
    pub interval: u64,
}

impl Default for SnapshotSection {
    fn default() -> Self {
        Self { interval: 5 }
    }
}

/// HTTP adapter settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { port: 4567 }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lamp.width == 0 || self.lamp.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.lamp.blobs == 0 {
            return Err(ConfigError::InvalidBlobCount);
        }
        if self.pool.lamps == 0 {
            return Err(ConfigError::NoLamps);
        }
        if self.lamp.colors.len() > 2 {
            return Err(ConfigError::TooManyColors(self.lamp.colors.len()));
        }
        Ok(())
    }

    /// Converts into runtime pool parameters.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            lamps: self.pool.lamps,
            lamp: LampConfig {
                field: FieldConfig {
                    width: self.lamp.width,
                    height: self.lamp.height,
                    blobs: self.lamp.blobs,
                    colors: ColorMode::from_fixed(&self.lamp.colors),
                },
                quality: self.lamp.quality.max(1),
                hash: self.lamp.hash,
                snapshot_interval: self.snapshots.interval,
            },
            palette: self.pool.palette.clone(),
            alternate: self.pool.alternate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());

        let pool = config.pool_config();
        assert_eq!(pool.lamps, 10);
        assert_eq!(pool.lamp.field.width, 256);
        assert_eq!(pool.lamp.field.height, 192);
        assert_eq!(pool.lamp.field.blobs, 12);
        assert_eq!(pool.lamp.quality, 8);
        assert_eq!(pool.palette.len(), 6);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        assert_eq!(FileConfig::from_toml("").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_parse_full_file() {
        let text = r#"
            [pool]
            lamps = 3
            palette = []

            [lamp]
            width = 64
            height = 48
            blobs = 6
            quality = 0
            hash = "blake3"
            colors = [[255, 0, 0], [0, 0, 255]]

            [snapshots]
            interval = 0

            [server]
            port = 8080
        "#;
        let config = FileConfig::from_toml(text).unwrap();
        let pool = config.pool_config();

        assert_eq!(pool.lamps, 3);
        assert_eq!(pool.lamp.quality, 1);
        assert_eq!(pool.lamp.hash, HashAlgorithm::Blake3);
        assert_eq!(pool.lamp.snapshot_interval, 0);
        assert_eq!(
            pool.lamp.field.colors,
            ColorMode::Alternating(Rgb::RED, Rgb::BLUE)
        );
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = FileConfig::default();
        config.lamp.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_zero_lamps_invalid() {
        let result = FileConfig::from_toml("[pool]\nlamps = 0\n");
        assert!(matches!(result, Err(ConfigError::NoLamps)));
    }

    #[test]
    fn test_too_many_colors() {
        let result = FileConfig::from_toml("[lamp]\ncolors = [[1,1,1],[2,2,2],[3,3,3]]\n");
        assert!(matches!(result, Err(ConfigError::TooManyColors(3))));
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            FileConfig::from_toml("[pool\n"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
