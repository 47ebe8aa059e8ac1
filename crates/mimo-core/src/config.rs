//! # Configuration System
//!
//! YAML configuration for link simulations:
//!
//! - Antenna counts and spatial stream count
//! - Noise bounds for the uniform noise model
//! - RNG seed and Monte Carlo trial count
//! - Logging
//!
//! ## Configuration Search Path
//!
//! [`MimoConfig::load`] uses the first file found:
//! 1. Path specified via `MIMO_CONFIG` environment variable
//! 2. `./mimo.yaml` (current directory)
//!
//! ## Example Configuration
//!
//! ```yaml
//! link:
//!   nr: 4
//!   nt: 2
//!   noise_min: -0.05
//!   noise_max: 0.05
//!   seed: 7
//!   trials: 100
//!
//! logging:
//!   level: debug
//!   format: compact
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;
use crate::padding::pad_count;
use crate::types::{MimoError, MimoResult};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "MIMO_CONFIG";

/// Link dimensions, noise model and evaluation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Receive antennas
    pub nr: usize,
    /// Transmit antennas
    pub nt: usize,
    /// Spatial streams; must equal `min(nr, nt)` when given
    pub num_streams: Option<usize>,
    /// Lower bound of the real and imaginary noise draws
    pub noise_min: f64,
    /// Upper bound of the real and imaginary noise draws
    pub noise_max: f64,
    /// RNG seed for channel and noise (None = OS entropy)
    pub seed: Option<u64>,
    /// Channel realizations for Monte Carlo evaluation
    pub trials: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            nr: 8,
            nt: 8,
            num_streams: None,
            noise_min: -0.1,
            noise_max: 0.1,
            seed: None,
            trials: 1,
        }
    }
}

impl LinkConfig {
    /// Square `n × n` link with default noise.
    pub fn square(n: usize) -> Self {
        Self {
            nr: n,
            nt: n,
            ..Default::default()
        }
    }

    /// `nr × nt` link with the given noise bounds.
    pub fn new(nr: usize, nt: usize, noise_min: f64, noise_max: f64) -> Self {
        Self {
            nr,
            nt,
            noise_min,
            noise_max,
            ..Default::default()
        }
    }

    /// Same link without noise.
    pub fn noiseless(mut self) -> Self {
        self.noise_min = 0.0;
        self.noise_max = 0.0;
        self
    }

    /// Same link with a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Spatial multiplexing order, `min(nr, nt)`.
    pub fn num_streams(&self) -> usize {
        self.num_streams.unwrap_or_else(|| self.nr.min(self.nt))
    }

    /// Validate every dimension and noise invariant.
    pub fn validate(&self) -> MimoResult<()> {
        if self.nr == 0 || self.nt == 0 {
            return Err(MimoError::InvalidConfig(format!(
                "antenna counts must be positive, got nr={} nt={}",
                self.nr, self.nt
            )));
        }

        let expected = self.nr.min(self.nt);
        let streams = self.num_streams();
        if streams != expected {
            return Err(MimoError::dimension(format!(
                "{} streams requested but a {}x{} channel supports exactly {}",
                streams, self.nr, self.nt, expected
            )));
        }
        pad_count(self.nt, streams)?;

        if !self.noise_min.is_finite() || !self.noise_max.is_finite() {
            return Err(MimoError::InvalidConfig(
                "noise bounds must be finite".to_string(),
            ));
        }
        if self.noise_min > self.noise_max {
            return Err(MimoError::InvalidConfig(format!(
                "noise_min {} exceeds noise_max {}",
                self.noise_min, self.noise_max
            )));
        }

        if self.trials == 0 {
            return Err(MimoError::InvalidConfig(
                "trials must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MimoConfig {
    pub link: LinkConfig,
    pub logging: LogConfig,
}

impl MimoConfig {
    /// Load configuration from the default search path.
    ///
    /// Returns default config if no file is found.
    pub fn load() -> MimoResult<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if Path::new(&path).exists() {
                return Self::load_from(Path::new(&path));
            }
        }

        let local = PathBuf::from("./mimo.yaml");
        if local.exists() {
            return Self::load_from(&local);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> MimoResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| MimoError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> MimoResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| MimoError::InvalidConfig(e.to_string()))
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> MimoResult<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| MimoError::InvalidConfig(e.to_string()))?;

        std::fs::write(path, content).map_err(|source| MimoError::FileAccess {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> MimoResult<()> {
        self.link.validate()
    }
}
