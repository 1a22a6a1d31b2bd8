//! Monitor configuration
//!
//! ```rust
//! use throughput::MonitorConfig;
//!
//! let config = MonitorConfig::from_yaml_str("sample_period_ms: 500\n").unwrap();
//! assert_eq!(config.sample_period_ms, 500);
//! assert_eq!(config.max_feed_errors, 10);
//! ```

use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::path::Path;

use crate::sampler::{DEFAULT_SAMPLE_PERIOD_MS, MAX_SAMPLE_PERIOD_MS};
use crate::types::UpdateRate;
use crate::{Result, ThroughputError};

/// Consecutive feed errors tolerated before the driver gives up.
pub const DEFAULT_MAX_FEED_ERRORS: u32 = 10;

/// Tunables for a [`ThroughputMonitor`](crate::ThroughputMonitor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct MonitorConfig {
    /// Throughput sampling period in milliseconds
    pub sample_period_ms: u64,
    /// Consecutive feed errors before the feed driver stops
    pub max_feed_errors: u32,
    /// Delivery rate of the packet preview stream
    pub preview_rate: UpdateRate,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_period_ms: DEFAULT_SAMPLE_PERIOD_MS.get(),
            max_feed_errors: DEFAULT_MAX_FEED_ERRORS,
            preview_rate: UpdateRate::Native,
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: MonitorConfig = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            ThroughputError::config_file(path.to_path_buf(), "cannot read file", Box::new(e))
        })?;

        Self::from_yaml_str(&yaml).map_err(|e| match e {
            ThroughputError::Config { reason, source, .. } => {
                ThroughputError::Config { reason, path: Some(path.to_path_buf()), source }
            }
            other => other,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_period_ms == 0 {
            return Err(ThroughputError::config("sample_period_ms must be greater than zero"));
        }
        if self.sample_period_ms > MAX_SAMPLE_PERIOD_MS.get() {
            return Err(ThroughputError::config(format!(
                "sample_period_ms must be at most {}",
                MAX_SAMPLE_PERIOD_MS
            )));
        }
        if matches!(self.preview_rate, UpdateRate::Max(hz) if hz > UpdateRate::MAX_HZ) {
            return Err(ThroughputError::config(format!(
                "preview_rate must be at most {} Hz",
                UpdateRate::MAX_HZ
            )));
        }
        if self.max_feed_errors == 0 {
            return Err(ThroughputError::config("max_feed_errors must be greater than zero"));
        }
        Ok(())
    }

    /// Sampling period as a non-zero value.
    pub fn sample_period(&self) -> Result<NonZeroU64> {
        NonZeroU64::new(self.sample_period_ms)
            .ok_or_else(|| ThroughputError::config("sample_period_ms must be greater than zero"))
    }
}
