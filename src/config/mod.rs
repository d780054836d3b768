//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments
//!
//! ```toml
//! [predictor]
//! strategy = "kalman"
//! prediction_target_ms = 24
//! report_rate_ms = 8          # omit to estimate from timestamps
//!
//! [predictor.linear]
//! velocity_smoothing = 0.4
//!
//! [logging]
//! level = "debug"
//! format = "compact"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod types;

pub use types::LoggingConfig;

use crate::predictor::{PredictorConfig, PredictorStrategy, MIN_LINEAR_SAMPLES};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Predictor configuration
    #[serde(default)]
    pub predictor: PredictorConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let predictor = &self.predictor;

        if let Some(rate) = predictor.report_rate_ms {
            if rate <= 0 {
                anyhow::bail!("Invalid report rate: {}ms (must be strictly positive)", rate);
            }
        }

        if !(predictor.process_noise > 0.0) {
            anyhow::bail!("Invalid process noise: {}", predictor.process_noise);
        }
        if !(predictor.measurement_noise > 0.0) {
            anyhow::bail!("Invalid measurement noise: {}", predictor.measurement_noise);
        }

        let linear = &predictor.linear;
        if linear.history_size < MIN_LINEAR_SAMPLES {
            anyhow::bail!(
                "Invalid history_size: {} (linear predictor needs at least {} samples)",
                linear.history_size,
                MIN_LINEAR_SAMPLES
            );
        }
        for (name, value) in [
            ("velocity_smoothing", linear.velocity_smoothing),
            ("acceleration_smoothing", linear.acceleration_smoothing),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                anyhow::bail!("Invalid {}: {} (expected 0.0 < value <= 1.0)", name, value);
            }
        }
        if !(linear.max_prediction_distance > 0.0) {
            anyhow::bail!(
                "Invalid max_prediction_distance: {}",
                linear.max_prediction_distance
            );
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            _ => anyhow::bail!("Invalid log format: {}", self.logging.format),
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(
        mut self,
        prediction_target_ms: Option<i32>,
        report_rate_ms: Option<i32>,
        strategy: Option<PredictorStrategy>,
    ) -> Self {
        if let Some(target) = prediction_target_ms {
            self.predictor.prediction_target_ms = target;
        }
        if let Some(rate) = report_rate_ms {
            self.predictor.report_rate_ms = Some(rate);
        }
        if let Some(strategy) = strategy {
            self.predictor.strategy = strategy;
        }
        self
    }
}
