//! Detector configuration
//!
//! Scoring constants for the connection detector. `Default` carries the
//! canonical values; `from_env` lets a deployment tune them through
//! environment variables (a `.env` file is honoured by the binary).

use crate::error::{CanvasError, Result};
use std::env;

pub const ENV_MIN_CONFIDENCE: &str = "CANVAS_MIN_CONFIDENCE";
pub const ENV_FUZZY_THRESHOLD: &str = "CANVAS_FUZZY_THRESHOLD";
pub const ENV_FUZZY_WEIGHT: &str = "CANVAS_FUZZY_WEIGHT";
pub const ENV_ID_MATCH_CONFIDENCE: &str = "CANVAS_ID_MATCH_CONFIDENCE";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// A connection is emitted only when its confidence is strictly above this
    pub min_confidence: f64,

    /// Fuzzy matches need a similarity strictly above this
    pub fuzzy_threshold: f64,

    /// Fuzzy confidence = similarity * fuzzy_weight
    pub fuzzy_weight: f64,

    /// Confidence assigned to `customer_id` ~ `id_customer` style matches
    pub id_match_confidence: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.7,
            fuzzy_threshold: 0.8,
            fuzzy_weight: 0.9,
            id_match_confidence: 0.95,
        }
    }
}

impl DetectorConfig {
    /// Build a config from the environment, falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            min_confidence: read_unit(&lookup, ENV_MIN_CONFIDENCE, defaults.min_confidence)?,
            fuzzy_threshold: read_unit(&lookup, ENV_FUZZY_THRESHOLD, defaults.fuzzy_threshold)?,
            fuzzy_weight: read_unit(&lookup, ENV_FUZZY_WEIGHT, defaults.fuzzy_weight)?,
            id_match_confidence: read_unit(
                &lookup,
                ENV_ID_MATCH_CONFIDENCE,
                defaults.id_match_confidence,
            )?,
        };
        Ok(config)
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Result<Self> {
        check_unit("min_confidence", min_confidence)?;
        self.min_confidence = min_confidence;
        Ok(self)
    }
}

fn read_unit<F>(lookup: &F, key: &str, default: f64) -> Result<f64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => {
            let value: f64 = raw.trim().parse().map_err(|_| {
                CanvasError::Config(format!("{} must be a number, got '{}'", key, raw))
            })?;
            check_unit(key, value)?;
            Ok(value)
        }
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CanvasError::Config(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}
