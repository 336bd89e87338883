use serde::{Deserialize, Serialize};

use crate::extractor::ExtractionError;

/// Per-unit extraction tuning, usually loaded from data files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum quantity carried per cycle. Must be > 0.
    pub capacity: u32,
    /// Units extracted per second. Must be > 0.
    pub extraction_per_second: f64,
    /// Units dropped off per second. Must be > 0.
    pub drop_off_per_second: f64,
    /// Simulation updates per second. `update(dt)` progresses
    /// `rate / tick_rate * dt`, so the default of 1.0 makes `dt` seconds.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,
}

fn default_tick_rate() -> f64 {
    1.0
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            capacity: 1,
            extraction_per_second: 1.0,
            drop_off_per_second: 1.0,
            tick_rate: default_tick_rate(),
        }
    }
}

impl ExtractorConfig {
    /// Check every field with the same rules the engine setters apply.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        validate_capacity(self.capacity)?;
        validate_rate("extraction_per_second", self.extraction_per_second)?;
        validate_rate("drop_off_per_second", self.drop_off_per_second)?;
        validate_tick_rate(self.tick_rate)?;
        Ok(())
    }
}

pub(crate) fn validate_capacity(capacity: u32) -> Result<u32, ExtractionError> {
    if capacity == 0 {
        return Err(ExtractionError::InvalidCapacity(capacity));
    }
    Ok(capacity)
}

pub(crate) fn validate_rate(name: &'static str, value: f64) -> Result<f64, ExtractionError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ExtractionError::InvalidRate { name, value });
    }
    Ok(value)
}

pub(crate) fn validate_tick_rate(value: f64) -> Result<f64, ExtractionError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ExtractionError::InvalidTickRate(value));
    }
    Ok(value)
}
