mod desire;
mod system;

pub use desire::*;
pub use system::*;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const LOW_THRESHOLD: u8 = 30;
pub const HIGH_THRESHOLD: u8 = 45;
pub const MAX_WATERING_DURATION_MS: u32 = 1_000;
pub const LONG_WATERING_DURATION_MS: u32 = 10_000;
pub const MIN_INTERVAL_BETWEEN_WATERINGS_MS: u32 = 10_000;
pub const ANALYSIS_DURATION_MS: u32 = 5_000;

/// Thresholds and timers of the irrigation state machine.
///
/// Moisture thresholds are in percent, durations in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrrigationConfig {
    pub low_threshold: u8,
    pub high_threshold: u8,
    pub max_watering_duration_ms: u32,
    pub min_interval_between_waterings_ms: u32,
    pub analysis_duration_ms: u32,
}

impl IrrigationConfig {
    /// Same thresholds, with the ten second pump run of the long-watering board.
    pub fn long_watering() -> Self {
        Self {
            max_watering_duration_ms: LONG_WATERING_DURATION_MS,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.low_threshold >= self.high_threshold {
            return Err(Error::InvalidConfig("low threshold must be below high threshold"));
        }
        if self.high_threshold > 100 {
            return Err(Error::InvalidConfig("high threshold exceeds 100%"));
        }
        if self.max_watering_duration_ms == 0 {
            return Err(Error::InvalidConfig("max watering duration must be positive"));
        }
        Ok(())
    }
}

impl Default for IrrigationConfig {
    fn default() -> Self {
        Self {
            low_threshold: LOW_THRESHOLD,
            high_threshold: HIGH_THRESHOLD,
            max_watering_duration_ms: MAX_WATERING_DURATION_MS,
            min_interval_between_waterings_ms: MIN_INTERVAL_BETWEEN_WATERINGS_MS,
            analysis_duration_ms: ANALYSIS_DURATION_MS,
        }
    }
}
