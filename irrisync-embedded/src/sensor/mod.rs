mod moisture_sensor;
mod temp_sensor;

pub use moisture_sensor::MoistureSensor;
pub use temp_sensor::{DhtModel, TempSensor};

#[cfg(test)]
pub(crate) use moisture_sensor::mock::MockAdc;
#[cfg(test)]
pub(crate) use temp_sensor::mock::MockBus;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DRY_RAW: u16 = 1023;
pub const WET_RAW: u16 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoistureCalibration {
    /// Raw reading of the probe in dry air
    pub dry_raw: u16,
    /// Raw reading of the probe in water
    pub wet_raw: u16,
    /// ADC full-scale value, 1023 for a 10-bit converter
    pub adc_max: u16,
}

impl Default for MoistureCalibration {
    fn default() -> Self {
        Self {
            dry_raw: DRY_RAW,
            wet_raw: WET_RAW,
            adc_max: 1023,
        }
    }
}

impl MoistureCalibration {
    pub fn validate(&self) -> Result<()> {
        if self.dry_raw == self.wet_raw {
            return Err(Error::InvalidConfig("dry and wet calibration points coincide"));
        }
        Ok(())
    }

    /// Maps a raw sample linearly from the dry/wet endpoints onto 0..=100 percent.
    ///
    /// With the usual probe the dry endpoint is the larger one, so a higher raw value means
    /// drier soil. Integer division truncates toward zero before clamping.
    pub fn to_percent(&self, raw: u16) -> u8 {
        let dry = self.dry_raw as i32;
        let wet = self.wet_raw as i32;
        if dry == wet {
            return 0;
        }

        let percent = (raw as i32 - dry) * 100 / (wet - dry);
        percent.clamp(0, 100) as u8
    }

    /// Raw sample that maps back onto `percent`. Rounds away from the dry endpoint so that
    /// `to_percent` truncates back to the same value for any span of 100 counts or more.
    pub fn to_raw(&self, percent: u8) -> u16 {
        let dry = self.dry_raw as i32;
        let wet = self.wet_raw as i32;
        let span = (wet - dry) * percent.min(100) as i32;
        let offset = if span >= 0 {
            (span + 99) / 100
        } else {
            (span - 99) / 100
        };

        (dry + offset).clamp(0, u16::MAX as i32) as u16
    }

    /// A sample pinned to either ADC rail usually means a disconnected or shorted probe.
    pub fn is_suspect(&self, raw: u16) -> bool {
        raw == 0 || raw >= self.adc_max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoistureReading {
    pub raw: u16,
    /// Soil moisture in percent
    pub humidity: u8,
    pub suspect: bool,
}
