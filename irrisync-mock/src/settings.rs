use std::error::Error;

use irrisync_embedded::IrrigationConfig;
use irrisync_embedded::sensor::{DhtModel, MoistureCalibration};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    /// Simulated time between two control cycles
    pub cycle_interval_ms: u32,
    /// Wall-clock speed-up, 60.0 runs a simulated minute every second
    pub time_scale: f64,
    /// Stop after this many cycles, 0 runs forever
    pub max_cycles: u64,
    /// Starting value of the simulated millisecond clock
    #[serde(default)]
    pub clock_start_ms: u32,
    /// Time of day at start, 0.0 is midnight and 0.5 is noon
    pub start_day_fraction: f64,
    pub initial_humidity: f32,
    pub dry_rate_per_min: f32,
    pub watering_rate_per_s: f32,
    pub diffusion_ms: u32,
    /// Standard deviation of the probe noise in raw ADC counts
    pub noise: f32,
    pub temp_fault_rate: f64,
    pub dht_model: DhtModel,
    pub relay_active_low: bool,
    pub page_interval_ms: u32,
    /// Print log stream lines on stdout so they can be piped into the monitor
    pub echo_stdout: bool,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub simulation: Simulation,
    #[serde(default)]
    pub irrigation: IrrigationConfig,
    #[serde(default)]
    pub calibration: MoistureCalibration,
}

impl Settings {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        Self::from_toml(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../",
            "configs/default.toml"
        )))
    }

    pub fn from_toml(source: &str) -> Result<Self, Box<dyn Error>> {
        let settings: Settings = toml::from_str(source)?;

        settings.irrigation.validate()?;
        settings.calibration.validate()?;
        if !(settings.simulation.time_scale > 0.0) {
            return Err("simulation.time_scale must be positive".into());
        }
        if settings.simulation.cycle_interval_ms == 0 {
            return Err("simulation.cycle_interval_ms must be positive".into());
        }

        Ok(settings)
    }
}
