use std::env;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::collector::DEFAULT_HISTORY_LIMIT;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monitor {
    /// Log stream to read, `-` for stdin
    pub input: String,
    /// Controller serial port; read instead of `input` when set
    #[serde(default)]
    pub serial_port: Option<String>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    pub csv_output: Option<String>,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub logger: Logger,
    pub monitor: Monitor,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::default().separator("_"))
            .build()?
            .try_deserialize()
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn reads_stdin(&self) -> bool {
        self.monitor.input == "-"
    }
}
