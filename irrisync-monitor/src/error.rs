#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
