use core::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    SensorFault,
    SensorReadingOutOfRange,
    InvalidConfig(&'static str),
    RelayFault,
    DisplayFault,
    NotConnected,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SensorFault => write!(f, "Sensor fault"),
            Error::SensorReadingOutOfRange => write!(f, "Sensor reading out of valid range"),
            Error::InvalidConfig(reason) => write!(f, "Invalid configuration: {reason}"),
            Error::RelayFault => write!(f, "Relay output fault"),
            Error::DisplayFault => write!(f, "Display bus fault"),
            Error::NotConnected => write!(f, "Not connected"),
        }
    }
}

impl core::error::Error for Error {}

impl embedded_hal_nb::serial::Error for Error {
    fn kind(&self) -> embedded_hal_nb::serial::ErrorKind {
        embedded_hal_nb::serial::ErrorKind::Other
    }
}

pub type Result<T> = core::result::Result<T, Error>;
