use embedded_io::Read;

use crate::error::Error;

use super::{MoistureCalibration, MoistureReading};

pub struct MoistureSensor<IO>
where
    IO: Read,
{
    io_device: IO,
    calibration: MoistureCalibration,
    samples: u8,
}

impl<IO> MoistureSensor<IO>
where
    IO: Read,
{
    pub fn new(io_device: IO) -> Self {
        Self::with_calibration(io_device, MoistureCalibration::default())
    }

    pub fn with_calibration(io_device: IO, calibration: MoistureCalibration) -> Self {
        Self {
            io_device,
            calibration,
            samples: 1,
        }
    }

    /// Number of conversions averaged per reading, at least one.
    pub fn set_samples(&mut self, samples: u8) {
        self.samples = samples.max(1);
    }

    pub fn calibration(&self) -> MoistureCalibration {
        self.calibration
    }

    pub fn read_raw(&mut self) -> Result<u16, Error> {
        let mut total: u32 = 0;

        for _ in 0..self.samples {
            let mut buffer = [0u8; 2];
            let read_count = self
                .io_device
                .read(&mut buffer)
                .map_err(|_| Error::SensorFault)?;

            if read_count < 2 {
                return Err(Error::SensorFault);
            }

            total += u16::from_be_bytes(buffer) as u32;
        }

        Ok((total / self.samples as u32) as u16)
    }

    /// Samples the probe and converts to percent. Out-of-calibration values are clamped,
    /// never rejected.
    pub fn read(&mut self) -> Result<MoistureReading, Error> {
        let raw = self.read_raw()?;

        Ok(MoistureReading {
            raw,
            humidity: self.calibration.to_percent(raw),
            suspect: self.calibration.is_suspect(raw),
        })
    }
}
