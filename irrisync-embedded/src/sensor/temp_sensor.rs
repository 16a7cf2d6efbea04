use embedded_io::Read;
use serde::{Deserialize, Serialize};

use crate::error::Error;

const FRAME_LEN: usize = 5;
const MIN_TEMPERATURE: f32 = -40.0;
const MAX_TEMPERATURE: f32 = 80.0;

/// Frame layout of the single-wire temperature/humidity sensor family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DhtModel {
    /// Integer byte plus tenths byte
    #[default]
    Dht11,
    /// 16-bit value in tenths with a sign bit
    Dht22,
}

impl DhtModel {
    /// Builds the 5-byte frame the sensor would send for these values.
    pub fn encode(&self, temperature: f32, humidity: f32) -> [u8; FRAME_LEN] {
        let negative = temperature < 0.0;
        let tenths = (temperature.abs() * 10.0 + 0.5) as u16;
        let humidity_tenths = (humidity.clamp(0.0, 100.0) * 10.0 + 0.5) as u16;

        let mut frame = match self {
            DhtModel::Dht11 => {
                let sign = if negative { 0x80 } else { 0x00 };
                [
                    (humidity_tenths / 10) as u8,
                    (humidity_tenths % 10) as u8,
                    (tenths / 10) as u8,
                    (tenths % 10) as u8 | sign,
                    0,
                ]
            }
            DhtModel::Dht22 => {
                let [hum_hi, hum_lo] = humidity_tenths.to_be_bytes();
                let [temp_hi, temp_lo] = (tenths & 0x7FFF).to_be_bytes();
                let sign = if negative { 0x80 } else { 0x00 };
                [hum_hi, hum_lo, temp_hi | sign, temp_lo, 0]
            }
        };
        frame[4] = checksum(&frame);
        frame
    }

    fn decode_temperature(&self, frame: &[u8; FRAME_LEN]) -> f32 {
        match self {
            DhtModel::Dht11 => {
                let value = frame[2] as f32 + (frame[3] & 0x7F) as f32 / 10.0;
                if frame[3] & 0x80 != 0 { -value } else { value }
            }
            DhtModel::Dht22 => {
                let raw = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
                let value = raw as f32 / 10.0;
                if frame[2] & 0x80 != 0 { -value } else { value }
            }
        }
    }
}

fn checksum(frame: &[u8; FRAME_LEN]) -> u8 {
    frame[..4].iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}

pub struct TempSensor<IO>
where
    IO: Read,
{
    io_device: IO,
    model: DhtModel,
}

impl<IO> TempSensor<IO>
where
    IO: Read,
{
    pub fn new(io_device: IO) -> Self {
        Self::with_model(io_device, DhtModel::default())
    }

    pub fn with_model(io_device: IO, model: DhtModel) -> Self {
        Self { io_device, model }
    }

    pub fn model(&self) -> DhtModel {
        self.model
    }

    /// Reads one frame and returns the temperature in degrees Celsius.
    pub fn read_temperature(&mut self) -> Result<f32, Error> {
        let mut frame = [0u8; FRAME_LEN];

        let read_count = self
            .io_device
            .read(&mut frame)
            .map_err(|_| Error::SensorFault)?;

        if read_count < FRAME_LEN {
            return Err(Error::SensorFault);
        }

        if checksum(&frame) != frame[4] {
            log::debug!("Temperature frame checksum mismatch: {frame:02x?}");
            return Err(Error::SensorFault);
        }

        let temperature = self.model.decode_temperature(&frame);

        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(Error::SensorReadingOutOfRange);
        }

        Ok(temperature)
    }
}
