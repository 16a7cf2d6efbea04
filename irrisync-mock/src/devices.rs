use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_hal::digital::{self, OutputPin};
use embedded_hal_nb::nb;
use embedded_hal_nb::serial;
use embedded_io::{ErrorKind, ErrorType, Read};
use irrisync_embedded::Error;
use irrisync_embedded::sensor::{DhtModel, MoistureCalibration};
use irrisync_embedded::time::{Clock, Millis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

use crate::soil::SoilModel;

const AIR_HUMIDITY: f32 = 55.0;

/// Physical world shared by all simulated devices.
pub struct Environment {
    pub soil: SoilModel,
    pub temperature: f32,
    pub pump_on: bool,
    calibration: MoistureCalibration,
    noise: Option<Normal<f32>>,
    temp_fault_rate: f64,
    rng: StdRng,
}

impl Environment {
    pub fn new(
        soil: SoilModel,
        calibration: MoistureCalibration,
        noise: f32,
        temp_fault_rate: f64,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            soil,
            temperature: 20.0,
            pump_on: false,
            calibration,
            noise: Normal::new(0.0, noise).ok().filter(|_| noise > 0.0),
            temp_fault_rate: temp_fault_rate.clamp(0.0, 1.0),
            rng,
        }
    }

    /// Raw ADC value the probe would produce for the current moisture, noise included.
    pub fn sample_raw(&mut self) -> u16 {
        let dry = self.calibration.dry_raw as f32;
        let wet = self.calibration.wet_raw as f32;
        let mut raw = dry + (wet - dry) * self.soil.moisture() / 100.0;

        if let Some(noise) = self.noise {
            raw += self.rng.sample(noise);
        }

        raw.round().clamp(0.0, self.calibration.adc_max as f32) as u16
    }

    fn temperature_faults(&mut self) -> bool {
        self.rng.random_bool(self.temp_fault_rate)
    }
}

pub type SharedEnvironment = Arc<Mutex<Environment>>;

pub fn lock(environment: &SharedEnvironment) -> MutexGuard<'_, Environment> {
    environment.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Analog moisture probe, one big-endian sample per conversion.
pub struct SimMoistureIo {
    environment: SharedEnvironment,
}

impl SimMoistureIo {
    pub fn new(environment: SharedEnvironment) -> Self {
        Self { environment }
    }
}

impl ErrorType for SimMoistureIo {
    type Error = ErrorKind;
}

impl Read for SimMoistureIo {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.len() < 2 {
            return Err(ErrorKind::InvalidInput);
        }

        let raw = lock(&self.environment).sample_raw();
        buf[..2].copy_from_slice(&raw.to_be_bytes());
        Ok(2)
    }
}

/// Temperature bus sensor. A fault is a frame with a broken checksum.
pub struct SimTempIo {
    environment: SharedEnvironment,
    model: DhtModel,
}

impl SimTempIo {
    pub fn new(environment: SharedEnvironment, model: DhtModel) -> Self {
        Self { environment, model }
    }
}

impl ErrorType for SimTempIo {
    type Error = ErrorKind;
}

impl Read for SimTempIo {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut environment = lock(&self.environment);
        let mut frame = self.model.encode(environment.temperature, AIR_HUMIDITY);
        if environment.temperature_faults() {
            frame[4] = frame[4].wrapping_add(1);
        }

        let len = frame.len().min(buf.len());
        buf[..len].copy_from_slice(&frame[..len]);
        Ok(len)
    }
}

/// Relay input pin. Switches the pump in the shared environment.
pub struct SimRelayPin {
    environment: SharedEnvironment,
    active_low: bool,
}

impl SimRelayPin {
    pub fn new(environment: SharedEnvironment, active_low: bool) -> Self {
        Self {
            environment,
            active_low,
        }
    }

    fn drive(&mut self, high: bool) {
        let pump_on = high != self.active_low;
        let mut environment = lock(&self.environment);
        if environment.pump_on != pump_on {
            tracing::debug!("Pump {}", if pump_on { "ON" } else { "OFF" });
        }
        environment.pump_on = pump_on;
    }
}

impl digital::ErrorType for SimRelayPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimRelayPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}

/// Serial port that forwards each completed line to `tracing`, optionally echoing it on stdout.
#[derive(Debug, Default)]
pub struct TracingSerial {
    buffer: Vec<u8>,
    echo_stdout: bool,
    lines_sent: u64,
}

impl TracingSerial {
    pub fn new(echo_stdout: bool) -> Self {
        Self {
            buffer: Vec::new(),
            echo_stdout,
            lines_sent: 0,
        }
    }

    pub fn lines_sent(&self) -> u64 {
        self.lines_sent
    }
}

impl serial::ErrorType for TracingSerial {
    type Error = Error;
}

impl serial::Write<u8> for TracingSerial {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        if word != b'\n' {
            self.buffer.push(word);
            return Ok(());
        }

        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();
        self.lines_sent += 1;

        tracing::debug!(target: "serial", "{line}");
        if self.echo_stdout {
            println!("{line}");
        }
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}

/// Simulated millisecond clock, advanced explicitly once per cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimClock {
    now: Millis,
}

impl SimClock {
    pub fn new(start_ms: u32) -> Self {
        Self {
            now: Millis::new(start_ms),
        }
    }

    pub fn advance(&mut self, ms: u32) {
        self.now = self.now.wrapping_add(ms);
    }
}

impl Clock for SimClock {
    fn now(&self) -> Millis {
        self.now
    }
}
