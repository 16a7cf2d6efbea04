use embedded_hal::digital::OutputPin;

use crate::error::{Error, Result};

/// Relay driver for the water pump.
///
/// Most relay boards energize their coil when the input is pulled low, so the logical
/// state is kept separately from the pin level.
pub struct PumpRelay<Pin>
where
    Pin: OutputPin,
{
    pin: Pin,
    active_low: bool,
    energized: bool,
}

impl<Pin> PumpRelay<Pin>
where
    Pin: OutputPin,
{
    /// Takes the relay pin and drives it to the off level before returning.
    pub fn new(pin: Pin, active_low: bool) -> Result<Self> {
        let mut relay = Self {
            pin,
            active_low,
            energized: false,
        };
        relay.set(false)?;
        Ok(relay)
    }

    pub fn is_energized(&self) -> bool {
        self.energized
    }

    pub fn energize(&mut self) -> Result<()> {
        self.set(true)
    }

    pub fn de_energize(&mut self) -> Result<()> {
        self.set(false)
    }

    /// Drives the pin only when the requested state differs from the current one.
    pub fn apply(&mut self, on: bool) -> Result<()> {
        if on != self.energized {
            self.set(on)?;
        }
        Ok(())
    }

    fn set(&mut self, on: bool) -> Result<()> {
        let level_high = on != self.active_low;
        if level_high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
        .map_err(|_| Error::RelayFault)?;

        self.energized = on;
        Ok(())
    }
}
