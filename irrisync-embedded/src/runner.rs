use embassy_time::{Duration, Timer};
use embedded_hal::digital::OutputPin;
use embedded_hal_nb::serial::Write;
use embedded_io::Read;

use crate::controller::{CycleReport, IrrigationController};
use crate::display::CharDisplay;
use crate::error::{Error, Result};
use crate::time::Clock;

pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_millis(1_000);

/// Drives an [`IrrigationController`] at a fixed cadence.
pub struct ControlLoop<MoistIo, TempIo, RelayPin, Serial, Display, C>
where
    MoistIo: Read,
    TempIo: Read,
    RelayPin: OutputPin,
    Serial: Write<u8, Error = Error>,
    Display: CharDisplay,
    C: Clock,
{
    controller: IrrigationController<MoistIo, TempIo, RelayPin, Serial, Display>,
    clock: C,
    cycle_interval: Duration,
}

impl<MoistIo, TempIo, RelayPin, Serial, Display, C>
    ControlLoop<MoistIo, TempIo, RelayPin, Serial, Display, C>
where
    MoistIo: Read,
    TempIo: Read,
    RelayPin: OutputPin,
    Serial: Write<u8, Error = Error>,
    Display: CharDisplay,
    C: Clock,
{
    pub fn new(
        controller: IrrigationController<MoistIo, TempIo, RelayPin, Serial, Display>,
        clock: C,
    ) -> Self {
        Self {
            controller,
            clock,
            cycle_interval: DEFAULT_CYCLE_INTERVAL,
        }
    }

    pub fn with_cycle_interval(mut self, cycle_interval: Duration) -> Self {
        self.cycle_interval = cycle_interval;
        self
    }

    pub fn controller(&self) -> &IrrigationController<MoistIo, TempIo, RelayPin, Serial, Display> {
        &self.controller
    }

    pub fn controller_mut(
        &mut self,
    ) -> &mut IrrigationController<MoistIo, TempIo, RelayPin, Serial, Display> {
        &mut self.controller
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// One cycle followed by the pause until the next one.
    pub async fn tick(&mut self) -> Result<Option<CycleReport>> {
        let report = self.controller.process(self.clock.now());
        Timer::after(self.cycle_interval).await;
        report
    }

    /// Never returns. Cycle errors are logged and the loop carries on.
    pub async fn run(&mut self) {
        if let Err(err) = self.controller.init() {
            log::error!("Controller init failed: {err}");
        }

        loop {
            if let Err(err) = self.tick().await {
                log::error!("Control cycle failed: {err}");
            }
        }
    }
}
