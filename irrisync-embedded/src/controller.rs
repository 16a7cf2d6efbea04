use embedded_hal::digital::OutputPin;
use embedded_hal_nb::serial::Write;
use embedded_io::Read;

use crate::control::{IrrigationConfig, IrrigationStateMachine, StepOutcome};
use crate::display::{CharDisplay, Frame, StatusPresenter, StatusSnapshot};
use crate::error::{Error, Result};
use crate::pump::PumpRelay;
use crate::sensor::{MoistureReading, MoistureSensor, TempSensor};
use crate::status::{Event, send_event, send_status};
use crate::time::Millis;

/// What one control cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub outcome: StepOutcome,
    pub snapshot: StatusSnapshot,
    /// Whether the display was repainted this cycle.
    pub repainted: bool,
}

/// Owns every device and the decision state. One call to [`process`](Self::process) is one
/// sample, decide, actuate, report cycle.
pub struct IrrigationController<MoistIo, TempIo, RelayPin, Serial, Display>
where
    MoistIo: Read,
    TempIo: Read,
    RelayPin: OutputPin,
    Serial: Write<u8, Error = Error>,
    Display: CharDisplay,
{
    moisture_sensor: MoistureSensor<MoistIo>,
    temp_sensor: TempSensor<TempIo>,
    relay: PumpRelay<RelayPin>,
    serial: Serial,
    display: Display,
    machine: IrrigationStateMachine,
    presenter: StatusPresenter,
    last_reading: Option<MoistureReading>,
}

impl<MoistIo, TempIo, RelayPin, Serial, Display>
    IrrigationController<MoistIo, TempIo, RelayPin, Serial, Display>
where
    MoistIo: Read,
    TempIo: Read,
    RelayPin: OutputPin,
    Serial: Write<u8, Error = Error>,
    Display: CharDisplay,
{
    pub fn new(
        moisture_sensor: MoistureSensor<MoistIo>,
        temp_sensor: TempSensor<TempIo>,
        relay: PumpRelay<RelayPin>,
        serial: Serial,
        display: Display,
        config: IrrigationConfig,
    ) -> Result<Self> {
        config.validate()?;
        moisture_sensor.calibration().validate()?;

        Ok(Self {
            moisture_sensor,
            temp_sensor,
            relay,
            serial,
            display,
            machine: IrrigationStateMachine::new(config),
            presenter: StatusPresenter::default(),
            last_reading: None,
        })
    }

    pub fn with_presenter(mut self, presenter: StatusPresenter) -> Self {
        self.presenter = presenter;
        self
    }

    /// Shows the boot screens and announces the start on the log stream.
    pub fn init(&mut self) -> Result<()> {
        self.relay.de_energize()?;
        self.presenter.show(&mut self.display, Frame::splash())?;
        if let Err(err) = send_event(&mut self.serial, &Event::Boot) {
            log::warn!("Log stream write failed: {err}");
        }
        self.presenter.show(&mut self.display, Frame::ready())?;

        log::info!("Irrigation controller started, pump off");
        Ok(())
    }

    /// Runs one cycle. Returns `None` when no moisture sample has ever been read, in which
    /// case nothing is decided. Relay and log stream failures are logged and do not end the
    /// cycle; only a display fault is returned as an error.
    pub fn process(&mut self, now: Millis) -> Result<Option<CycleReport>> {
        let Some(reading) = self.sample_moisture() else {
            log::warn!("No moisture sample available yet, skipping cycle");
            return Ok(None);
        };

        let temperature = match self.temp_sensor.read_temperature() {
            Ok(celsius) => Some(celsius),
            Err(err) => {
                log::warn!("Temperature read failed: {err}");
                None
            }
        };

        let outcome = self.machine.update(reading.humidity, now);
        // A failed relay write is retried by the next cycle's `apply`.
        if let Err(err) = self.relay.apply(self.machine.pump_active()) {
            log::error!("Pump relay write failed: {err}");
        }
        log_outcome(outcome, reading.humidity);

        if let Some(event) = Event::from_outcome(outcome, reading.humidity) {
            if let Err(err) = send_event(&mut self.serial, &event) {
                log::warn!("Log stream write failed: {err}");
            }
        }

        let snapshot = StatusSnapshot::capture(&self.machine, &reading, temperature, now);
        log::debug!(
            "Raw sensor: {} -> humidity: {}% | state: {} | wants water: {}",
            reading.raw,
            reading.humidity,
            self.machine.state().label(),
            self.machine.wants_water()
        );
        if let Err(err) = send_status(&mut self.serial, &snapshot) {
            log::warn!("Log stream write failed: {err}");
        }

        let repainted = self.presenter.refresh(&mut self.display, &snapshot, now)?;

        Ok(Some(CycleReport {
            outcome,
            snapshot,
            repainted,
        }))
    }

    pub fn machine(&self) -> &IrrigationStateMachine {
        &self.machine
    }

    pub fn relay(&self) -> &PumpRelay<RelayPin> {
        &self.relay
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn serial_mut(&mut self) -> &mut Serial {
        &mut self.serial
    }

    fn sample_moisture(&mut self) -> Option<MoistureReading> {
        match self.moisture_sensor.read() {
            Ok(reading) => {
                if reading.suspect {
                    log::warn!(
                        "Moisture raw value {} is at the ADC rail, probe may be disconnected",
                        reading.raw
                    );
                }
                self.last_reading = Some(reading);
                Some(reading)
            }
            Err(err) => {
                if self.last_reading.is_some() {
                    log::warn!("Moisture read failed: {err}, reusing last sample");
                }
                self.last_reading
            }
        }
    }
}

fn log_outcome(outcome: StepOutcome, humidity: u8) {
    match outcome {
        StepOutcome::Unchanged => {}
        StepOutcome::Deferred { remaining_ms } => log::info!(
            "Watering needed but deferred, {remaining_ms} ms of cooldown left"
        ),
        StepOutcome::WateringStarted => {
            log::info!("Watering started at {humidity}% humidity")
        }
        StepOutcome::WateringStopped { reason } => log::info!(
            "Watering stopped ({}) at {humidity}%, analyzing absorption",
            reason.as_str()
        ),
        StepOutcome::AnalysisComplete { still_dry: true } => {
            log::info!("Analysis complete, soil still needs water")
        }
        StepOutcome::AnalysisComplete { still_dry: false } => {
            log::info!("Analysis complete, watering was sufficient")
        }
    }
}
