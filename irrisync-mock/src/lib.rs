use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use irrisync_embedded::display::{BufferDisplay, StatusPresenter};
use irrisync_embedded::pump::PumpRelay;
use irrisync_embedded::sensor::{MoistureSensor, TempSensor};
use irrisync_embedded::time::Clock;
use irrisync_embedded::{IrrigationController, StepOutcome};
use tokio::time;

use crate::devices::{
    Environment, SimClock, SimMoistureIo, SimRelayPin, SimTempIo, TracingSerial, lock,
};
use crate::settings::Settings;
use crate::simulate::day_fraction;

mod devices;
pub mod settings;
mod simulate;
mod soil;

pub use simulate::simulated_temperature;
pub use soil::SoilModel;

const PROBE_SAMPLES: u8 = 4;

/// Outcome of a finished simulation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimReport {
    pub cycles: u64,
    pub waterings: u64,
    pub deferrals: u64,
    pub temperature_faults: u64,
    pub repaints: u64,
    pub final_humidity: f32,
}

pub async fn run(settings: &Arc<Settings>) -> Result<SimReport, Box<dyn Error>> {
    let simulation = &settings.simulation;

    let soil = SoilModel::new(
        simulation.initial_humidity,
        simulation.dry_rate_per_min,
        simulation.watering_rate_per_s,
        simulation.diffusion_ms,
    );
    let environment = Arc::new(Mutex::new(Environment::new(
        soil,
        settings.calibration,
        simulation.noise,
        simulation.temp_fault_rate,
        simulation.seed,
    )));

    let mut moisture_sensor = MoistureSensor::with_calibration(
        SimMoistureIo::new(environment.clone()),
        settings.calibration,
    );
    moisture_sensor.set_samples(PROBE_SAMPLES);
    let temp_sensor = TempSensor::with_model(
        SimTempIo::new(environment.clone(), simulation.dht_model),
        simulation.dht_model,
    );
    let relay = PumpRelay::new(
        SimRelayPin::new(environment.clone(), simulation.relay_active_low),
        simulation.relay_active_low,
    )?;

    let mut controller = IrrigationController::new(
        moisture_sensor,
        temp_sensor,
        relay,
        TracingSerial::new(simulation.echo_stdout),
        BufferDisplay::new(),
        settings.irrigation,
    )?
    .with_presenter(StatusPresenter::new(simulation.page_interval_ms));
    controller.init()?;

    let mut clock = SimClock::new(simulation.clock_start_ms);
    let period = Duration::from_secs_f64(
        simulation.cycle_interval_ms as f64 / 1000.0 / simulation.time_scale,
    );
    let mut interval = time::interval(period);
    let mut report = SimReport::default();
    let mut elapsed_ms: u64 = 0;

    tracing::info!(
        "Simulating {} ms cycles at {}x, soil starts at {:.1}%",
        simulation.cycle_interval_ms,
        simulation.time_scale,
        simulation.initial_humidity
    );

    while simulation.max_cycles == 0 || report.cycles < simulation.max_cycles {
        interval.tick().await;

        {
            let mut environment = lock(&environment);
            let pump_on = environment.pump_on;
            environment.soil.advance(simulation.cycle_interval_ms, pump_on);
            environment.temperature =
                simulated_temperature(day_fraction(simulation.start_day_fraction, elapsed_ms));
        }

        match controller.process(clock.now()) {
            Ok(Some(cycle)) => {
                match cycle.outcome {
                    StepOutcome::WateringStarted => report.waterings += 1,
                    StepOutcome::Deferred { .. } => report.deferrals += 1,
                    _ => {}
                }
                if cycle.snapshot.temperature.is_none() {
                    report.temperature_faults += 1;
                }
                if cycle.repainted {
                    report.repaints += 1;
                    let screen = controller.display();
                    tracing::info!("[{}] [{}]", screen.line(0), screen.line(1));
                }
            }
            Ok(None) => {}
            Err(err) => tracing::error!("Control cycle failed: {err}"),
        }

        clock.advance(simulation.cycle_interval_ms);
        elapsed_ms += simulation.cycle_interval_ms as u64;
        report.cycles += 1;
    }

    report.final_humidity = lock(&environment).soil.moisture();
    tracing::info!(
        "Finished after {} cycles: {} waterings, final humidity {:.1}%",
        report.cycles,
        report.waterings,
        report.final_humidity
    );

    Ok(report)
}
