use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::time::Duration;

use irrisync_monitor::collector::DataCollector;
use irrisync_monitor::consume;
use irrisync_monitor::error::MonitorError;
use irrisync_monitor::export::export_csv;
use irrisync_monitor::settings::Settings;
use time::macros::format_description;

const SERIAL_TIMEOUT_MS: u64 = 1_000;

fn main() {
    let settings = Settings::new().expect("Failed to load settings.");

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level}").into()
        }))
        .init();

    if let Err(err) = run(&settings) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn run(settings: &Settings) -> Result<(), MonitorError> {
    let mut collector = DataCollector::new(settings.monitor.history_limit);

    let recorded = if let Some(port_path) = &settings.monitor.serial_port {
        let port = serialport::new(port_path, settings.monitor.baud_rate)
            .timeout(Duration::from_millis(SERIAL_TIMEOUT_MS))
            .open()?;
        tracing::info!("Reading {port_path} at {} baud", settings.monitor.baud_rate);
        consume(BufReader::new(port), &mut collector)?
    } else if settings.reads_stdin() {
        consume(io::stdin().lock(), &mut collector)?
    } else {
        consume(BufReader::new(File::open(&settings.monitor.input)?), &mut collector)?
    };

    let statistics = collector.statistics();
    tracing::info!(
        "Recorded {recorded} entries, {} waterings",
        statistics.total_waterings
    );
    if let Some(average) = statistics.humidity_average {
        tracing::info!(
            "Humidity average {average:.1}%, latest {:?} ({:?})",
            collector.latest_humidity(),
            collector.humidity_band()
        );
    }
    if let Some(average) = statistics.temperature_average {
        tracing::info!("Temperature average {average:.1}C");
    }
    if let Some(last) = statistics.last_watering {
        let clock = format_description!("[hour]:[minute]:[second]");
        if let Ok(formatted) = last.format(&clock) {
            tracing::info!("Last watering at {formatted}");
        }
    }

    if let Some(path) = &settings.monitor.csv_output {
        let rows = export_csv(&collector, BufWriter::new(File::create(path)?))?;
        tracing::info!("Exported {rows} rows to {path}");
    }

    Ok(())
}
