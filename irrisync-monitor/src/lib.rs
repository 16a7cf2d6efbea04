use std::io::{self, BufRead};

use crate::collector::DataCollector;
use crate::error::MonitorError;
use crate::parser::{EventLine, LogEntry, parse_line};

pub mod collector;
pub mod error;
pub mod export;
pub mod parser;
pub mod settings;

/// Feeds every line of `reader` into the collector until end of input. Returns the number of
/// log entries recorded. Read timeouts are waited out, so a quiet serial port keeps the loop
/// alive.
pub fn consume<R: BufRead>(mut reader: R, collector: &mut DataCollector) -> Result<usize, MonitorError> {
    let mut recorded = 0;
    let mut line = Vec::new();

    loop {
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {}
            // A serial port with no traffic times out; the partial line stays in `line`.
            Err(err) if err.kind() == io::ErrorKind::TimedOut => continue,
            Err(err) => return Err(err.into()),
        }

        let text = String::from_utf8_lossy(&line);
        if let Some(entry) = parse_line(text.trim_end_matches(['\r', '\n'])) {
            if let LogEntry::Event(event) = &entry {
                log_event(event);
            }
            collector.record_now(entry);
            recorded += 1;
        }
        line.clear();
    }

    Ok(recorded)
}

fn log_event(event: &EventLine) {
    match event {
        EventLine::Boot => tracing::info!("Controller booted"),
        EventLine::WateringStarted { humidity } => {
            tracing::info!("Watering started at {humidity}%")
        }
        EventLine::WateringDeferred { remaining_ms } => {
            tracing::debug!("Watering deferred, {remaining_ms} ms of cooldown left")
        }
        EventLine::WateringStopped { reason, humidity } => {
            tracing::info!("Watering stopped ({reason:?}) at {humidity}%")
        }
        EventLine::AnalysisComplete { still_dry } => {
            tracing::info!("Analysis complete, still dry: {still_dry}")
        }
    }
}
