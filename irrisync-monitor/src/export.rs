use std::io::Write;

use serde::Serialize;
use time::OffsetDateTime;

use crate::collector::DataCollector;
use crate::error::MonitorError;

#[derive(Debug, Serialize)]
struct CsvRow {
    #[serde(with = "time::serde::rfc3339::option")]
    timestamp: Option<OffsetDateTime>,
    humidity: Option<u8>,
    temperature: Option<f32>,
}

/// Writes the humidity and temperature histories side by side, paired by position. The
/// shorter history leaves its column empty. Returns the number of data rows.
pub fn export_csv<W: Write>(collector: &DataCollector, writer: W) -> Result<usize, MonitorError> {
    let humidity = collector.humidity();
    let temperature = collector.temperature();
    let rows = humidity.len().max(temperature.len());

    let mut csv = csv::Writer::from_writer(writer);
    for i in 0..rows {
        let humidity = humidity.get(i);
        let temperature = temperature.get(i);

        csv.serialize(CsvRow {
            timestamp: humidity
                .map(|sample| sample.timestamp)
                .or(temperature.map(|sample| sample.timestamp)),
            humidity: humidity.map(|sample| sample.value),
            temperature: temperature.map(|sample| sample.value),
        })?;
    }
    csv.flush()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use crate::parser::{DeviceState, LogEntry, StatusLine};

    use super::*;

    fn status(humidity: u8, temp: Option<f32>) -> LogEntry {
        LogEntry::Status(StatusLine {
            raw: 700,
            humidity,
            temp,
            state: DeviceState::Analyzing,
            wants_water: true,
            suspect: false,
        })
    }

    #[test]
    fn test_export_pairs_rows_by_index() {
        let mut collector = DataCollector::default();
        let start = OffsetDateTime::UNIX_EPOCH;
        collector.record(status(41, Some(20.5)), start);
        collector.record(status(42, None), start + Duration::seconds(1));

        let mut output = Vec::new();
        let rows = export_csv(&collector, &mut output).unwrap();

        assert_eq!(rows, 2);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "timestamp,humidity,temperature\n\
             1970-01-01T00:00:00Z,41,20.5\n\
             1970-01-01T00:00:01Z,42,\n"
        );
    }

    #[test]
    fn test_export_empty_collector() {
        let mut output = Vec::new();

        assert_eq!(export_csv(&DataCollector::default(), &mut output).unwrap(), 0);
        assert!(output.is_empty());
    }
}
