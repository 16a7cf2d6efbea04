use serde::{Deserialize, Serialize};

use crate::error::MonitorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    Idle,
    Watering,
    Analyzing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Satisfied,
    DesireCleared,
    Timeout,
}

/// Per-cycle `status:` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusLine {
    pub raw: u16,
    pub humidity: u8,
    /// `None` when the controller could not read the temperature sensor
    pub temp: Option<f32>,
    pub state: DeviceState,
    pub wants_water: bool,
    #[serde(default)]
    pub suspect: bool,
}

/// `event:` payload, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventLine {
    Boot,
    WateringStarted { humidity: u8 },
    WateringDeferred { remaining_ms: u32 },
    WateringStopped { reason: StopReason, humidity: u8 },
    AnalysisComplete { still_dry: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Status(StatusLine),
    Event(EventLine),
}

/// Splits a `topic:payload` line. Lines with an unknown topic are not log entries and yield
/// `Ok(None)`; a known topic with a payload that does not parse is an error.
pub fn try_parse_line(line: &str) -> Result<Option<LogEntry>, MonitorError> {
    let Some((topic, payload)) = line.trim().split_once(':') else {
        return Ok(None);
    };

    let entry = match topic {
        "status" => LogEntry::Status(serde_json::from_str(payload)?),
        "event" => LogEntry::Event(serde_json::from_str(payload)?),
        _ => return Ok(None),
    };

    Ok(Some(entry))
}

pub fn parse_line(line: &str) -> Option<LogEntry> {
    try_parse_line(line).unwrap_or_else(|err| {
        tracing::debug!("Ignoring line {line:?}: {err}");
        None
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_line() {
        let entry = parse_line(
            "status:{\"raw\":612,\"humidity\":56,\"temp\":22.5,\"state\":\"IDLE\",\"wants_water\":false,\"suspect\":false}\r\n",
        );

        assert_eq!(
            entry,
            Some(LogEntry::Status(StatusLine {
                raw: 612,
                humidity: 56,
                temp: Some(22.5),
                state: DeviceState::Idle,
                wants_water: false,
                suspect: false,
            }))
        );
    }

    #[test]
    fn test_parse_status_without_temperature() {
        let Some(LogEntry::Status(status)) = parse_line(
            "status:{\"raw\":900,\"humidity\":17,\"temp\":null,\"state\":\"WATERING\",\"wants_water\":true}",
        ) else {
            panic!("status line expected");
        };

        assert_eq!(status.temp, None);
        assert_eq!(status.state, DeviceState::Watering);
        assert!(!status.suspect);
    }

    #[test]
    fn test_parse_events() {
        assert_eq!(
            parse_line("event:{\"kind\":\"watering_stopped\",\"reason\":\"desire_cleared\",\"humidity\":46}"),
            Some(LogEntry::Event(EventLine::WateringStopped {
                reason: StopReason::DesireCleared,
                humidity: 46,
            }))
        );
        assert_eq!(
            parse_line("event:{\"kind\":\"boot\"}"),
            Some(LogEntry::Event(EventLine::Boot))
        );
    }

    #[test]
    fn test_unrelated_lines_are_ignored() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("=== booting ==="), None);
        assert_eq!(parse_line("debug:{\"raw\":1}"), None);
        assert_eq!(parse_line("status:{\"raw\":"), None);
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(matches!(
            try_parse_line("event:{\"kind\":\"exploded\"}"),
            Err(MonitorError::Parse(_))
        ));
        assert!(matches!(try_parse_line("hello:world"), Ok(None)));
    }
}
