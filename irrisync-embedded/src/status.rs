use alloc::format;
use alloc::string::String;

use embedded_hal_nb::nb::block;
use embedded_hal_nb::serial::Write;

use crate::control::{StepOutcome, StopReason};
use crate::display::StatusSnapshot;
use crate::error::Error;

pub const STATUS_TOPIC: &str = "status";
pub const EVENT_TOPIC: &str = "event";

/// Notable transitions reported on the log stream alongside the per-cycle status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Boot,
    WateringStarted { humidity: u8 },
    WateringDeferred { remaining_ms: u32 },
    WateringStopped { reason: StopReason, humidity: u8 },
    AnalysisComplete { still_dry: bool },
}

impl Event {
    pub fn from_outcome(outcome: StepOutcome, humidity: u8) -> Option<Self> {
        match outcome {
            StepOutcome::Unchanged => None,
            StepOutcome::Deferred { remaining_ms } => Some(Self::WateringDeferred { remaining_ms }),
            StepOutcome::WateringStarted => Some(Self::WateringStarted { humidity }),
            StepOutcome::WateringStopped { reason } => {
                Some(Self::WateringStopped { reason, humidity })
            }
            StepOutcome::AnalysisComplete { still_dry } => {
                Some(Self::AnalysisComplete { still_dry })
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Boot => "boot",
            Self::WateringStarted { .. } => "watering_started",
            Self::WateringDeferred { .. } => "watering_deferred",
            Self::WateringStopped { .. } => "watering_stopped",
            Self::AnalysisComplete { .. } => "analysis_complete",
        }
    }

    pub fn to_json(&self) -> String {
        let kind = self.kind();
        match self {
            Self::Boot => format!("{{\"kind\":\"{kind}\"}}"),
            Self::WateringStarted { humidity } => {
                format!("{{\"kind\":\"{kind}\",\"humidity\":{humidity}}}")
            }
            Self::WateringDeferred { remaining_ms } => {
                format!("{{\"kind\":\"{kind}\",\"remaining_ms\":{remaining_ms}}}")
            }
            Self::WateringStopped { reason, humidity } => format!(
                "{{\"kind\":\"{kind}\",\"reason\":\"{}\",\"humidity\":{humidity}}}",
                reason.as_str()
            ),
            Self::AnalysisComplete { still_dry } => {
                format!("{{\"kind\":\"{kind}\",\"still_dry\":{still_dry}}}")
            }
        }
    }
}

pub fn status_json(snapshot: &StatusSnapshot) -> String {
    let temp = match snapshot.temperature {
        Some(celsius) => format!("{celsius:.1}"),
        None => String::from("null"),
    };

    format!(
        "{{\"raw\":{},\"humidity\":{},\"temp\":{},\"state\":\"{}\",\"wants_water\":{},\"suspect\":{}}}",
        snapshot.raw,
        snapshot.humidity,
        temp,
        snapshot.state.label(),
        snapshot.wants_water,
        snapshot.suspect
    )
}

fn write_all<S>(serial: &mut S, buffer: &[u8]) -> Result<(), Error>
where
    S: Write<u8, Error = Error>,
{
    for &byte in buffer {
        block!(serial.write(byte))?;
    }
    Ok(())
}

/// Writes one `topic:payload` line and flushes.
pub fn send_message<S>(serial: &mut S, topic: &str, payload: &str) -> Result<(), Error>
where
    S: Write<u8, Error = Error>,
{
    let message = format!("{topic}:{payload}\n");
    write_all(serial, message.as_bytes())?;
    block!(serial.flush())?;
    Ok(())
}

pub fn send_status<S>(serial: &mut S, snapshot: &StatusSnapshot) -> Result<(), Error>
where
    S: Write<u8, Error = Error>,
{
    send_message(serial, STATUS_TOPIC, &status_json(snapshot))
}

pub fn send_event<S>(serial: &mut S, event: &Event) -> Result<(), Error>
where
    S: Write<u8, Error = Error>,
{
    send_message(serial, EVENT_TOPIC, &event.to_json())
}
