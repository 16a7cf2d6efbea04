use alloc::format;

use crate::control::IrrigationState;

use super::{Frame, StatusSnapshot};

/// Display pages, shown one at a time in a fixed rotation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    #[default]
    Plant,
    Sensors,
    System,
}

impl Page {
    pub fn next(self) -> Self {
        match self {
            Self::Plant => Self::Sensors,
            Self::Sensors => Self::System,
            Self::System => Self::Plant,
        }
    }

    pub fn render(self, snapshot: &StatusSnapshot) -> Frame {
        match self {
            Self::Plant => plant(snapshot),
            Self::Sensors => sensors(snapshot),
            Self::System => system(snapshot),
        }
    }
}

fn plant(snapshot: &StatusSnapshot) -> Frame {
    if matches!(snapshot.state, IrrigationState::Analyzing { .. }) {
        return Frame::new("Water absorbing", "Wait analysis");
    }

    let mood = match snapshot.humidity {
        81..=u8::MAX => "I'm drowning :O",
        61..=80 => "Too wet :|",
        41..=60 => "I'm happy :)",
        31..=40 => "I'm thirsty :/",
        16..=30 => "Water ASAP :(",
        _ => "I'm dying D:",
    };
    Frame::new("Your plant says:", mood)
}

fn sensors(snapshot: &StatusSnapshot) -> Frame {
    let temperature = match snapshot.temperature {
        Some(celsius) => format!("Temp: {celsius:.1}C"),
        None => "Temp: Error".into(),
    };

    match snapshot.state {
        IrrigationState::Analyzing { .. } => Frame::new(&temperature, "Stabilizing..."),
        _ => Frame::new(&temperature, &format!("Humidity: {}%", snapshot.humidity)),
    }
}

fn system(snapshot: &StatusSnapshot) -> Frame {
    match snapshot.state {
        IrrigationState::Watering { .. } => {
            let elapsed = snapshot.watering_elapsed_secs.unwrap_or(0);
            Frame::new("Pump: ON", &format!("Watering {elapsed}s"))
        }
        IrrigationState::Analyzing { .. } => match snapshot.analysis_remaining_secs {
            Some(remaining) if remaining > 0 => {
                Frame::new("Pump: OFF", &format!("Waiting {remaining}s"))
            }
            _ => Frame::new("Pump: OFF", "Finishing..."),
        },
        IrrigationState::Idle if !snapshot.wants_water => Frame::new("Pump: OFF", "No need"),
        IrrigationState::Idle => match snapshot.cooldown_remaining_secs {
            0 => Frame::new("Pump: OFF", "Preparing water"),
            remaining => Frame::new("Pump: OFF", &format!("Cooldown {remaining}s")),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::time::Millis;

    use super::*;

    fn snapshot(humidity: u8, state: IrrigationState) -> StatusSnapshot {
        StatusSnapshot {
            raw: 700,
            humidity,
            temperature: Some(22.5),
            state,
            wants_water: false,
            suspect: false,
            watering_elapsed_secs: None,
            analysis_remaining_secs: None,
            cooldown_remaining_secs: 0,
        }
    }

    #[test]
    fn test_pages_rotate() {
        assert_eq!(Page::Plant.next(), Page::Sensors);
        assert_eq!(Page::Sensors.next(), Page::System);
        assert_eq!(Page::System.next(), Page::Plant);
    }

    #[test]
    fn test_plant_mood_boundaries() {
        let mood = |humidity| Page::Plant.render(&snapshot(humidity, IrrigationState::Idle));

        assert_eq!(mood(81).line(1).trim_end(), "I'm drowning :O");
        assert_eq!(mood(80).line(1).trim_end(), "Too wet :|");
        assert_eq!(mood(60).line(1).trim_end(), "I'm happy :)");
        assert_eq!(mood(40).line(1).trim_end(), "I'm thirsty :/");
        assert_eq!(mood(30).line(1).trim_end(), "Water ASAP :(");
        assert_eq!(mood(15).line(1).trim_end(), "I'm dying D:");
        assert_eq!(mood(15).line(0), "Your plant says:");
    }

    #[test]
    fn test_sensor_page_shows_temperature_fault() {
        let mut status = snapshot(45, IrrigationState::Idle);
        let frame = Page::Sensors.render(&status);
        assert_eq!(frame.line(0).trim_end(), "Temp: 22.5C");
        assert_eq!(frame.line(1).trim_end(), "Humidity: 45%");

        status.temperature = None;
        status.state = IrrigationState::Analyzing {
            started_at: Millis::new(0),
        };
        let frame = Page::Sensors.render(&status);
        assert_eq!(frame.line(0).trim_end(), "Temp: Error");
        assert_eq!(frame.line(1).trim_end(), "Stabilizing...");
    }

    #[test]
    fn test_system_page_per_state() {
        let mut status = snapshot(20, IrrigationState::Watering {
            started_at: Millis::new(0),
        });
        status.watering_elapsed_secs = Some(3);
        let frame = Page::System.render(&status);
        assert_eq!(frame.line(0).trim_end(), "Pump: ON");
        assert_eq!(frame.line(1).trim_end(), "Watering 3s");

        status.state = IrrigationState::Analyzing {
            started_at: Millis::new(0),
        };
        status.analysis_remaining_secs = Some(4);
        assert_eq!(Page::System.render(&status).line(1).trim_end(), "Waiting 4s");
        status.analysis_remaining_secs = Some(0);
        assert_eq!(Page::System.render(&status).line(1).trim_end(), "Finishing...");

        status.state = IrrigationState::Idle;
        assert_eq!(Page::System.render(&status).line(1).trim_end(), "No need");
        status.wants_water = true;
        status.cooldown_remaining_secs = 7;
        assert_eq!(Page::System.render(&status).line(1).trim_end(), "Cooldown 7s");
        status.cooldown_remaining_secs = 0;
        assert_eq!(Page::System.render(&status).line(1).trim_end(), "Preparing water");
    }
}
