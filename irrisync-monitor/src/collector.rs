use std::collections::VecDeque;

use time::OffsetDateTime;

use crate::parser::{DeviceState, EventLine, LogEntry, StatusLine};

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<T> {
    pub timestamp: OffsetDateTime,
    pub value: T,
}

/// Coarse reading of the latest humidity, matching the controller thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumidityBand {
    Dry,
    Moderate,
    Good,
}

impl HumidityBand {
    pub fn classify(humidity: u8) -> Self {
        match humidity {
            0..30 => Self::Dry,
            30..45 => Self::Moderate,
            _ => Self::Good,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub total_waterings: u64,
    pub humidity_average: Option<f32>,
    pub temperature_average: Option<f32>,
    pub last_watering: Option<OffsetDateTime>,
}

/// Bounded history of what the controller reported.
#[derive(Debug, Clone)]
pub struct DataCollector {
    history_limit: usize,
    humidity: VecDeque<Sample<u8>>,
    temperature: VecDeque<Sample<f32>>,
    events: VecDeque<Sample<EventLine>>,
    last_status: Option<StatusLine>,
    statistics: Statistics,
}

impl DataCollector {
    pub fn new(history_limit: usize) -> Self {
        let history_limit = history_limit.max(1);
        Self {
            history_limit,
            humidity: VecDeque::with_capacity(history_limit),
            temperature: VecDeque::with_capacity(history_limit),
            events: VecDeque::with_capacity(history_limit),
            last_status: None,
            statistics: Statistics::default(),
        }
    }

    pub fn record(&mut self, entry: LogEntry, timestamp: OffsetDateTime) {
        match entry {
            LogEntry::Status(status) => {
                push_bounded(&mut self.humidity, self.history_limit, Sample {
                    timestamp,
                    value: status.humidity,
                });
                // Faulted temperature readings carry no value.
                if let Some(temp) = status.temp {
                    push_bounded(&mut self.temperature, self.history_limit, Sample {
                        timestamp,
                        value: temp,
                    });
                }
                self.last_status = Some(status);
            }
            LogEntry::Event(event) => {
                if matches!(event, EventLine::WateringStarted { .. }) {
                    self.statistics.total_waterings += 1;
                    self.statistics.last_watering = Some(timestamp);
                }
                push_bounded(&mut self.events, self.history_limit, Sample {
                    timestamp,
                    value: event,
                });
            }
        }

        self.update_statistics();
    }

    pub fn record_now(&mut self, entry: LogEntry) {
        self.record(entry, OffsetDateTime::now_utc());
    }

    pub fn humidity(&self) -> &VecDeque<Sample<u8>> {
        &self.humidity
    }

    pub fn temperature(&self) -> &VecDeque<Sample<f32>> {
        &self.temperature
    }

    pub fn events(&self) -> &VecDeque<Sample<EventLine>> {
        &self.events
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn latest_humidity(&self) -> Option<u8> {
        self.humidity.back().map(|sample| sample.value)
    }

    pub fn latest_temperature(&self) -> Option<f32> {
        self.temperature.back().map(|sample| sample.value)
    }

    pub fn humidity_band(&self) -> Option<HumidityBand> {
        self.latest_humidity().map(HumidityBand::classify)
    }

    pub fn device_state(&self) -> Option<DeviceState> {
        self.last_status.as_ref().map(|status| status.state)
    }

    pub fn clear(&mut self) {
        self.humidity.clear();
        self.temperature.clear();
        self.events.clear();
        self.last_status = None;
        self.statistics = Statistics::default();
    }

    fn update_statistics(&mut self) {
        self.statistics.humidity_average =
            average(self.humidity.iter().map(|sample| sample.value as f32));
        self.statistics.temperature_average =
            average(self.temperature.iter().map(|sample| sample.value));
    }
}

impl Default for DataCollector {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

fn push_bounded<T>(history: &mut VecDeque<T>, limit: usize, value: T) {
    if history.len() == limit {
        history.pop_front();
    }
    history.push_back(value);
}

fn average(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, count) = values.fold((0.0, 0u32), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f32)
}
