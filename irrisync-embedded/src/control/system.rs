use crate::time::{Millis, secs_ceil};

use super::{IrrigationConfig, evaluate_desire};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrrigationState {
    Idle,
    Watering { started_at: Millis },
    Analyzing { started_at: Millis },
}

impl IrrigationState {
    pub fn label(&self) -> &'static str {
        match self {
            IrrigationState::Idle => "IDLE",
            IrrigationState::Watering { .. } => "WATERING",
            IrrigationState::Analyzing { .. } => "ANALYZING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Moisture reached the high threshold.
    Satisfied,
    /// The hysteresis flag dropped while the pump was running.
    DesireCleared,
    /// The pump ran for the maximum watering duration.
    Timeout,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Satisfied => "satisfied",
            StopReason::DesireCleared => "desire_cleared",
            StopReason::Timeout => "timeout",
        }
    }
}

/// What a single control step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Unchanged,
    /// Water is needed but the cooldown since the last watering has not elapsed.
    Deferred { remaining_ms: u32 },
    WateringStarted,
    WateringStopped { reason: StopReason },
    AnalysisComplete { still_dry: bool },
}

#[derive(Debug, Clone)]
pub struct IrrigationStateMachine {
    config: IrrigationConfig,
    state: IrrigationState,
    wants_water: bool,
    last_watering_end: Option<Millis>,
}

impl IrrigationStateMachine {
    pub fn new(config: IrrigationConfig) -> Self {
        Self {
            config,
            state: IrrigationState::Idle,
            wants_water: false,
            last_watering_end: None,
        }
    }

    pub fn config(&self) -> &IrrigationConfig {
        &self.config
    }

    pub fn state(&self) -> IrrigationState {
        self.state
    }

    pub fn wants_water(&self) -> bool {
        self.wants_water
    }

    pub fn pump_active(&self) -> bool {
        matches!(self.state, IrrigationState::Watering { .. })
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, IrrigationState::Analyzing { .. })
    }

    pub fn last_watering_end(&self) -> Option<Millis> {
        self.last_watering_end
    }

    /// Runs the desire evaluator, then one transition step.
    pub fn update(&mut self, humidity: u8, now: Millis) -> StepOutcome {
        self.wants_water = evaluate_desire(humidity, self.wants_water, &self.config);
        self.step(humidity, now)
    }

    /// Evaluates the transitions out of the current state against `now`.
    ///
    /// Does not touch the hysteresis flag except when leaving the analysis window, where it
    /// is recomputed from the settled reading.
    pub fn step(&mut self, humidity: u8, now: Millis) -> StepOutcome {
        match self.state {
            IrrigationState::Analyzing { started_at } => {
                if now.elapsed_since(started_at) < self.config.analysis_duration_ms {
                    return StepOutcome::Unchanged;
                }

                let still_dry = humidity <= self.config.low_threshold;
                self.wants_water = still_dry;
                self.state = IrrigationState::Idle;

                StepOutcome::AnalysisComplete { still_dry }
            }
            IrrigationState::Watering { started_at } => {
                let reason = if humidity >= self.config.high_threshold {
                    StopReason::Satisfied
                } else if !self.wants_water {
                    StopReason::DesireCleared
                } else if now.elapsed_since(started_at) >= self.config.max_watering_duration_ms {
                    StopReason::Timeout
                } else {
                    return StepOutcome::Unchanged;
                };

                self.last_watering_end = Some(now);
                self.state = IrrigationState::Analyzing { started_at: now };

                StepOutcome::WateringStopped { reason }
            }
            IrrigationState::Idle => {
                if !self.wants_water || humidity > self.config.low_threshold {
                    return StepOutcome::Unchanged;
                }

                match self.cooldown_remaining_ms(now) {
                    0 => {
                        self.state = IrrigationState::Watering { started_at: now };
                        StepOutcome::WateringStarted
                    }
                    remaining_ms => StepOutcome::Deferred { remaining_ms },
                }
            }
        }
    }

    /// Milliseconds until another watering may start, zero if none has happened yet.
    pub fn cooldown_remaining_ms(&self, now: Millis) -> u32 {
        match self.last_watering_end {
            Some(end) => self
                .config
                .min_interval_between_waterings_ms
                .saturating_sub(now.elapsed_since(end)),
            None => 0,
        }
    }

    pub fn cooldown_remaining_secs(&self, now: Millis) -> u32 {
        secs_ceil(self.cooldown_remaining_ms(now))
    }

    pub fn watering_elapsed_secs(&self, now: Millis) -> Option<u32> {
        match self.state {
            IrrigationState::Watering { started_at } => {
                Some(secs_ceil(now.elapsed_since(started_at)))
            }
            _ => None,
        }
    }

    pub fn analysis_remaining_secs(&self, now: Millis) -> Option<u32> {
        match self.state {
            IrrigationState::Analyzing { started_at } => Some(secs_ceil(
                self.config
                    .analysis_duration_ms
                    .saturating_sub(now.elapsed_since(started_at)),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> IrrigationStateMachine {
        IrrigationStateMachine::new(IrrigationConfig::default())
    }

    fn assert_exclusive(machine: &IrrigationStateMachine) {
        assert!(!(machine.pump_active() && machine.is_analyzing()));
    }

    #[test]
    fn test_starts_idle_with_pump_off() {
        let machine = machine();
        assert_eq!(machine.state(), IrrigationState::Idle);
        assert!(!machine.pump_active());
        assert!(!machine.wants_water());
        assert_eq!(machine.last_watering_end(), None);
    }

    #[test]
    fn test_dry_soil_starts_watering_without_prior_watering() {
        let mut machine = machine();

        let outcome = machine.update(20, Millis::new(0));

        assert_eq!(outcome, StepOutcome::WateringStarted);
        assert!(machine.pump_active());
        assert_eq!(
            machine.state(),
            IrrigationState::Watering {
                started_at: Millis::new(0)
            }
        );
    }

    #[test]
    fn test_idle_with_cooldown_elapsed_starts_watering() {
        let mut machine = machine();
        machine.wants_water = true;
        machine.last_watering_end = Some(Millis::new(1_000));

        let outcome = machine.step(20, Millis::new(11_000));

        assert_eq!(outcome, StepOutcome::WateringStarted);
        assert!(machine.pump_active());
    }

    #[test]
    fn test_cooldown_defers_watering() {
        let mut machine = machine();
        machine.last_watering_end = Some(Millis::new(1_000));

        let outcome = machine.update(20, Millis::new(8_000));

        assert_eq!(outcome, StepOutcome::Deferred { remaining_ms: 3_000 });
        assert_eq!(machine.state(), IrrigationState::Idle);
        assert!(!machine.pump_active());
        assert!(machine.wants_water());
    }

    #[test]
    fn test_wants_water_alone_does_not_trigger() {
        let mut machine = machine();
        machine.wants_water = true;

        // Inside the band the flag holds, but humidity is above the low threshold.
        let outcome = machine.update(35, Millis::new(30_000));
        assert_eq!(outcome, StepOutcome::Unchanged);
        assert!(machine.wants_water());
        assert!(!machine.pump_active());
    }

    #[test]
    fn test_timeout_stops_watering_regardless_of_humidity() {
        let mut machine = machine();
        machine.update(20, Millis::new(0));

        assert_eq!(machine.update(20, Millis::new(999)), StepOutcome::Unchanged);

        let outcome = machine.update(20, Millis::new(1_000));

        assert_eq!(
            outcome,
            StepOutcome::WateringStopped {
                reason: StopReason::Timeout
            }
        );
        assert!(!machine.pump_active());
        assert!(machine.is_analyzing());
        assert_eq!(machine.last_watering_end(), Some(Millis::new(1_000)));
    }

    #[test]
    fn test_high_humidity_stops_watering() {
        let mut machine = IrrigationStateMachine::new(IrrigationConfig::long_watering());
        machine.update(10, Millis::new(0));

        let outcome = machine.update(47, Millis::new(2_000));

        assert_eq!(
            outcome,
            StepOutcome::WateringStopped {
                reason: StopReason::Satisfied
            }
        );
        assert!(!machine.wants_water());
        assert!(machine.is_analyzing());
    }

    #[test]
    fn test_cleared_desire_stops_watering() {
        let mut machine = IrrigationStateMachine::new(IrrigationConfig::long_watering());
        machine.update(10, Millis::new(0));
        machine.wants_water = false;

        let outcome = machine.step(35, Millis::new(500));

        assert_eq!(
            outcome,
            StepOutcome::WateringStopped {
                reason: StopReason::DesireCleared
            }
        );
    }

    #[test]
    fn test_analysis_completes_and_keeps_desire_when_still_dry() {
        let mut machine = machine();
        machine.update(20, Millis::new(0));
        machine.update(20, Millis::new(1_000));

        assert_eq!(machine.update(20, Millis::new(5_999)), StepOutcome::Unchanged);
        assert!(machine.is_analyzing());

        let outcome = machine.update(20, Millis::new(6_000));

        assert_eq!(outcome, StepOutcome::AnalysisComplete { still_dry: true });
        assert_eq!(machine.state(), IrrigationState::Idle);
        assert!(machine.wants_water());
    }

    #[test]
    fn test_analysis_exit_clears_desire_when_moist() {
        let mut machine = machine();
        machine.update(20, Millis::new(0));
        machine.update(20, Millis::new(1_000));

        let outcome = machine.update(38, Millis::new(6_000));

        assert_eq!(outcome, StepOutcome::AnalysisComplete { still_dry: false });
        assert!(!machine.wants_water());
    }

    #[test]
    fn test_no_watering_decision_while_analyzing() {
        let mut machine = machine();
        machine.update(20, Millis::new(0));
        machine.update(20, Millis::new(1_000));

        for t in (1_000..6_000).step_by(250) {
            let outcome = machine.update(5, Millis::new(t));
            assert_eq!(outcome, StepOutcome::Unchanged);
            assert!(!machine.pump_active());
        }
    }

    #[test]
    fn test_full_cycle_respects_cooldown() {
        let mut machine = machine();
        let mut waterings = 0;
        let mut starts = alloc::vec::Vec::new();

        for t in (0..40_000).step_by(100) {
            if machine.update(20, Millis::new(t)) == StepOutcome::WateringStarted {
                waterings += 1;
                starts.push(t);
            }
            assert_exclusive(&machine);
        }

        assert!(waterings >= 2);
        for pair in starts.windows(2) {
            // Each watering lasts 1s, so the next start is at least the cooldown after it.
            assert!(pair[1] - (pair[0] + 1_000) >= 10_000);
        }
    }

    #[test]
    fn test_timers_survive_clock_wrap() {
        let mut machine = machine();
        let start = Millis::new(u32::MAX - 300);

        machine.update(20, start);
        assert!(machine.pump_active());

        let outcome = machine.update(20, start.wrapping_add(1_000));
        assert_eq!(
            outcome,
            StepOutcome::WateringStopped {
                reason: StopReason::Timeout
            }
        );
        assert_eq!(
            machine.cooldown_remaining_ms(start.wrapping_add(4_000)),
            7_000
        );
    }

    #[test]
    fn test_countdowns_are_monotonic() {
        let mut machine = machine();
        machine.update(20, Millis::new(0));
        machine.update(20, Millis::new(1_000));

        let mut previous = u32::MAX;
        for t in (1_000..=7_000).step_by(50) {
            let remaining = machine.analysis_remaining_secs(Millis::new(t)).unwrap();
            assert!(remaining <= previous);
            previous = remaining;
        }
        assert_eq!(previous, 0);
        assert_eq!(machine.analysis_remaining_secs(Millis::new(1_000)), Some(5));
        assert_eq!(machine.analysis_remaining_secs(Millis::new(1_001)), Some(5));
        assert_eq!(machine.analysis_remaining_secs(Millis::new(5_001)), Some(1));

        let mut previous = u32::MAX;
        for t in (1_000..=12_000).step_by(50) {
            let remaining = machine.cooldown_remaining_secs(Millis::new(t));
            assert!(remaining <= previous);
            previous = remaining;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_watering_elapsed_rounds_up() {
        let mut machine = IrrigationStateMachine::new(IrrigationConfig::long_watering());
        machine.update(20, Millis::new(500));

        assert_eq!(machine.watering_elapsed_secs(Millis::new(500)), Some(0));
        assert_eq!(machine.watering_elapsed_secs(Millis::new(501)), Some(1));
        assert_eq!(machine.watering_elapsed_secs(Millis::new(2_600)), Some(3));
        assert_eq!(machine.analysis_remaining_secs(Millis::new(2_600)), None);
    }
}
