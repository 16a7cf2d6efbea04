use crate::control::{IrrigationState, IrrigationStateMachine};
use crate::error::Result;
use crate::sensor::MoistureReading;
use crate::time::Millis;

use super::{CharDisplay, Frame, Page};

pub const DEFAULT_PAGE_INTERVAL_MS: u32 = 3_000;

/// Everything the presenter needs from one control cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub raw: u16,
    pub humidity: u8,
    /// `None` when the temperature sensor faulted this cycle.
    pub temperature: Option<f32>,
    pub state: IrrigationState,
    pub wants_water: bool,
    pub suspect: bool,
    pub watering_elapsed_secs: Option<u32>,
    pub analysis_remaining_secs: Option<u32>,
    pub cooldown_remaining_secs: u32,
}

impl StatusSnapshot {
    pub fn capture(
        machine: &IrrigationStateMachine,
        reading: &MoistureReading,
        temperature: Option<f32>,
        now: Millis,
    ) -> Self {
        Self {
            raw: reading.raw,
            humidity: reading.humidity,
            temperature,
            state: machine.state(),
            wants_water: machine.wants_water(),
            suspect: reading.suspect,
            watering_elapsed_secs: machine.watering_elapsed_secs(now),
            analysis_remaining_secs: machine.analysis_remaining_secs(now),
            cooldown_remaining_secs: machine.cooldown_remaining_secs(now),
        }
    }
}

/// Rotates through the pages on its own schedule and repaints the display only when the
/// visible frame changes.
#[derive(Debug)]
pub struct StatusPresenter {
    page: Page,
    page_started: Option<Millis>,
    page_interval_ms: u32,
    last_frame: Option<Frame>,
}

impl StatusPresenter {
    pub fn new(page_interval_ms: u32) -> Self {
        Self {
            page: Page::default(),
            page_started: None,
            page_interval_ms,
            last_frame: None,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn tick(&mut self, now: Millis) -> Page {
        match self.page_started {
            None => self.page_started = Some(now),
            Some(started) if now.elapsed_since(started) >= self.page_interval_ms => {
                self.page = self.page.next();
                self.page_started = Some(now);
            }
            Some(_) => {}
        }
        self.page
    }

    pub fn render(&self, snapshot: &StatusSnapshot) -> Frame {
        self.page.render(snapshot)
    }

    /// Advances the page schedule and repaints if needed. Returns whether the display was
    /// written.
    pub fn refresh<D: CharDisplay>(
        &mut self,
        display: &mut D,
        snapshot: &StatusSnapshot,
        now: Millis,
    ) -> Result<bool> {
        self.tick(now);
        let frame = self.render(snapshot);
        if self.last_frame.as_ref() == Some(&frame) {
            return Ok(false);
        }

        self.show(display, frame)?;
        Ok(true)
    }

    /// Paints a frame unconditionally, e.g. the boot screens.
    pub fn show<D: CharDisplay>(&mut self, display: &mut D, frame: Frame) -> Result<()> {
        frame.paint(display)?;
        self.last_frame = Some(frame);
        Ok(())
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }
}

impl Default for StatusPresenter {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_INTERVAL_MS)
    }
}
