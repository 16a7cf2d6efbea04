mod buffer;
mod lcd;
mod page;
mod presenter;

pub use buffer::BufferDisplay;
pub use lcd::{DEFAULT_ADDRESS, I2cLcd};
pub use page::Page;
pub use presenter::{DEFAULT_PAGE_INTERVAL_MS, StatusPresenter, StatusSnapshot};

use alloc::format;
use alloc::string::String;

use crate::error::Result;

pub const LCD_COLS: usize = 16;
pub const LCD_ROWS: usize = 2;

/// Character display addressed by column and row.
pub trait CharDisplay {
    fn clear(&mut self) -> Result<()>;

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<()>;

    fn write_str(&mut self, text: &str) -> Result<()>;
}

/// Both rows of the display, each padded or cut to exactly `LCD_COLS` characters so that
/// painting a frame overwrites whatever was there before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    lines: [String; LCD_ROWS],
}

impl Frame {
    pub fn new(top: &str, bottom: &str) -> Self {
        Self {
            lines: [fit(top), fit(bottom)],
        }
    }

    pub fn splash() -> Self {
        Self::new("Irrigation Sys", "Starting...")
    }

    pub fn ready() -> Self {
        Self::new("Pump: OFF", "System ready")
    }

    /// Text of `row`, clamped to the bottom row like the cursor.
    pub fn line(&self, row: usize) -> &str {
        &self.lines[row.min(LCD_ROWS - 1)]
    }

    pub fn paint<D: CharDisplay>(&self, display: &mut D) -> Result<()> {
        display.clear()?;
        for (row, line) in self.lines.iter().enumerate() {
            display.set_cursor(0, row as u8)?;
            display.write_str(line)?;
        }
        Ok(())
    }
}

fn fit(text: &str) -> String {
    format!("{:<1$.1$}", text, LCD_COLS)
}
