use alloc::string::String;

use crate::error::Result;

use super::{CharDisplay, LCD_COLS, LCD_ROWS};

/// In-memory display grid, for hosts without a panel.
#[derive(Debug, Clone)]
pub struct BufferDisplay {
    cells: [[char; LCD_COLS]; LCD_ROWS],
    col: usize,
    row: usize,
    clear_count: u32,
}

impl BufferDisplay {
    pub fn new() -> Self {
        Self {
            cells: [[' '; LCD_COLS]; LCD_ROWS],
            col: 0,
            row: 0,
            clear_count: 0,
        }
    }

    pub fn line(&self, row: usize) -> String {
        self.cells[row.min(LCD_ROWS - 1)].iter().collect()
    }

    pub fn clear_count(&self) -> u32 {
        self.clear_count
    }
}

impl Default for BufferDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl CharDisplay for BufferDisplay {
    fn clear(&mut self) -> Result<()> {
        self.cells = [[' '; LCD_COLS]; LCD_ROWS];
        self.col = 0;
        self.row = 0;
        self.clear_count += 1;
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<()> {
        self.col = col as usize;
        self.row = (row as usize).min(LCD_ROWS - 1);
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            // Characters past the last column land in invisible memory on the real panel.
            if self.col < LCD_COLS {
                self.cells[self.row][self.col] = c;
            }
            self.col += 1;
        }
        Ok(())
    }
}
