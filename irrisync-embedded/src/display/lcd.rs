use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::{Error, Result};

use super::{CharDisplay, LCD_COLS, LCD_ROWS};

/// Usual address of a PCF8574 backpack with all address jumpers open.
pub const DEFAULT_ADDRESS: u8 = 0x27;

// Expander bits wired to the HD44780 control lines.
const REGISTER_SELECT: u8 = 0x01;
const ENABLE: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INCREMENT: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_SET_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM_ADDR: u8 = 0x80;

const ROW_OFFSETS: [u8; LCD_ROWS] = [0x00, 0x40];

/// HD44780 character LCD driven in 4-bit mode through a PCF8574 I2C expander.
pub struct I2cLcd<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    i2c: I2C,
    delay: D,
    address: u8,
    backlight: bool,
}

impl<I2C, D> I2cLcd<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            backlight: true,
        }
    }

    /// Power-on sequence: three 8-bit function sets, switch to 4-bit, then configure.
    pub fn init(&mut self) -> Result<()> {
        self.delay.delay_ms(50);
        self.write_expander(0)?;
        self.delay.delay_ms(1);

        for wait_us in [4_500, 4_500, 150] {
            self.write_nibble(0x30, 0)?;
            self.delay.delay_us(wait_us);
        }
        self.write_nibble(0x20, 0)?;

        self.command(CMD_FUNCTION_SET_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE_INCREMENT)?;

        log::debug!("LCD initialized at address 0x{:02x}", self.address);
        Ok(())
    }

    pub fn set_backlight(&mut self, on: bool) -> Result<()> {
        self.backlight = on;
        self.write_expander(0)
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, value: u8) -> Result<()> {
        self.send(value, 0)
    }

    fn send(&mut self, value: u8, mode: u8) -> Result<()> {
        self.write_nibble(value & 0xF0, mode)?;
        self.write_nibble((value << 4) & 0xF0, mode)
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<()> {
        let data = nibble | mode;
        self.write_expander(data)?;
        self.pulse_enable(data)
    }

    fn pulse_enable(&mut self, data: u8) -> Result<()> {
        self.write_expander(data | ENABLE)?;
        self.delay.delay_us(1);
        self.write_expander(data & !ENABLE)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn write_expander(&mut self, data: u8) -> Result<()> {
        let backlight = if self.backlight { BACKLIGHT } else { 0 };
        self.i2c
            .write(self.address, &[data | backlight])
            .map_err(|_| Error::DisplayFault)
    }
}

impl<I2C, D> CharDisplay for I2cLcd<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn clear(&mut self) -> Result<()> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<()> {
        let row = (row as usize).min(LCD_ROWS - 1);
        let col = col.min(LCD_COLS as u8 - 1);
        self.command(CMD_SET_DDRAM_ADDR | (col + ROW_OFFSETS[row]))
    }

    fn write_str(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            let code = if c.is_ascii() { c as u8 } else { b'?' };
            self.send(code, REGISTER_SELECT)?;
        }
        Ok(())
    }
}
