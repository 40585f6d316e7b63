//! MAX7219 eight digit LED driver on a bit-banged bus.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use super::soft_spi::SoftSpi;
use crate::display::{self, DIGITS, PositionDisplay};

pub mod reg {
    /// Digit registers are 0x01 (right-most) to 0x08 (left-most).
    pub const DIGIT0: u8 = 0x01;
    pub const DECODE_MODE: u8 = 0x09;
    pub const INTENSITY: u8 = 0x0A;
    pub const SCAN_LIMIT: u8 = 0x0B;
    pub const SHUTDOWN: u8 = 0x0C;
    pub const DISPLAY_TEST: u8 = 0x0F;
}

/// Full brightness.
pub const MAX_INTENSITY: u8 = 0x0F;

pub struct Max7219<CS, SCK, MOSI, D>
where
    CS: OutputPin,
    SCK: OutputPin,
    MOSI: OutputPin,
    D: DelayNs,
{
    spi: SoftSpi<CS, SCK, MOSI, D>,
}

impl<CS, SCK, MOSI, D> Max7219<CS, SCK, MOSI, D>
where
    CS: OutputPin,
    SCK: OutputPin,
    MOSI: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: SoftSpi<CS, SCK, MOSI, D>) -> Self {
        Self { spi }
    }

    /// Raw segment mode on all eight digits, blanked, then out of shutdown.
    pub fn init(&mut self) {
        self.write_reg(reg::DISPLAY_TEST, 0);
        self.write_reg(reg::SCAN_LIMIT, DIGITS as u8 - 1);
        self.write_reg(reg::DECODE_MODE, 0);
        self.write_reg(reg::INTENSITY, MAX_INTENSITY);
        self.clear();
        self.write_reg(reg::SHUTDOWN, 1);
        debug!("max7219 initialised");
    }

    pub fn write_reg(&mut self, addr: u8, data: u8) {
        self.spi.write(&[addr, data]);
    }

    pub fn clear(&mut self) {
        self.show_segments(&[0; DIGITS]);
    }

    /// Write segment patterns, left-most digit first.
    pub fn show_segments(&mut self, segments: &[u8; DIGITS]) {
        for (i, &seg) in segments.iter().enumerate() {
            self.write_reg(reg::DIGIT0 + (DIGITS - 1 - i) as u8, seg);
        }
    }

    pub fn free(self) -> SoftSpi<CS, SCK, MOSI, D> {
        self.spi
    }
}

impl<CS, SCK, MOSI, D> PositionDisplay for Max7219<CS, SCK, MOSI, D>
where
    CS: OutputPin,
    SCK: OutputPin,
    MOSI: OutputPin,
    D: DelayNs,
{
    fn show(&mut self, position: i32) {
        self.show_segments(&display::render(position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::segments;
    use crate::hardware::soft_spi::tests::bus;

    #[test]
    fn init_sequence() {
        let (spi, bus) = bus();
        let mut disp = Max7219::new(spi);
        disp.init();

        let bus = bus.borrow();
        let frames = &bus.frames;
        assert_eq!(frames.len(), 4 + DIGITS + 1);
        assert_eq!(frames[0], [reg::DISPLAY_TEST, 0]);
        assert_eq!(frames[1], [reg::SCAN_LIMIT, 7]);
        assert_eq!(frames[2], [reg::DECODE_MODE, 0]);
        assert_eq!(frames[3], [reg::INTENSITY, 0x0F]);
        assert!(frames[4..4 + DIGITS].iter().all(|f| f[1] == 0));
        assert_eq!(frames[frames.len() - 1], [reg::SHUTDOWN, 1]);
    }

    #[test]
    fn left_most_character_goes_to_digit_8() {
        let (spi, bus) = bus();
        let mut disp = Max7219::new(spi);
        disp.show(-42);

        let bus = bus.borrow();
        let frames = &bus.frames;
        assert_eq!(frames.len(), DIGITS);
        assert_eq!(frames[0], [0x08, segments(b'-', false)]);
        assert_eq!(frames[3], [0x05, segments(b'0', true)]);
        assert_eq!(frames[4], [0x04, segments(b'0', false)]);
        assert_eq!(frames[7], [0x01, segments(b'2', false)]);
    }
}
