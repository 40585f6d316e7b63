//! Write-only bit-banged SPI, mode 0, MSB first.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

/// Half of one SCK period.
pub const HALF_CLOCK_US: u32 = 10;

pub struct SoftSpi<CS, SCK, MOSI, D>
where
    CS: OutputPin,
    SCK: OutputPin,
    MOSI: OutputPin,
    D: DelayNs,
{
    cs: CS,
    sck: SCK,
    mosi: MOSI,
    delay: D,
}

impl<CS, SCK, MOSI, D> SoftSpi<CS, SCK, MOSI, D>
where
    CS: OutputPin,
    SCK: OutputPin,
    MOSI: OutputPin,
    D: DelayNs,
{
    /// Take the pins and park the bus: CS high, SCK and MOSI low.
    pub fn new(mut cs: CS, mut sck: SCK, mut mosi: MOSI, delay: D) -> Self {
        cs.set_high().ok();
        sck.set_low().ok();
        mosi.set_low().ok();
        Self {
            cs,
            sck,
            mosi,
            delay,
        }
    }

    /// Clock `bytes` out inside one chip-select frame.
    pub fn write(&mut self, bytes: &[u8]) {
        self.cs.set_low().ok();
        for &byte in bytes {
            self.shift_out(byte);
        }
        self.cs.set_high().ok();
    }

    fn shift_out(&mut self, byte: u8) {
        for bit in (0..8).rev() {
            self.mosi
                .set_state(PinState::from(byte & (1 << bit) != 0))
                .ok();
            self.sck.set_high().ok();
            self.delay.delay_us(HALF_CLOCK_US);
            self.sck.set_low().ok();
            self.delay.delay_us(HALF_CLOCK_US);
        }
    }

    pub fn free(self) -> (CS, SCK, MOSI, D) {
        (self.cs, self.sck, self.mosi, self.delay)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::rc::Rc;
    use std::vec::Vec;

    /// Bus analyser: reassembles frames from pin activity.
    #[derive(Default)]
    pub(crate) struct Bus {
        cs: bool,
        mosi: bool,
        bits: u32,
        current: Vec<u8>,
        pub frames: Vec<Vec<u8>>,
    }

    pub(crate) type SharedBus = Rc<RefCell<Bus>>;

    pub(crate) struct Cs(pub SharedBus);
    pub(crate) struct Sck(pub SharedBus);
    pub(crate) struct Mosi(pub SharedBus);
    pub(crate) struct NoDelay;

    impl ErrorType for Cs {
        type Error = Infallible;
    }
    impl ErrorType for Sck {
        type Error = Infallible;
    }
    impl ErrorType for Mosi {
        type Error = Infallible;
    }

    impl OutputPin for Cs {
        fn set_low(&mut self) -> Result<(), Infallible> {
            let mut bus = self.0.borrow_mut();
            bus.cs = false;
            bus.bits = 0;
            bus.current.clear();
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            let mut bus = self.0.borrow_mut();
            if !bus.cs && !bus.current.is_empty() {
                let frame = core::mem::take(&mut bus.current);
                bus.frames.push(frame);
            }
            bus.cs = true;
            Ok(())
        }
    }

    impl OutputPin for Sck {
        fn set_low(&mut self) -> Result<(), Infallible> {
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            let mut bus = self.0.borrow_mut();
            if bus.cs {
                return Ok(());
            }
            if bus.bits % 8 == 0 {
                bus.current.push(0);
            }
            let bit = bus.mosi as u8;
            if let Some(last) = bus.current.last_mut() {
                *last = *last << 1 | bit;
            }
            bus.bits += 1;
            Ok(())
        }
    }

    impl OutputPin for Mosi {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().mosi = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().mosi = true;
            Ok(())
        }
    }

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    pub(crate) fn bus() -> (SoftSpi<Cs, Sck, Mosi, NoDelay>, SharedBus) {
        let bus: SharedBus = Rc::new(RefCell::new(Bus {
            cs: true,
            ..Default::default()
        }));
        let spi = SoftSpi::new(Cs(bus.clone()), Sck(bus.clone()), Mosi(bus.clone()), NoDelay);
        (spi, bus)
    }

    #[test]
    fn bytes_go_out_msb_first_in_one_frame() {
        let (mut spi, bus) = bus();
        spi.write(&[0x0C, 0x01]);
        spi.write(&[0xA5]);

        let bus = bus.borrow();
        assert_eq!(bus.frames, [vec![0x0C, 0x01], vec![0xA5]]);
        assert!(bus.cs);
    }
}
