use embedded_hal::digital::{PinState, StatefulOutputPin};

use super::traits::Led;
use crate::config::ActiveLevel;

pub struct GpioLed<P: StatefulOutputPin> {
    pin: P,
    active: ActiveLevel,
}

impl<P: StatefulOutputPin> GpioLed<P> {
    /// Wrap `pin` and switch the LED off.
    pub fn new(pin: P, active: ActiveLevel) -> Self {
        let mut led = Self { pin, active };
        led.off();
        led
    }

    /// LED wired between the supply and the pin, like the Blue Pill's PC13 LED.
    pub fn active_low(pin: P) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    fn drive(&mut self, lit: bool) {
        self.pin
            .set_state(PinState::from(self.active.level(lit)))
            .ok();
    }
}

impl<P: StatefulOutputPin> Led for GpioLed<P> {
    fn on(&mut self) {
        self.drive(true);
    }

    fn off(&mut self) {
        self.drive(false);
    }

    fn toggle(&mut self) {
        self.pin.toggle().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType, OutputPin};

    struct Pin(bool);

    impl ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0 = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0 = true;
            Ok(())
        }
    }

    impl StatefulOutputPin for Pin {
        fn is_set_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0)
        }

        fn is_set_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0)
        }
    }

    #[test]
    fn active_low_starts_dark() {
        let led = GpioLed::active_low(Pin(false));
        assert!(led.pin.0);
    }

    #[test]
    fn on_off_follow_polarity() {
        let mut led = GpioLed::active_low(Pin(false));
        led.on();
        assert!(!led.pin.0);
        led.off();
        assert!(led.pin.0);

        let mut led = GpioLed::new(Pin(true), ActiveLevel::High);
        led.on();
        assert!(led.pin.0);
    }

    #[test]
    fn toggle_flips() {
        let mut led = GpioLed::active_low(Pin(false));
        led.toggle();
        led.toggle();
        led.toggle();
        assert!(!led.pin.0);
    }
}
