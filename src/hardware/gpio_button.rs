use embedded_hal::digital::InputPin;

use super::traits::Button;
use crate::config::ActiveLevel;

pub struct GpioButton<P: InputPin> {
    pin: P,
    active: ActiveLevel,
}

impl<P: InputPin> GpioButton<P> {
    pub fn new(pin: P, active: ActiveLevel) -> Self {
        Self { pin, active }
    }

    /// Button that pulls the input to ground when pressed (internal or external pull-up).
    pub fn active_low(pin: P) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    pub fn free(self) -> P {
        self.pin
    }
}

impl<P: InputPin> Button for GpioButton<P> {
    /// A pin that cannot be read counts as released.
    fn is_pressed(&mut self) -> bool {
        let high = match self.pin.is_high() {
            Ok(high) => high,
            Err(_) => return false,
        };
        high == self.active.level(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    struct Pin(Result<bool, ErrorKind>);

    impl ErrorType for Pin {
        type Error = ErrorKind;
    }

    impl InputPin for Pin {
        fn is_high(&mut self) -> Result<bool, ErrorKind> {
            self.0
        }

        fn is_low(&mut self) -> Result<bool, ErrorKind> {
            self.0.map(|h| !h)
        }
    }

    #[test]
    fn active_low_pressed_when_grounded() {
        assert!(GpioButton::active_low(Pin(Ok(false))).is_pressed());
        assert!(!GpioButton::active_low(Pin(Ok(true))).is_pressed());
    }

    #[test]
    fn active_high() {
        assert!(GpioButton::new(Pin(Ok(true)), ActiveLevel::High).is_pressed());
    }

    #[test]
    fn read_error_is_released() {
        assert!(!GpioButton::active_low(Pin(Err(ErrorKind::Other))).is_pressed());
    }
}
