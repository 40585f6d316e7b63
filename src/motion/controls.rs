//! Front panel buttons.

use crate::hardware::traits::Button;

/// Button presses seen since the previous poll. Each flag is set once per press, not while held.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlEvents {
    pub zero: bool,
    pub coarse: bool,
    pub fine: bool,
}

impl ControlEvents {
    pub const NONE: ControlEvents = ControlEvents {
        zero: false,
        coarse: false,
        fine: false,
    };
}

/// Source of control events for the motion scheduler.
pub trait ControlPanel {
    fn poll(&mut self) -> ControlEvents;
}

/// Turns a level into a one-shot press.
#[derive(Copy, Clone, Debug, Default)]
struct PressLatch {
    held: bool,
}

impl PressLatch {
    fn update(&mut self, pressed: bool) -> bool {
        let fresh = pressed && !self.held;
        self.held = pressed;
        fresh
    }
}

/// Zero, coarse and fine buttons with press latching.
pub struct Controls<Z: Button, C: Button, F: Button> {
    zero: Z,
    coarse: C,
    fine: F,
    latches: [PressLatch; 3],
}

impl<Z: Button, C: Button, F: Button> Controls<Z, C, F> {
    pub fn new(zero: Z, coarse: C, fine: F) -> Self {
        Self {
            zero,
            coarse,
            fine,
            latches: [PressLatch::default(); 3],
        }
    }
}

impl<Z: Button, C: Button, F: Button> ControlPanel for Controls<Z, C, F> {
    fn poll(&mut self) -> ControlEvents {
        let [zero, coarse, fine] = &mut self.latches;
        ControlEvents {
            zero: zero.update(self.zero.is_pressed()),
            coarse: coarse.update(self.coarse.is_pressed()),
            fine: fine.update(self.fine.is_pressed()),
        }
    }
}
