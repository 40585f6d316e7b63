//! TIM2 as the 1 kHz tick source.
//!
//! The timer runs from the 72 MHz APB1 timer clock, so with the default [`TickTimerConfig`] each
//! count is 1 µs and the counter register doubles as the sub-millisecond part of `micros`.

use embassy_stm32::pac;

use crate::clock::{SubTick, SubTickCounter, TickTimerConfig};

/// Handle to TIM2. Holds no state; the registers are the state.
pub struct Tim2TickTimer {
    _private: (),
}

impl Tim2TickTimer {
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Program prescaler and reload, enable the update interrupt and start counting.
    ///
    /// The NVIC line is left masked; unmask `TIM2` once the handler's state is ready.
    pub fn start(&self, config: TickTimerConfig) {
        pac::RCC.apb1enr().modify(|w| w.set_tim2en(true));

        let tim = pac::TIM2;
        tim.cr1().modify(|w| w.set_cen(false));
        tim.psc().write_value(config.prescaler);
        tim.arr().write(|w| w.set_arr(config.reload));
        tim.cnt().write(|w| w.set_cnt(0));
        // Load PSC now instead of at the first overflow.
        tim.egr().write(|w| w.set_ug(true));
        tim.sr().modify(|w| w.set_uif(false));
        tim.dier().modify(|w| w.set_uie(true));
        tim.cr1().modify(|w| w.set_cen(true));

        debug!(
            "TIM2 tick: psc={} arr={}",
            config.prescaler, config.reload
        );
    }

    /// Clear the update flag. Returns `false` if the interrupt was not an update.
    #[inline]
    pub fn acknowledge(&self) -> bool {
        let tim = pac::TIM2;
        if tim.sr().read().uif() {
            tim.sr().modify(|w| w.set_uif(false));
            true
        } else {
            false
        }
    }
}

impl Default for Tim2TickTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SubTickCounter for Tim2TickTimer {
    fn sub_tick(&self) -> SubTick {
        let tim = pac::TIM2;
        let count = tim.cnt().read().cnt() as u32;
        SubTick {
            count,
            wrap_pending: tim.sr().read().uif(),
        }
    }
}
