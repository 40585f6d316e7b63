//! Both-edge external interrupts for the encoder channels.
//!
//! The EXTI lines are driven through the PAC so the handlers can be plain `#[interrupt]`
//! functions.

use embassy_stm32::pac;

/// Port index for the AFIO EXTI selector. Only GPIOA carries encoder inputs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Port {
    A = 0,
}

/// Route pin `line` of `port` to EXTI line `line` and trigger on both edges.
///
/// The interrupt is unmasked in EXTI but not in the NVIC.
pub fn listen_both_edges(port: Port, line: usize) {
    pac::RCC.apb2enr().modify(|w| w.set_afioen(true));
    pac::AFIO
        .exticr(line / 4)
        .modify(|w| w.set_exti(line % 4, port as u8));

    pac::EXTI.rtsr(0).modify(|w| w.set_line(line, true));
    pac::EXTI.ftsr(0).modify(|w| w.set_line(line, true));
    clear_pending(line);
    pac::EXTI.imr(0).modify(|w| w.set_line(line, true));
}

/// Acknowledge `line`. Write-one-to-clear, so other pending lines are untouched.
#[inline]
pub fn clear_pending(line: usize) {
    pac::EXTI.pr(0).write(|w| w.set_line(line, true));
}
