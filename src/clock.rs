//! Free-running millisecond clock and calibrated busy-wait delay.
//!
//! A hardware timer raises an update interrupt once per millisecond and the handler calls
//! [`Clock::tick`]. The foreground reads the counter with [`Clock::millis`] and, combined with the
//! timer's own counter register, [`Clock::micros`]. Every read happens inside a critical section
//! that restores the previous interrupt state on exit, so a read from code that already masked
//! interrupts does not re-enable them.
//!
//! [`BusyDelay`] does not depend on the tick interrupt at all; it spins a counted loop and works
//! before the timer is started and inside critical sections.

use core::cell::Cell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use embedded_hal::delay::DelayNs;

/// Tick interrupt rate.
pub const TICK_HZ: u32 = 1_000;

/// Prescaler and reload values that make a timer overflow at [`TICK_HZ`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickTimerConfig {
    /// Register value for the prescaler (divide by `prescaler + 1`).
    pub prescaler: u16,
    /// Register value for the auto-reload / compare match (period is `reload + 1` counts).
    pub reload: u16,
    /// Microseconds represented by one count of the timer.
    pub us_per_count: u32,
}

impl TickTimerConfig {
    /// Derive the tick timer configuration for a timer clocked at `timer_hz` divided by `divisor`.
    ///
    /// The divided clock must be a whole number of counts per microsecond period so that
    /// [`Clock::micros`] stays exact, e.g. 72 MHz / 72 = 1 µs per count, or 16 MHz / 64 = 4 µs per
    /// count.
    pub const fn new(timer_hz: u32, divisor: u32) -> Self {
        assert!(divisor >= 1 && divisor <= 65_536);
        let count_hz = timer_hz / divisor;
        assert!(count_hz >= TICK_HZ && count_hz <= 1_000_000 && 1_000_000 % count_hz == 0);
        let counts_per_tick = count_hz / TICK_HZ;
        assert!(counts_per_tick >= 2 && counts_per_tick <= 65_536);

        Self {
            prescaler: (divisor - 1) as u16,
            reload: (counts_per_tick - 1) as u16,
            us_per_count: 1_000_000 / count_hz,
        }
    }

    /// Number of timer counts in one tick.
    #[inline]
    pub const fn counts_per_tick(&self) -> u32 {
        self.reload as u32 + 1
    }
}

/// Snapshot of the tick timer's own counter.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SubTick {
    /// Current counter register value.
    pub count: u32,
    /// The timer has overflowed but the tick interrupt has not run yet.
    pub wrap_pending: bool,
}

/// Read access to the counter of the timer driving [`Clock::tick`].
pub trait SubTickCounter {
    fn sub_tick(&self) -> SubTick;
}

/// Anything that can report elapsed milliseconds.
pub trait TimeSource {
    fn millis(&self) -> u32;
}

/// Millisecond tick counter shared between the timer interrupt and the foreground.
pub struct Clock {
    ticks: Mutex<CriticalSectionRawMutex, Cell<u32>>,
    timer: TickTimerConfig,
}

impl Clock {
    pub const fn new(timer: TickTimerConfig) -> Self {
        Self {
            ticks: Mutex::new(Cell::new(0)),
            timer,
        }
    }

    /// Advance by one tick. Call from the timer interrupt only.
    #[inline]
    pub fn tick(&self) {
        self.ticks.lock(|t| t.set(t.get().wrapping_add(1)));
    }

    /// Milliseconds since the timer started, wrapping after ~49.7 days.
    pub fn millis(&self) -> u32 {
        self.ticks.lock(|t| t.get())
    }

    /// Microseconds since the timer started, wrapping after ~71.6 minutes.
    ///
    /// The tick counter and the timer counter are sampled in the same critical section. If the
    /// timer overflowed while interrupts were masked the missing tick is added here.
    pub fn micros(&self, counter: &impl SubTickCounter) -> u32 {
        self.ticks.lock(|t| {
            let mut ms = t.get();
            let sub = counter.sub_tick();
            if sub.wrap_pending && sub.count < self.timer.counts_per_tick() / 2 {
                ms = ms.wrapping_add(1);
            }
            ms.wrapping_mul(1000)
                .wrapping_add(sub.count.wrapping_mul(self.timer.us_per_count))
        })
    }
}

impl TimeSource for Clock {
    #[inline]
    fn millis(&self) -> u32 {
        Clock::millis(self)
    }
}

impl<T: TimeSource> TimeSource for &T {
    #[inline]
    fn millis(&self) -> u32 {
        (**self).millis()
    }
}

/// Cycle-counted busy wait.
///
/// Calibrated from the CPU frequency. Requests of 1 µs or less return immediately because the
/// call itself already takes about that long.
#[derive(Copy, Clone, Debug)]
pub struct BusyDelay {
    cycles_per_us: u32,
}

impl BusyDelay {
    /// Cycles spent entering and leaving `delay_us` that are not part of the spin.
    pub const CALL_OVERHEAD_CYCLES: u32 = 12;

    pub const fn new(cpu_hz: u32) -> Self {
        Self {
            cycles_per_us: cpu_hz / 1_000_000,
        }
    }

    /// Cycles the spin loop runs for a request of `us` microseconds.
    #[inline]
    pub const fn spin_cycles(&self, us: u32) -> u32 {
        if us <= 1 {
            return 0;
        }
        us.saturating_mul(self.cycles_per_us)
            .saturating_sub(Self::CALL_OVERHEAD_CYCLES)
    }
}

impl DelayNs for BusyDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_us(ns.div_ceil(1000));
    }

    #[inline]
    fn delay_us(&mut self, us: u32) {
        let cycles = self.spin_cycles(us);
        if cycles != 0 {
            spin(cycles);
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1000);
        }
    }
}

#[cfg(feature = "firmware")]
#[inline(always)]
fn spin(cycles: u32) {
    cortex_m::asm::delay(cycles);
}

#[cfg(not(feature = "firmware"))]
#[inline(always)]
fn spin(cycles: u32) {
    for _ in 0..cycles {
        core::hint::spin_loop();
    }
}
