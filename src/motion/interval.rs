/// Fixed service interval measured against a wrapping millisecond clock.
///
/// An interval is due once at least `period_ms` have elapsed since it was last serviced. Servicing
/// restarts the interval from the current time, so cycles missed while the loop was busy are
/// dropped rather than run back to back.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interval {
    period_ms: u32,
    last_ms: u32,
}

impl Interval {
    pub const fn new(period_ms: u32, now_ms: u32) -> Self {
        Self {
            period_ms,
            last_ms: now_ms,
        }
    }

    /// Restart the interval at `now_ms` without servicing it.
    pub fn reset(&mut self, now_ms: u32) {
        self.last_ms = now_ms;
    }

    /// Returns `true` and restarts the interval if it has elapsed at `now_ms`.
    pub fn due(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_ms) >= self.period_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }
}
