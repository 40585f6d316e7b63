//! Position accumulator and the bursts derived from it.

use crate::config::{Config, RotationSense};

/// Largest number of detents carried by one burst (the `i8` range of a per-cycle diff).
///
/// With the default timing a full burst takes ~18 ms. Motion beyond this bound stays pending and
/// goes out on the next output cycle.
pub const MAX_BURST_DETENTS: u8 = i8::MAX as u8;

/// Scale applied to each decoded detent.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IncrementMode {
    #[default]
    Fine,
    Coarse,
}

impl IncrementMode {
    /// Increment in 0.0001 units for this mode under `config`.
    pub const fn increment(self, config: &Config) -> u8 {
        match self {
            IncrementMode::Fine => config.fine_increment,
            IncrementMode::Coarse => config.coarse_increment,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Positive,
    Negative,
}

/// One output cycle's worth of motion.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Burst {
    pub direction: Direction,
    /// Number of detents; each one becomes `gain` step pulses.
    pub detents: u8,
}

impl Burst {
    /// Signed position change represented by this burst.
    pub const fn signed(&self) -> i32 {
        match self.direction {
            Direction::Positive => self.detents as i32,
            Direction::Negative => -(self.detents as i32),
        }
    }
}

/// Absolute position in 0.0001 units and the mark of what has already been sent as pulses.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PositionAccumulator {
    position: i32,
    last_output: i32,
}

impl PositionAccumulator {
    pub const fn new() -> Self {
        Self {
            position: 0,
            last_output: 0,
        }
    }

    #[inline]
    pub const fn position(&self) -> i32 {
        self.position
    }

    /// Motion accumulated but not yet emitted.
    #[inline]
    pub const fn pending(&self) -> i32 {
        self.position.saturating_sub(self.last_output)
    }

    /// Fold a drained decoder delta into the position. Returns `true` if the position moved.
    pub fn apply(&mut self, delta: i8, increment: u8, sense: RotationSense) -> bool {
        let signed = match sense {
            RotationSense::Clockwise => delta as i32,
            RotationSense::CounterClockwise => -(delta as i32),
        };
        let step = signed * increment as i32;
        self.position = self.position.saturating_add(step);
        step != 0
    }

    /// Reset the position to zero. The output mark is kept, so the next bursts return the axis to
    /// where the position last read zero.
    pub fn zero(&mut self) {
        self.position = 0;
    }

    /// Take the next burst to emit, advancing the output mark before any pulse goes out.
    ///
    /// At most [`MAX_BURST_DETENTS`] are taken per call; the remainder stays pending.
    pub fn take_burst(&mut self) -> Option<Burst> {
        let diff = self.pending();
        if diff == 0 {
            return None;
        }

        let magnitude = diff.unsigned_abs();
        if magnitude > MAX_BURST_DETENTS as u32 {
            warn!(
                "position jump of {} exceeds burst limit, carrying {}",
                diff,
                magnitude - MAX_BURST_DETENTS as u32
            );
        }

        let burst = Burst {
            direction: if diff > 0 {
                Direction::Positive
            } else {
                Direction::Negative
            },
            detents: magnitude.min(MAX_BURST_DETENTS as u32) as u8,
        };
        self.last_output = self.last_output.saturating_add(burst.signed());
        Some(burst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clockwise_scales_by_increment() {
        let mut acc = PositionAccumulator::new();
        assert!(acc.apply(3, 1, RotationSense::Clockwise));
        assert_eq!(acc.position(), 3);
        assert!(acc.apply(-2, 10, RotationSense::Clockwise));
        assert_eq!(acc.position(), -17);
    }

    #[test]
    fn counter_clockwise_inverts() {
        let mut acc = PositionAccumulator::new();
        acc.apply(3, 10, RotationSense::CounterClockwise);
        assert_eq!(acc.position(), -30);
    }

    #[test]
    fn zero_delta_is_no_motion() {
        let mut acc = PositionAccumulator::new();
        assert!(!acc.apply(0, 10, RotationSense::Clockwise));
        assert_eq!(acc.take_burst(), None);
    }

    #[test]
    fn burst_marks_output_before_emission() {
        let mut acc = PositionAccumulator::new();
        acc.apply(7, 1, RotationSense::Clockwise);
        let burst = acc.take_burst().unwrap();
        assert_eq!(
            burst,
            Burst {
                direction: Direction::Positive,
                detents: 7
            }
        );
        assert_eq!(acc.pending(), 0);

        // Motion arriving while the burst is out goes into the next one.
        acc.apply(-2, 1, RotationSense::Clockwise);
        let next = acc.take_burst().unwrap();
        assert_eq!(next.direction, Direction::Negative);
        assert_eq!(next.detents, 2);
        assert_eq!(acc.take_burst(), None);
    }

    #[test]
    fn oversize_diff_is_carried() {
        let mut acc = PositionAccumulator::new();
        acc.apply(100, 3, RotationSense::Clockwise);
        assert_eq!(acc.position(), 300);

        let mut emitted = 0;
        let mut bursts = 0;
        while let Some(b) = acc.take_burst() {
            assert!(b.detents <= MAX_BURST_DETENTS);
            emitted += b.signed();
            bursts += 1;
        }
        assert_eq!(emitted, 300);
        assert_eq!(bursts, 3);
    }

    #[test]
    fn zero_returns_to_origin() {
        let mut acc = PositionAccumulator::new();
        acc.apply(6, 1, RotationSense::Clockwise);
        assert_eq!(acc.take_burst().map(|b| b.signed()), Some(6));

        acc.zero();
        assert_eq!(acc.position(), 0);
        assert_eq!(
            acc.take_burst(),
            Some(Burst {
                direction: Direction::Negative,
                detents: 6
            })
        );
        assert_eq!(acc.take_burst(), None);
    }

    #[test]
    fn zero_cancels_unsent_motion() {
        let mut acc = PositionAccumulator::new();
        acc.apply(20, 1, RotationSense::Clockwise);
        acc.take_burst();
        acc.apply(5, 1, RotationSense::Clockwise);
        acc.zero();
        assert_eq!(acc.pending(), -20);
        assert_eq!(acc.take_burst().map(|b| b.signed()), Some(-20));
    }

    #[test]
    fn long_return_is_spread_over_bursts() {
        let mut acc = PositionAccumulator::new();
        acc.apply(100, 3, RotationSense::Clockwise);
        while acc.take_burst().is_some() {}

        acc.zero();
        let mut returned = 0;
        while let Some(b) = acc.take_burst() {
            assert_eq!(b.direction, Direction::Negative);
            assert!(b.detents <= MAX_BURST_DETENTS);
            returned += b.signed();
        }
        assert_eq!(returned, -300);
        assert_eq!(acc.pending(), 0);
    }

    #[test]
    fn increment_modes_follow_config() {
        let cfg = Config::DEFAULT;
        assert_eq!(IncrementMode::Fine.increment(&cfg), 1);
        assert_eq!(IncrementMode::Coarse.increment(&cfg), 10);
        assert_eq!(IncrementMode::default(), IncrementMode::Fine);
    }
}
