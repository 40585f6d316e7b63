//! Step/direction pulse generation.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use super::position::{Burst, Direction};
use crate::config::{ActiveLevel, Config};

/// Timing of a step/direction burst.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseTiming {
    /// Step pulses per detent.
    pub gain: u8,
    /// High time and low time of each step pulse.
    pub half_period_us: u32,
    /// Pause after each detent's pulses.
    pub dwell_us: Option<u32>,
    /// Direction setup time before the first step.
    pub settle_us: u32,
}

impl From<&Config> for PulseTiming {
    fn from(config: &Config) -> Self {
        Self {
            gain: config.gain,
            half_period_us: config.pulse_half_period_us,
            dwell_us: config.dwell_us,
            settle_us: config.direction_settle_us,
        }
    }
}

/// Sink for bursts of motion.
pub trait PulseOutput {
    /// Emit `burst` and return the number of step pulses sent.
    fn emit(&mut self, burst: Burst) -> u32;
}

/// Bit-banged step/direction output for an external stepper driver.
pub struct StepDirOutput<STEP: OutputPin, DIR: OutputPin, D: DelayNs> {
    step: STEP,
    dir: DIR,
    delay: D,
    timing: PulseTiming,
    /// Direction level that means "positive".
    positive: ActiveLevel,
}

impl<STEP: OutputPin, DIR: OutputPin, D: DelayNs> StepDirOutput<STEP, DIR, D> {
    /// Wrap the pins and drive both low.
    pub fn new(
        mut step: STEP,
        mut dir: DIR,
        timing: PulseTiming,
        positive: ActiveLevel,
        delay: D,
    ) -> Self {
        step.set_low().ok();
        dir.set_low().ok();
        Self {
            step,
            dir,
            delay,
            timing,
            positive,
        }
    }

    pub fn timing(&self) -> PulseTiming {
        self.timing
    }

    fn set_direction(&mut self, direction: Direction) {
        let level = self.positive.level(direction == Direction::Positive);
        self.dir.set_state(PinState::from(level)).ok();
    }

    pub fn free(self) -> (STEP, DIR, D) {
        (self.step, self.dir, self.delay)
    }
}

impl<STEP: OutputPin, DIR: OutputPin, D: DelayNs> PulseOutput for StepDirOutput<STEP, DIR, D> {
    fn emit(&mut self, burst: Burst) -> u32 {
        if burst.detents == 0 {
            return 0;
        }

        self.set_direction(burst.direction);
        self.delay.delay_us(self.timing.settle_us);

        let half = self.timing.half_period_us;
        for _ in 0..burst.detents {
            // 50% duty cycle
            for _ in 0..self.timing.gain {
                self.step.set_high().ok();
                self.delay.delay_us(half);
                self.step.set_low().ok();
                self.delay.delay_us(half);
            }

            if let Some(dwell) = self.timing.dwell_us {
                self.delay.delay_us(dwell);
            }
        }

        burst.detents as u32 * self.timing.gain as u32
    }
}
