//! Build-time configuration of the handwheel.
//!
//! All values are `const`-constructible so the firmware can keep its configuration in flash. The
//! defaults reproduce the reference wiring: 4 step pulses per detent at ~100 kHz, a 100 µs dwell
//! between detents, the encoder drained every 10 ms and the outputs serviced every 100 ms.

use core::fmt;

use crate::motion::MAX_BURST_DETENTS;

/// Logic level that means "asserted" for an output.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    /// Pin level (`true` = high) that represents `asserted` for this polarity.
    #[inline]
    pub const fn level(self, asserted: bool) -> bool {
        match self {
            ActiveLevel::High => asserted,
            ActiveLevel::Low => !asserted,
        }
    }
}

/// Which way the knob has to turn for the position to increase.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RotationSense {
    /// Turn clockwise to go up.
    Clockwise,
    /// Turn counter-clockwise to go up.
    CounterClockwise,
}

/// Internal resistor used on the encoder inputs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputPull {
    None,
    Up,
}

/// Reasons a [`Config`] is rejected at startup.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `gain` must produce at least one pulse per detent.
    ZeroGain,
    /// Step pulses need a non-zero half period.
    ZeroPulseWidth,
    /// Both service intervals must be at least 1 ms.
    ZeroInterval,
    /// The output interval must not be shorter than the read interval.
    IntervalOrder,
    /// The coarse increment must not be smaller than the fine one, and neither may be zero.
    IncrementOrder,
    /// A full-size burst would not fit in one output interval.
    BurstTooLong,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::ZeroGain => "gain must be at least 1",
            ConfigError::ZeroPulseWidth => "pulse half period must be at least 1 us",
            ConfigError::ZeroInterval => "service intervals must be at least 1 ms",
            ConfigError::IntervalOrder => "write interval is shorter than read interval",
            ConfigError::IncrementOrder => "increments must satisfy 0 < fine <= coarse",
            ConfigError::BurstTooLong => "a full burst does not fit in one write interval",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for ConfigError {}

/// Handwheel configuration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Step pulses emitted per decoded detent.
    pub gain: u8,
    /// High time and low time of one step pulse.
    pub pulse_half_period_us: u32,
    /// Pause after each detent's pulses, `None` to disable.
    pub dwell_us: Option<u32>,
    /// Time the direction line is held before the first step of a burst.
    pub direction_settle_us: u32,
    /// How often the decoder is drained.
    pub read_interval_ms: u32,
    /// How often buttons are polled and step pulses are emitted.
    pub write_interval_ms: u32,
    pub sense: RotationSense,
    /// Direction output polarity for positive steps.
    pub direction_level: ActiveLevel,
    /// Fine increment in 0.0001 units.
    pub fine_increment: u8,
    /// Coarse increment in 0.0001 units.
    pub coarse_increment: u8,
    pub encoder_pull: InputPull,
    /// Toggle the status LED on every output cycle.
    pub heartbeat: bool,
}

impl Config {
    pub const DEFAULT: Config = Config {
        gain: 4,
        pulse_half_period_us: 5,
        dwell_us: Some(100),
        direction_settle_us: 2,
        read_interval_ms: 10,
        write_interval_ms: 100,
        sense: RotationSense::Clockwise,
        direction_level: ActiveLevel::High,
        fine_increment: 1,
        coarse_increment: 10,
        encoder_pull: InputPull::Up,
        heartbeat: true,
    };

    pub const fn with_gain(mut self, gain: u8) -> Self {
        self.gain = gain;
        self
    }

    pub const fn with_pulse_half_period_us(mut self, us: u32) -> Self {
        self.pulse_half_period_us = us;
        self
    }

    pub const fn with_dwell_us(mut self, dwell_us: Option<u32>) -> Self {
        self.dwell_us = dwell_us;
        self
    }

    pub const fn with_intervals_ms(mut self, read: u32, write: u32) -> Self {
        self.read_interval_ms = read;
        self.write_interval_ms = write;
        self
    }

    pub const fn with_sense(mut self, sense: RotationSense) -> Self {
        self.sense = sense;
        self
    }

    pub const fn with_direction_level(mut self, level: ActiveLevel) -> Self {
        self.direction_level = level;
        self
    }

    pub const fn with_increments(mut self, fine: u8, coarse: u8) -> Self {
        self.fine_increment = fine;
        self.coarse_increment = coarse;
        self
    }

    pub const fn with_heartbeat(mut self, heartbeat: bool) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    /// Duration of one detent's worth of output: `gain` full pulses plus the dwell.
    pub const fn detent_time_us(&self) -> u32 {
        let pulses = self.gain as u32 * 2 * self.pulse_half_period_us;
        match self.dwell_us {
            Some(dwell) => pulses + dwell,
            None => pulses,
        }
    }

    /// Worst-case time spent emitting one burst of [`MAX_BURST_DETENTS`].
    pub const fn max_burst_time_us(&self) -> u32 {
        self.direction_settle_us + MAX_BURST_DETENTS as u32 * self.detent_time_us()
    }

    /// Check the configuration for values the scheduler cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gain == 0 {
            return Err(ConfigError::ZeroGain);
        }
        if self.pulse_half_period_us == 0 {
            return Err(ConfigError::ZeroPulseWidth);
        }
        if self.read_interval_ms == 0 || self.write_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.write_interval_ms < self.read_interval_ms {
            return Err(ConfigError::IntervalOrder);
        }
        if self.fine_increment == 0 || self.coarse_increment < self.fine_increment {
            return Err(ConfigError::IncrementOrder);
        }
        if self.max_burst_time_us() / 1000 >= self.write_interval_ms {
            return Err(ConfigError::BurstTooLong);
        }
        Ok(())
    }

    /// Consume the configuration, returning it only if [`Config::validate`] passes.
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate().map(|()| self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn default_detent_time() {
        // 4 pulses * 10 us + 100 us dwell
        assert_eq!(Config::DEFAULT.detent_time_us(), 140);
        assert_eq!(Config::DEFAULT.with_dwell_us(None).detent_time_us(), 40);
    }

    #[test]
    fn rejects_zero_gain() {
        let cfg = Config::DEFAULT.with_gain(0);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroGain));
    }

    #[test]
    fn rejects_inverted_intervals() {
        let cfg = Config::DEFAULT.with_intervals_ms(100, 10);
        assert_eq!(cfg.validate(), Err(ConfigError::IntervalOrder));
        let cfg = Config::DEFAULT.with_intervals_ms(0, 10);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroInterval));
    }

    #[test]
    fn rejects_bad_increments() {
        assert_eq!(
            Config::DEFAULT.with_increments(10, 1).validate(),
            Err(ConfigError::IncrementOrder)
        );
        assert_eq!(
            Config::DEFAULT.with_increments(0, 10).validate(),
            Err(ConfigError::IncrementOrder)
        );
    }

    #[test]
    fn rejects_burst_longer_than_write_interval() {
        // 127 detents * (4 * 2 * 100 us + 100 us) = ~114 ms > 100 ms
        let cfg = Config::DEFAULT.with_pulse_half_period_us(100);
        assert_eq!(cfg.validate(), Err(ConfigError::BurstTooLong));
        assert!(cfg.validated().is_err());
    }

    #[test]
    fn active_level_mapping() {
        assert!(ActiveLevel::High.level(true));
        assert!(!ActiveLevel::High.level(false));
        assert!(!ActiveLevel::Low.level(true));
        assert!(ActiveLevel::Low.level(false));
    }
}
