//! The foreground loop.
//!
//! Two cooperative paths share one loop and one millisecond clock:
//!
//! - the read path (every 10 ms by default) drains the decoder into the position accumulator;
//! - the write path (every 100 ms by default) polls the buttons and turns pending motion into a
//!   step/direction burst.
//!
//! A burst blocks the loop while it is emitted. Edges keep accumulating in the decoder meanwhile
//! and are picked up by the next read.

use super::controls::{ControlEvents, ControlPanel};
use super::interval::Interval;
use super::position::{Burst, IncrementMode, PositionAccumulator};
use super::pulse::PulseOutput;
use crate::clock::TimeSource;
use crate::config::Config;
use crate::display::PositionDisplay;
use crate::encoder::DeltaSource;
use crate::hardware::traits::Led;

/// What one call to [`MotionScheduler::poll`] did.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollOutcome {
    /// The read path ran.
    pub read: bool,
    /// The write path ran.
    pub wrote: bool,
    /// Burst emitted by the write path, if any.
    pub burst: Option<Burst>,
}

pub struct MotionScheduler<T, E, O, K, D, L>
where
    T: TimeSource,
    E: DeltaSource,
    O: PulseOutput,
    K: ControlPanel,
    D: PositionDisplay,
    L: Led,
{
    config: Config,
    clock: T,
    decoder: E,
    output: O,
    controls: K,
    display: D,
    led: L,
    position: PositionAccumulator,
    mode: IncrementMode,
    read: Interval,
    write: Interval,
}

impl<T, E, O, K, D, L> MotionScheduler<T, E, O, K, D, L>
where
    T: TimeSource,
    E: DeltaSource,
    O: PulseOutput,
    K: ControlPanel,
    D: PositionDisplay,
    L: Led,
{
    /// `config` is expected to have passed [`Config::validate`].
    pub fn new(
        config: Config,
        clock: T,
        decoder: E,
        output: O,
        controls: K,
        display: D,
        led: L,
    ) -> Self {
        let now = clock.millis();
        Self {
            read: Interval::new(config.read_interval_ms, now),
            write: Interval::new(config.write_interval_ms, now),
            config,
            clock,
            decoder,
            output,
            controls,
            display,
            led,
            position: PositionAccumulator::new(),
            mode: IncrementMode::default(),
        }
    }

    /// Show the initial position and restart both intervals from now.
    pub fn start(&mut self) {
        let now = self.clock.millis();
        self.read.reset(now);
        self.write.reset(now);
        self.display.show(self.position.position());
        info!(
            "motion scheduler started: read every {} ms, write every {} ms, gain {}",
            self.config.read_interval_ms,
            self.config.write_interval_ms,
            self.config.gain
        );
    }

    #[inline]
    pub fn position(&self) -> i32 {
        self.position.position()
    }

    #[inline]
    pub fn mode(&self) -> IncrementMode {
        self.mode
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Service whichever paths are due. The read path runs first when both are.
    pub fn poll(&mut self) -> PollOutcome {
        let mut outcome = PollOutcome::default();
        let now = self.clock.millis();

        if self.read.due(now) {
            self.read_cycle();
            outcome.read = true;
        }

        if self.write.due(now) {
            outcome.burst = self.write_cycle();
            outcome.wrote = true;
        }

        outcome
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.poll();
        }
    }

    /// Drain the decoder into the position.
    pub fn read_cycle(&mut self) {
        let delta = self.decoder.take_delta();
        if delta == 0 {
            return;
        }

        let increment = self.mode.increment(&self.config);
        if self.position.apply(delta, increment, self.config.sense) {
            trace!("delta {} -> position {}", delta, self.position.position());
            self.display.show(self.position.position());
        }
    }

    /// Handle the buttons, then emit whatever motion is pending.
    pub fn write_cycle(&mut self) -> Option<Burst> {
        if self.config.heartbeat {
            self.led.toggle();
        }

        let events = self.controls.poll();
        self.apply_controls(events);

        let burst = self.position.take_burst()?;
        let pulses = self.output.emit(burst);
        debug!(
            "burst {} {} detents, {} pulses",
            burst.direction, burst.detents, pulses
        );
        Some(burst)
    }

    fn apply_controls(&mut self, events: ControlEvents) {
        if events.zero {
            info!("Zero Button Pressed");
            self.position.zero();
            self.display.show(self.position.position());
        }
        if events.coarse {
            info!("Coarse Button Pressed");
            self.mode = IncrementMode::Coarse;
        }
        // Fine is checked last so it wins when both are pressed together.
        if events.fine {
            info!("Fine Button Pressed");
            self.mode = IncrementMode::Fine;
        }
    }
}
