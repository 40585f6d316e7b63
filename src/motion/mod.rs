//! Encoder motion to step/direction output.

pub mod controls;
pub mod interval;
pub mod position;
pub mod pulse;
pub mod scheduler;

pub use controls::{ControlEvents, ControlPanel, Controls};
pub use interval::Interval;
pub use position::{Burst, Direction, IncrementMode, MAX_BURST_DETENTS, PositionAccumulator};
pub use pulse::{PulseOutput, PulseTiming, StepDirOutput};
pub use scheduler::{MotionScheduler, PollOutcome};
