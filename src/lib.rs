//! Handwheel firmware: a quadrature encoder knob driving a step/direction stepper interface.
//!
//! | Module        | Role                                                         |
//! |---------------|--------------------------------------------------------------|
//! | [`clock`]     | 1 kHz tick counter, `millis`/`micros`, busy-wait delays      |
//! | [`encoder`]   | edge-interrupt quadrature decoder with consume-once drain    |
//! | [`motion`]    | position accumulator, buttons, pulse bursts, main loop       |
//! | [`display`]   | position formatting for an 8 digit seven-segment readout     |
//! | [`hardware`]  | GPIO adapters, bit-banged MAX7219, STM32 timer/EXTI binding  |
//! | [`config`]    | build-time settings and their validation                     |
//!
//! Everything except the STM32 binding is generic over `embedded-hal` traits and builds on the
//! host, where the unit tests run.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
pub mod display;
pub mod encoder;
pub mod hardware;
pub mod motion;

pub use clock::{BusyDelay, Clock, TickTimerConfig};
pub use config::{Config, ConfigError};
pub use encoder::{QuadratureDecoder, QuadratureEncoder};
pub use motion::MotionScheduler;
