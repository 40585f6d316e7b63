//! Interrupt-driven quadrature decoder.
//!
//! Both encoder channels raise an interrupt on every edge. Each handler samples both channels and
//! feeds them to [`QuadratureDecoder::on_edge`], which forms a 4-bit code from the new and the
//! previous levels and updates a signed delta:
//!
//! ```text
//!                  _______         _______
//!      A    ______|       |_______|       |______
//!  negative <---      _______         _______         __  ---> positive
//!      B    ______|       |_______|       |_______|
//!
//!  new B  new A  old B  old A   code   result
//!  -----  -----  -----  -----   ----   ------
//!    1      1      1      0     0xE      +1
//!    1      1      0      1     0xD      -1
//!    (every other code)                  0
//! ```
//!
//! Only one transition per direction counts, which gives exactly one step per detent on a
//! detent-aligned encoder. Codes in which both channels changed at once are treated as noise and
//! ignored rather than counted as two steps.
//!
//! The foreground drains the delta with [`QuadratureDecoder::read`], which returns the net motion
//! since the previous read and resets it within a single critical section.

use core::cell::Cell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;

/// Time given to the RC filters on the encoder inputs before the first sample.
pub const SETTLE_TIME_US: u32 = 2_000;

const CODE_FORWARD: u8 = 0b1110;
const CODE_REVERSE: u8 = 0b1101;

/// Sampled levels of both channels.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channels {
    pub a: bool,
    pub b: bool,
}

impl Channels {
    pub const fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    /// Two-bit representation `{B, A}`.
    #[inline]
    pub const fn bits(self) -> u8 {
        (self.b as u8) << 1 | self.a as u8
    }
}

/// Step contributed by a 4-bit `{new_B, new_A, old_B, old_A}` transition code.
#[inline]
pub const fn transition_step(code: u8) -> i8 {
    match code & 0x0F {
        CODE_FORWARD => 1,
        CODE_REVERSE => -1,
        _ => 0,
    }
}

/// Anything that hands out accumulated encoder motion exactly once.
pub trait DeltaSource {
    /// Net signed motion since the previous call.
    fn take_delta(&self) -> i8;
}

#[derive(Copy, Clone, Debug, Default)]
struct DecoderState {
    /// `{old_B, old_A}` from the previous edge.
    history: u8,
    delta: i8,
}

/// Edge state machine and delta accumulator shared with the encoder interrupts.
pub struct QuadratureDecoder {
    state: Mutex<CriticalSectionRawMutex, Cell<DecoderState>>,
}

impl QuadratureDecoder {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(DecoderState {
                history: 0,
                delta: 0,
            })),
        }
    }

    /// Load the current channel levels as history. Call before enabling the edge interrupts.
    pub fn prime(&self, levels: Channels) {
        self.state.lock(|s| {
            let mut st = s.get();
            st.history = levels.bits();
            s.set(st);
        });
    }

    /// Process an edge on either channel. Call from the channel interrupts.
    #[inline]
    pub fn on_edge(&self, levels: Channels) {
        self.state.lock(|s| {
            let mut st = s.get();
            let code = levels.bits() << 2 | st.history;
            st.delta = st.delta.saturating_add(transition_step(code));
            st.history = code >> 2;
            s.set(st);
        });
    }

    /// Return the accumulated delta and reset it to zero.
    pub fn read(&self) -> i8 {
        self.state.lock(|s| {
            let mut st = s.get();
            let delta = st.delta;
            st.delta = 0;
            s.set(st);
            delta
        })
    }
}

impl Default for QuadratureDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeltaSource for QuadratureDecoder {
    #[inline]
    fn take_delta(&self) -> i8 {
        self.read()
    }
}

impl<T: DeltaSource> DeltaSource for &T {
    #[inline]
    fn take_delta(&self) -> i8 {
        (**self).take_delta()
    }
}

/// Owns the two channel inputs of an encoder.
///
/// The pins must already be configured as inputs with the desired pull resistor; the HAL's typed
/// pins make that part of their construction.
pub struct QuadratureEncoder<A: InputPin, B: InputPin> {
    a: A,
    b: B,
}

impl<A: InputPin, B: InputPin> QuadratureEncoder<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }

    /// Sample both channels. A failed read is treated as low.
    pub fn sample(&mut self) -> Channels {
        Channels {
            a: self.a.is_high().unwrap_or(false),
            b: self.b.is_high().unwrap_or(false),
        }
    }

    /// Wait for the input filters to settle and prime `decoder` with the current levels.
    ///
    /// Enable the edge interrupts only after this returns.
    pub fn init(&mut self, decoder: &QuadratureDecoder, delay: &mut impl DelayNs) {
        delay.delay_us(SETTLE_TIME_US);
        let levels = self.sample();
        decoder.prime(levels);
        debug!("encoder primed a={} b={}", levels.a, levels.b);
    }

    /// Sample and feed the decoder. This is the body of both edge interrupts.
    #[inline]
    pub fn on_edge(&mut self, decoder: &QuadratureDecoder) {
        let levels = self.sample();
        decoder.on_edge(levels);
    }

    pub fn free(self) -> (A, B) {
        (self.a, self.b)
    }
}
