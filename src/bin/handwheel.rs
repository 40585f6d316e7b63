//! STM32F103 Blue Pill Handwheel: Quadrature Encoder to Step/Direction
//! =============================================================================================
//!
//! This firmware turns a manual pulse generator (handwheel) into step/direction pulses for a
//! stepper driver:
//! - Encoder edges are decoded in EXTI0/EXTI1 and drained every 10 ms
//! - Every 100 ms the pending motion goes out as a burst of 4 steps per detent
//! - Zero drives the axis back to the origin; coarse/fine pick 0.0010 or 0.0001 per detent
//! - The position is shown on a MAX7219 eight digit display
//!
//! Hardware Connections:
//!   Encoder:
//!      A    -> PA0 (EXTI0, pull-up)
//!      B    -> PA1 (EXTI1, pull-up)
//!
//!   Stepper driver:
//!      STEP -> PA4
//!      DIR  -> PA5
//!
//!   Buttons (to GND, internal pull-up):
//!      ZERO   -> PB12
//!      COARSE -> PB13
//!      FINE   -> PB14
//!
//!   MAX7219 module:
//!      CS   -> PB5
//!      CLK  -> PB6
//!      DIN  -> PB7
//!
//!   Onboard LED (PC13, active low) blinks with every output cycle.

#![no_std]
#![no_main]

use core::cell::RefCell;

use cortex_m_rt::entry;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::InterruptExt;
use embassy_stm32::time::Hertz;
use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use handwheel::clock::{BusyDelay, Clock, TickTimerConfig};
use handwheel::config::{Config, InputPull};
use handwheel::encoder::{QuadratureDecoder, QuadratureEncoder};
use handwheel::hardware::exti::{self, Port};
use handwheel::hardware::gpio_button::GpioButton;
use handwheel::hardware::gpio_led::GpioLed;
use handwheel::hardware::max7219::Max7219;
use handwheel::hardware::soft_spi::SoftSpi;
use handwheel::hardware::tick_timer::Tim2TickTimer;
use handwheel::motion::{Controls, MotionScheduler, PulseTiming, StepDirOutput};
use {defmt_rtt as _, panic_probe as _};

const CPU_HZ: u32 = 72_000_000;

/// TIM2 sits on APB1 (36 MHz) whose timer clock is doubled back to 72 MHz.
const TICK_TIMER: TickTimerConfig = TickTimerConfig::new(CPU_HZ, 72);

const ENCODER_A_LINE: usize = 0;
const ENCODER_B_LINE: usize = 1;

static CONFIG: Config = Config::DEFAULT;
static CLOCK: Clock = Clock::new(TICK_TIMER);
static TIMER: Tim2TickTimer = Tim2TickTimer::new();
static DECODER: QuadratureDecoder = QuadratureDecoder::new();

type EncoderPins = QuadratureEncoder<Input<'static>, Input<'static>>;

// Sampled by both edge handlers
static ENCODER: Mutex<CriticalSectionRawMutex, RefCell<Option<EncoderPins>>> =
    Mutex::new(RefCell::new(None));

fn rcc_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz(8_000_000),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll = Some(Pll {
        src: PllSource::HSE,
        prediv: PllPreDiv::DIV1,
        mul: PllMul::MUL9,
    });
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV2;
    config.rcc.apb2_pre = APBPrescaler::DIV1;
    config
}

#[entry]
fn main() -> ! {
    let p = embassy_stm32::init(rcc_config());
    let config = defmt::unwrap!(CONFIG.validated());
    defmt::info!("handwheel starting: {}", config);

    let mut delay = BusyDelay::new(CPU_HZ);

    // Stepper outputs first so STEP is low before anything else happens
    let output = StepDirOutput::new(
        Output::new(p.PA4, Level::Low, Speed::Low),
        Output::new(p.PA5, Level::Low, Speed::Low),
        PulseTiming::from(&config),
        config.direction_level,
        delay,
    );

    let led = GpioLed::active_low(Output::new(p.PC13, Level::High, Speed::Low));

    let controls = Controls::new(
        GpioButton::active_low(Input::new(p.PB12, Pull::Up)),
        GpioButton::active_low(Input::new(p.PB13, Pull::Up)),
        GpioButton::active_low(Input::new(p.PB14, Pull::Up)),
    );

    let spi = SoftSpi::new(
        Output::new(p.PB5, Level::High, Speed::Low),
        Output::new(p.PB6, Level::Low, Speed::Low),
        Output::new(p.PB7, Level::Low, Speed::Low),
        delay,
    );
    let mut display = Max7219::new(spi);
    display.init();

    // Millisecond clock
    TIMER.start(TICK_TIMER);
    unsafe { interrupt::TIM2.enable() };

    // Encoder: settle, prime, then hand the pins to the edge handlers
    let pull = match config.encoder_pull {
        InputPull::Up => Pull::Up,
        InputPull::None => Pull::None,
    };
    let mut encoder = QuadratureEncoder::new(Input::new(p.PA0, pull), Input::new(p.PA1, pull));
    encoder.init(&DECODER, &mut delay);
    ENCODER.lock(|cell| cell.replace(Some(encoder)));

    exti::listen_both_edges(Port::A, ENCODER_A_LINE);
    exti::listen_both_edges(Port::A, ENCODER_B_LINE);
    unsafe {
        interrupt::EXTI0.enable();
        interrupt::EXTI1.enable();
    }

    defmt::info!("clock running at {} us", CLOCK.micros(&TIMER));

    let mut scheduler =
        MotionScheduler::new(config, &CLOCK, &DECODER, output, controls, display, led);
    scheduler.start();
    scheduler.run()
}

fn encoder_edge() {
    ENCODER.lock(|cell| {
        if let Some(encoder) = cell.borrow_mut().as_mut() {
            encoder.on_edge(&DECODER);
        }
    });
}

#[interrupt]
fn TIM2() {
    if TIMER.acknowledge() {
        CLOCK.tick();
    }
}

#[interrupt]
fn EXTI0() {
    exti::clear_pending(ENCODER_A_LINE);
    encoder_edge();
}

#[interrupt]
fn EXTI1() {
    exti::clear_pending(ENCODER_B_LINE);
    encoder_edge();
}
