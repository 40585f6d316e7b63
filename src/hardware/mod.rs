pub mod gpio_button;
pub mod gpio_led;
pub mod max7219;
pub mod soft_spi;
pub mod traits;

#[cfg(feature = "firmware")]
pub mod exti;
#[cfg(feature = "firmware")]
pub mod tick_timer;
