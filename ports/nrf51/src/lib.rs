//! Kite Kernel Port for Nordic nRF51
//!
//! The tick comes from RTC1 on the 32.768 kHz low-frequency clock, so it
//! keeps running in `wfi` sleep. RTC1 is prescaled to 512 Hz and every tick
//! event counts as 2 time units (1.953 ms in reality), which keeps the time
//! base close to milliseconds without a fractional carry.
//!
//! ```rust,ignore
//! static KERNEL: Kernel<Nrf51Rtc, MyScheduler> = Kernel::new(MyScheduler);
//!
//! #[interrupt]
//! fn RTC1() {
//!     KERNEL.on_tick_interrupt();
//! }
//! ```

#![no_std]

#[cfg(target_arch = "arm")]
mod hw;

/// Frequency of the low-frequency clock feeding the RTC
pub const LFCLK_HZ: u32 = 32_768;

/// RTC1 tick event rate
pub const TICK_HZ: u32 = 512;

/// Time units credited per RTC1 tick event
pub const UNITS_PER_TICK: u32 = 2;

/// RTC1 prescaler giving [`TICK_HZ`]
pub const PRESCALER: u32 = prescaler_for(TICK_HZ);

/// RTC prescaler for a tick rate of `tick_hz`
///
/// # Panics
///
/// Panics if `tick_hz` does not divide the LFCLK or the prescaler does not
/// fit its 12-bit register.
pub const fn prescaler_for(tick_hz: u32) -> u32 {
    assert!(tick_hz > 0 && LFCLK_HZ % tick_hz == 0, "tick rate must divide 32768 Hz");
    let prescaler = LFCLK_HZ / tick_hz - 1;
    assert!(prescaler <= 0xFFF, "RTC prescaler is 12 bits");
    prescaler
}

/// nRF51 port with RTC1 as the tick source
#[derive(Debug, Clone, Copy)]
pub struct Nrf51Rtc;
