//! SysTick timing for the Cortex-M ports

use core::marker::PhantomData;

use kite_kernel::UNITS_PER_SEC;

/// Largest value the 24-bit SysTick reload register holds
pub const SYST_MAX_RELOAD: u32 = 0x00FF_FFFF;

/// Board clocking for a SysTick port
pub trait SysTickConfig: 'static {
    /// Core clock feeding SysTick
    const CORE_CLOCK_HZ: u32;

    /// SysTick interrupt rate; only [`CortexM7`] uses rates other than 1 kHz
    const TICK_HZ: u32 = 1000;

    /// Execute `wfi` in the idle path
    ///
    /// Some parts stop SysTick in sleep; such boards turn this off.
    const WFI_WHEN_IDLE: bool = true;
}

/// SysTick reload value for `tick_hz` interrupts per second
///
/// # Panics
///
/// Panics, at compile time when used in a constant, if the period does not
/// fit the 24-bit reload register.
pub const fn reload_value(core_clock_hz: u32, tick_hz: u32) -> u32 {
    assert!(tick_hz > 0, "tick rate must be non-zero");
    let cycles = core_clock_hz / tick_hz;
    assert!(cycles >= 1, "core clock slower than the tick rate");
    assert!(cycles - 1 <= SYST_MAX_RELOAD, "tick period exceeds the SysTick range");
    cycles - 1
}

/// Generic Cortex-M port: SysTick at 1 kHz, one time unit per interrupt
pub struct CortexM<C: SysTickConfig> {
    _config: PhantomData<fn() -> C>,
}

impl<C: SysTickConfig> CortexM<C> {
    /// SysTick reload for a 1 ms period
    pub const RELOAD: u32 = reload_value(C::CORE_CLOCK_HZ, UNITS_PER_SEC);
}

/// Cortex-M4/M7 port: SysTick at `C::TICK_HZ`, scaled to whole milliseconds
pub struct CortexM7<C: SysTickConfig> {
    _config: PhantomData<fn() -> C>,
}

impl<C: SysTickConfig> CortexM7<C> {
    /// SysTick reload for one `C::TICK_HZ` period
    pub const RELOAD: u32 = {
        assert!(
            C::TICK_HZ >= UNITS_PER_SEC,
            "the scaled SysTick port needs a tick rate of at least 1 kHz"
        );
        reload_value(C::CORE_CLOCK_HZ, C::TICK_HZ)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nrf52;
    impl SysTickConfig for Nrf52 {
        const CORE_CLOCK_HZ: u32 = 64_000_000;
    }

    struct Stm32h7;
    impl SysTickConfig for Stm32h7 {
        const CORE_CLOCK_HZ: u32 = 480_000_000;
        const TICK_HZ: u32 = 8000;
    }

    #[test]
    fn test_reload_for_one_millisecond() {
        assert_eq!(CortexM::<Nrf52>::RELOAD, 63_999);
        assert_eq!(reload_value(48_000_000, 1000), 47_999);
    }

    #[test]
    fn test_reload_for_fast_tick() {
        assert_eq!(CortexM7::<Stm32h7>::RELOAD, 59_999);
    }

    #[test]
    #[should_panic(expected = "exceeds the SysTick range")]
    fn test_reload_rejects_long_period() {
        reload_value(480_000_000, 10);
    }
}
