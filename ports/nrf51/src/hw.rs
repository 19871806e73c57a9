//! RTC1 and CLOCK register access

use core::ptr;

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::NVIC;
use cortex_m::register::primask;
use kite_kernel::Port;
use log::debug;

use crate::{Nrf51Rtc, PRESCALER, TICK_HZ, UNITS_PER_TICK};

const CLOCK_BASE: usize = 0x4000_0000;
const CLOCK_TASKS_LFCLKSTART: usize = CLOCK_BASE + 0x008;

const RTC1_BASE: usize = 0x4001_1000;
const RTC1_TASKS_START: usize = RTC1_BASE + 0x000;
const RTC1_EVENTS_TICK: usize = RTC1_BASE + 0x100;
const RTC1_INTENSET: usize = RTC1_BASE + 0x304;
const RTC1_EVTEN: usize = RTC1_BASE + 0x340;
const RTC1_PRESCALER: usize = RTC1_BASE + 0x508;
const RTC1_POWER: usize = RTC1_BASE + 0xFFC;

/// TICK bit in INTENSET / EVTEN
const RTC_TICK: u32 = 1 << 0;

const LOWEST_PRIORITY: u8 = 0xFF;

#[derive(Debug, Clone, Copy)]
struct Rtc1Irq;

// SAFETY: 17 is RTC1 in the nRF51 vector table.
unsafe impl InterruptNumber for Rtc1Irq {
    fn number(self) -> u16 {
        17
    }
}

#[inline]
fn write(addr: usize, value: u32) {
    // SAFETY: `addr` is one of the CLOCK / RTC1 registers above.
    unsafe { ptr::write_volatile(addr as *mut u32, value) }
}

// SAFETY: PRIMASK masks RTC1 and the nRF51 has a single core.
unsafe impl Port for Nrf51Rtc {
    const TICK_HZ: u32 = TICK_HZ;

    fn disable_interrupts() -> bool {
        let was_enabled = primask::read().is_active();
        cortex_m::interrupt::disable();
        was_enabled
    }

    unsafe fn enable_interrupts() {
        // SAFETY: forwarded from the caller.
        unsafe { cortex_m::interrupt::enable() }
    }

    fn sys_init() {
        write(CLOCK_TASKS_LFCLKSTART, 1);
        // SAFETY: runs with interrupts masked before the tick exists.
        let mut core = unsafe { cortex_m::Peripherals::steal() };
        unsafe {
            core.SCB.set_priority(SystemHandler::PendSV, LOWEST_PRIORITY);
            core.NVIC.set_priority(Rtc1Irq, LOWEST_PRIORITY);
        }
        debug!("rtc1 prescaler {}", PRESCALER);
    }

    fn sys_start() {
        write(RTC1_POWER, 1);
        write(RTC1_PRESCALER, PRESCALER);
        write(RTC1_INTENSET, RTC_TICK);
        write(RTC1_EVTEN, RTC_TICK);
        write(RTC1_TASKS_START, 1);
        // SAFETY: the RTC1 handler only enters the kernel through its
        // critical section.
        unsafe { NVIC::unmask(Rtc1Irq) };
    }

    fn sys_sleep(_hint: u32) {
        cortex_m::asm::wfi();
    }

    fn acknowledge_tick() -> u32 {
        write(RTC1_EVENTS_TICK, 0);
        UNITS_PER_TICK
    }
}
