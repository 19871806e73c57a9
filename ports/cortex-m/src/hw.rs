//! Register level part of the Cortex-M ports

use core::cell::Cell;

use cortex_m::peripheral::scb::SystemHandler;
use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::register::primask;
use critical_section::Mutex;
use kite_kernel::{critical, Port, TickScaler};
use log::debug;

use crate::{CortexM, CortexM7, SysTickConfig};

/// PendSV and SysTick run below every application interrupt
const LOWEST_PRIORITY: u8 = 0xFF;

fn set_kernel_priorities() {
    // SAFETY: runs in `sys_init` with interrupts masked, before the tick
    // exists; nothing else owns these registers yet.
    let mut core = unsafe { cortex_m::Peripherals::steal() };
    unsafe {
        core.SCB.set_priority(SystemHandler::PendSV, LOWEST_PRIORITY);
        core.SCB.set_priority(SystemHandler::SysTick, LOWEST_PRIORITY);
    }
}

fn start_systick(reload: u32) {
    // SAFETY: the port is the only user of SysTick.
    let mut core = unsafe { cortex_m::Peripherals::steal() };
    core.SYST.set_clock_source(SystClkSource::Core);
    core.SYST.set_reload(reload);
    core.SYST.clear_current();
    core.SYST.enable_interrupt();
    core.SYST.enable_counter();
}

fn clear_countflag() {
    // SAFETY: reading COUNTFLAG only touches SysTick, owned by the port.
    let mut core = unsafe { cortex_m::Peripherals::steal() };
    let _ = core.SYST.has_wrapped();
}

fn disable() -> bool {
    let was_enabled = primask::read().is_active();
    cortex_m::interrupt::disable();
    was_enabled
}

fn sleep<C: SysTickConfig>() {
    if C::WFI_WHEN_IDLE {
        cortex_m::asm::wfi();
    }
}

// SAFETY: PRIMASK masks every configurable interrupt, SysTick included, and
// these cores run a single thread of execution.
unsafe impl<C: SysTickConfig> Port for CortexM<C> {
    const TICK_HZ: u32 = 1000;

    fn disable_interrupts() -> bool {
        disable()
    }

    unsafe fn enable_interrupts() {
        // SAFETY: forwarded from the caller.
        unsafe { cortex_m::interrupt::enable() }
    }

    fn sys_init() {
        set_kernel_priorities();
        debug!("systick reload {}", Self::RELOAD);
    }

    fn sys_start() {
        start_systick(Self::RELOAD);
    }

    fn sys_sleep(_hint: u32) {
        sleep::<C>();
    }

    fn acknowledge_tick() -> u32 {
        clear_countflag();
        1
    }
}

static SCALER: Mutex<Cell<TickScaler>> = Mutex::new(Cell::new(TickScaler::new(1000)));

// SAFETY: as for `CortexM`.
unsafe impl<C: SysTickConfig> Port for CortexM7<C> {
    const TICK_HZ: u32 = C::TICK_HZ;

    fn disable_interrupts() -> bool {
        disable()
    }

    unsafe fn enable_interrupts() {
        // SAFETY: forwarded from the caller.
        unsafe { cortex_m::interrupt::enable() }
    }

    fn sys_init() {
        set_kernel_priorities();
        critical::with::<Self, _>(|cs| SCALER.borrow(cs).set(TickScaler::new(C::TICK_HZ)));
        debug!("systick {} Hz, reload {}", C::TICK_HZ, Self::RELOAD);
    }

    fn sys_start() {
        start_systick(Self::RELOAD);
    }

    fn sys_sleep(_hint: u32) {
        sleep::<C>();
    }

    fn acknowledge_tick() -> u32 {
        clear_countflag();
        critical::with::<Self, _>(|cs| {
            let cell = SCALER.borrow(cs);
            let mut scaler = cell.get();
            let units = scaler.advance(1);
            cell.set(scaler);
            units
        })
    }
}
