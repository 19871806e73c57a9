//! # Kite POSIX Port
//!
//! Runs the Kite kernel on a Linux/Unix host. OS threads are the kernel's
//! threads, a process-wide lock stands in for the interrupt mask and a ticker
//! thread delivers the tick interrupt.
//!
//! ```no_run
//! use kite_posix::{Kernel, PosixPort, ThreadScheduler};
//!
//! static KERNEL: Kernel<PosixPort, ThreadScheduler> = Kernel::new(ThreadScheduler::new());
//!
//! kite_posix::register_tick_handler(|| KERNEL.on_tick_interrupt());
//! let boot = KERNEL.init();
//! let flags = boot.kernel().event_flags_create().unwrap();
//! boot.start();
//! ```

pub mod critical;
pub mod sched;
pub mod time;

use std::thread;
use std::time::Duration;

use log::debug;

pub use kite_kernel::*;

pub use critical::is_masked;
pub use sched::ThreadScheduler;
pub use time::{
    register_tick_handler, set_tick_rate, start_ticker, stop_ticker, tick_rate, ClockTick,
    TickHandler,
};

/// Longest single sleep of the idle path
pub const IDLE_SLICE: Duration = Duration::from_millis(10);

/// The hosted CPU port
#[derive(Debug, Clone, Copy)]
pub struct PosixPort;

// SAFETY: `disable_interrupts` takes a process-wide lock that every kernel
// entry point holds while touching kernel state.
unsafe impl Port for PosixPort {
    /// Default rate; [`set_tick_rate`] changes the rate the ticker runs at
    const TICK_HZ: u32 = time::DEFAULT_TICKS_PER_SEC;

    fn disable_interrupts() -> bool {
        critical::mask()
    }

    unsafe fn enable_interrupts() {
        // SAFETY: forwarded from the caller.
        unsafe { critical::unmask() }
    }

    fn sys_init() {
        debug!("posix port init, ticker at {} Hz", time::tick_rate());
    }

    fn sys_start() {
        time::start_ticker();
    }

    fn sys_sleep(hint: u32) {
        let hint = Duration::from_millis(hint as u64);
        thread::park_timeout(hint.min(IDLE_SLICE));
    }

    fn acknowledge_tick() -> u32 {
        time::acknowledge()
    }
}
