//! Kite Kernel Ports for ARM Cortex-M
//!
//! Two SysTick based ports:
//!
//! - [`CortexM`]: any Cortex-M core, SysTick at 1 kHz, one time unit per tick
//! - [`CortexM7`]: Cortex-M4/M7, SysTick at a configurable faster rate,
//!   scaled down so kernel time stays in milliseconds
//!
//! Both run PendSV and SysTick at the lowest priority and mask interrupts
//! through PRIMASK. Register access only exists when building for
//! `target_arch = "arm"`; the timer arithmetic builds everywhere.
//!
//! # Usage
//!
//! ```rust,ignore
//! use kite_port_cortex_m::{CortexM, SysTickConfig};
//!
//! struct Board;
//! impl SysTickConfig for Board {
//!     const CORE_CLOCK_HZ: u32 = 48_000_000;
//! }
//!
//! static KERNEL: Kernel<CortexM<Board>, MyScheduler> = Kernel::new(MyScheduler);
//!
//! #[exception]
//! fn SysTick() {
//!     KERNEL.on_tick_interrupt();
//! }
//! ```

#![no_std]

pub mod systick;

#[cfg(target_arch = "arm")]
mod hw;

pub use systick::{reload_value, CortexM, CortexM7, SysTickConfig, SYST_MAX_RELOAD};
