#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

//! # Kite Kernel
//!
//! The kernel layer: the contract a CPU port fulfils, the nesting critical
//! section built on it, the tick-driven time base and event flags.
//!
//! A kernel is a `static` [`Kernel`] parameterised by its [`Port`] and by a
//! [`Scheduler`] that suspends and wakes threads on its behalf:
//!
//! ```ignore
//! static KERNEL: Kernel<MyPort, MyScheduler> = Kernel::new(MyScheduler);
//!
//! let boot = KERNEL.init();
//! let flags = KERNEL.event_flags_create()?;
//! boot.start();
//! ```

pub mod critical;
pub mod flags;
pub mod kernel;
pub mod port;
pub mod sched;
pub mod time;

pub use kite_core::*;
pub use kite_mem::{Handle, PoolStats};

pub use critical::CriticalSection;
pub use flags::EventFlags;
pub use kernel::{Boot, Kernel, DEFAULT_FLAGS, DEFAULT_WAITERS};
pub use port::Port;
pub use sched::Scheduler;
pub use time::TimeBase;
