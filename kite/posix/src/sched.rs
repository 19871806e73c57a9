//! Thread scheduler for hosted kernels

use std::thread::{self, Thread};

use kite_kernel::Scheduler;

/// Blocks and wakes OS threads with `park` / `unpark`
///
/// `unpark` leaves a token when the target is not parked yet, which is the
/// wake-up guarantee the kernel's `Scheduler` contract asks for.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl ThreadScheduler {
    /// Create the scheduler
    pub const fn new() -> Self {
        Self
    }
}

impl Scheduler for ThreadScheduler {
    type Thread = Thread;

    fn current(&self) -> Thread {
        thread::current()
    }

    fn suspend(&self) {
        thread::park();
    }

    fn wake(&self, thread: Thread) {
        thread.unpark();
    }
}
