//! Interrupt masking for POSIX
//!
//! A process-wide raw mutex plays the role of the CPU interrupt mask: the
//! thread that holds it is the only one touching kernel state, the same way
//! an MCU with interrupts disabled is. A thread-local flag records whether
//! the current thread holds the mask, so masking twice does not deadlock.

use std::cell::Cell;

use parking_lot::lock_api::RawMutex as _;
use parking_lot::RawMutex;

static MASK: RawMutex = RawMutex::INIT;

thread_local! {
    static MASKED: Cell<bool> = const { Cell::new(false) };
}

/// Take the mask, returning `true` if this thread did not already hold it
pub(crate) fn mask() -> bool {
    if MASKED.with(Cell::get) {
        return false;
    }
    MASK.lock();
    MASKED.with(|masked| masked.set(true));
    true
}

/// Give the mask back
///
/// # Safety
///
/// The calling thread must hold the mask.
pub(crate) unsafe fn unmask() {
    debug_assert!(is_masked(), "unmask without holding the mask");
    MASKED.with(|masked| masked.set(false));
    // SAFETY: the caller holds the mask, so this thread locked `MASK`.
    unsafe { MASK.unlock() };
}

/// Check if the calling thread currently holds the interrupt mask
pub fn is_masked() -> bool {
    MASKED.with(Cell::get)
}
