//! Nesting critical section
//!
//! The nesting depth is a single process-wide counter. It is only written
//! while interrupts are masked, so plain loads and stores are enough and the
//! code stays usable on cores without atomic read-modify-write.

use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::Port;

static NESTING: AtomicU32 = AtomicU32::new(0);
static WAS_ENABLED: AtomicBool = AtomicBool::new(false);

pub(crate) fn enter_raw<P: Port + ?Sized>() {
    let was_enabled = P::disable_interrupts();
    let depth = NESTING.load(Ordering::Relaxed);
    if depth == 0 {
        WAS_ENABLED.store(was_enabled, Ordering::Relaxed);
    }
    NESTING.store(depth + 1, Ordering::Relaxed);
}

/// # Safety
///
/// Must pair with an earlier `enter_raw`.
pub(crate) unsafe fn leave_raw<P: Port + ?Sized>() {
    let depth = NESTING.load(Ordering::Relaxed);
    debug_assert!(depth > 0, "critical section nesting underflow");
    if depth == 0 {
        return;
    }
    NESTING.store(depth - 1, Ordering::Relaxed);
    if depth == 1 && WAS_ENABLED.load(Ordering::Relaxed) {
        // SAFETY: the outermost entry found interrupts enabled.
        unsafe { P::enable_interrupts() };
    }
}

/// Current nesting depth of the critical section
///
/// Only meaningful to the thread of execution that holds the section.
pub fn nesting() -> u32 {
    NESTING.load(Ordering::Relaxed)
}

/// Scoped critical section
///
/// Interrupts stay masked until the outermost guard is dropped. Guards are
/// neither `Send` nor `Sync`: a section is released where it was entered.
pub struct CriticalSection<P: Port> {
    _port: PhantomData<(fn() -> P, *const ())>,
}

impl<P: Port> CriticalSection<P> {
    /// Enter the critical section
    pub fn enter() -> Self {
        P::enter_critical();
        Self { _port: PhantomData }
    }

    /// Token for `critical_section::Mutex` cells, valid while this guard lives
    pub fn token(&self) -> critical_section::CriticalSection<'_> {
        // SAFETY: interrupts are masked for as long as `self` is borrowed.
        unsafe { critical_section::CriticalSection::new() }
    }
}

impl<P: Port> Drop for CriticalSection<P> {
    fn drop(&mut self) {
        // SAFETY: paired with the `enter_critical` in `enter`.
        unsafe { P::leave_critical() }
    }
}

/// Run `f` inside the critical section of port `P`
#[inline]
pub fn with<P, R>(f: impl FnOnce(critical_section::CriticalSection<'_>) -> R) -> R
where
    P: Port,
{
    let section = CriticalSection::<P>::enter();
    f(section.token())
}
