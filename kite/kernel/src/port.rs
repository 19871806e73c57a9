//! CPU port contract
//!
//! A port adapts the kernel to one CPU and timer. It is chosen at build time
//! through the kernel's type parameter, so every hook is an associated
//! function and there is never a port object or vtable.

use crate::critical;

/// Hardware hooks the kernel needs from a CPU port
///
/// # Safety
///
/// Implementors guarantee that after `disable_interrupts` returns, no tick
/// interrupt handler and no other thread of execution can observe kernel
/// state until `enable_interrupts` is called. The kernel relies on this for
/// every mutation of its shared state.
pub unsafe trait Port: 'static {
    /// Nominal rate of the hardware tick interrupt
    ///
    /// A port whose rate is set at run time reports its default here.
    const TICK_HZ: u32;

    /// Mask interrupts, returning whether they were enabled before the call
    fn disable_interrupts() -> bool;

    /// Unmask interrupts
    ///
    /// # Safety
    ///
    /// Must only be called to undo a `disable_interrupts` that found
    /// interrupts enabled.
    unsafe fn enable_interrupts();

    /// Configure the tick timer and interrupt priorities
    ///
    /// Called with the critical section held by [`Kernel::init`](crate::Kernel::init).
    fn sys_init();

    /// Start the tick timer
    ///
    /// Called right before the boot critical section is released.
    fn sys_start();

    /// Put the CPU to sleep for at most `hint` time units
    ///
    /// Called outside the critical section. Returning early is always allowed.
    fn sys_sleep(hint: u32);

    /// Clear the pending tick condition and return the time units it stands for
    ///
    /// Called exactly once per tick interrupt.
    fn acknowledge_tick() -> u32;

    /// Enter the nesting critical section
    #[inline]
    fn enter_critical() {
        critical::enter_raw::<Self>();
    }

    /// Leave the nesting critical section
    ///
    /// # Safety
    ///
    /// Must pair with an earlier `enter_critical` on the same thread of
    /// execution.
    #[inline]
    unsafe fn leave_critical() {
        // SAFETY: forwarded from the caller.
        unsafe { critical::leave_raw::<Self>() }
    }
}
