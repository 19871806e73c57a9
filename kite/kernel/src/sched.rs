//! Scheduler collaborator
//!
//! The kernel does not schedule threads itself. Blocking primitives hand the
//! current thread to a [`Scheduler`] and ask it to wake the thread later.

/// Thread suspension and wake-up used by blocking kernel calls
///
/// `wake` behaves like a wake-up token: if it is called for a thread that is
/// not suspended yet, that thread's next `suspend` returns immediately. The
/// kernel tolerates spurious returns from `suspend` and re-checks its state.
pub trait Scheduler {
    /// Identity of a thread that can be woken
    type Thread: Clone;

    /// The calling thread
    fn current(&self) -> Self::Thread;

    /// Block the calling thread until it is woken
    ///
    /// Called with the critical section released.
    fn suspend(&self);

    /// Make `thread` runnable again
    ///
    /// Called inside the critical section, so it must not block.
    fn wake(&self, thread: Self::Thread);
}
