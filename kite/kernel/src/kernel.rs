//! Kernel object: lifecycle, time base, idle path and blocked waiters

use core::cell::RefCell;
use core::marker::PhantomData;

use critical_section::Mutex;
use kite_core::{KError, KResult, Link, LinkAccess, List, ListError, NodeId, Tick, WaitOptions};
use kite_mem::{Handle, Pool, PoolStats};
use log::{debug, trace};

use crate::critical::{self, CriticalSection};
use crate::flags::FlagsObject;
use crate::{Port, Scheduler, TimeBase};

/// Default number of event flags objects
pub const DEFAULT_FLAGS: usize = 8;

/// Default number of threads that can be blocked at once
pub const DEFAULT_WAITERS: usize = 16;

/// Progress of a blocked wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitState {
    Pending,
    Satisfied(u32),
    TimedOut,
}

/// Record of one blocked thread, linked into its object's wait list and,
/// for finite timeouts, into the kernel's timer list
pub(crate) struct Waiter<T> {
    pub(crate) mask: u32,
    pub(crate) options: WaitOptions,
    pub(crate) remaining: Option<u32>,
    pub(crate) thread: T,
    pub(crate) owner: Handle,
    pub(crate) wait_link: Link,
    pub(crate) timer_link: Link,
    pub(crate) state: WaitState,
}

impl<T> Waiter<T> {
    pub(crate) fn new(
        mask: u32,
        options: WaitOptions,
        remaining: Option<u32>,
        thread: T,
        owner: Handle,
    ) -> Self {
        Self {
            mask,
            options,
            remaining,
            thread,
            owner,
            wait_link: Link::Detached,
            timer_link: Link::Detached,
            state: WaitState::Pending,
        }
    }
}

/// Waiter pool viewed through the wait-list links
pub(crate) struct ByWait<'a, T, const N: usize>(pub(crate) &'a mut Pool<Waiter<T>, N>);

/// Waiter pool viewed through the timer-list links
pub(crate) struct ByTimer<'a, T, const N: usize>(pub(crate) &'a mut Pool<Waiter<T>, N>);

impl<T, const N: usize> LinkAccess for ByWait<'_, T, N> {
    fn link(&self, node: NodeId) -> Link {
        self.0.get_index(node).map_or(Link::Detached, |w| w.wait_link)
    }

    fn set_link(&mut self, node: NodeId, link: Link) {
        match self.0.get_index_mut(node) {
            Some(waiter) => waiter.wait_link = link,
            None => debug_assert!(false, "wait link of free slot {}", node),
        }
    }
}

impl<T, const N: usize> LinkAccess for ByTimer<'_, T, N> {
    fn link(&self, node: NodeId) -> Link {
        self.0.get_index(node).map_or(Link::Detached, |w| w.timer_link)
    }

    fn set_link(&mut self, node: NodeId, link: Link) {
        match self.0.get_index_mut(node) {
            Some(waiter) => waiter.timer_link = link,
            None => debug_assert!(false, "timer link of free slot {}", node),
        }
    }
}

/// Link a freshly allocated waiter into `wait_list` and, when `timed`, into
/// the timer list
pub(crate) fn enqueue<T, const N: usize>(
    waiters: &mut Pool<Waiter<T>, N>,
    timers: &mut List,
    wait_list: &mut List,
    id: NodeId,
    timed: bool,
) -> Result<(), ListError> {
    wait_list.append(&mut ByWait(waiters), id)?;
    if timed {
        if let Err(err) = timers.append(&mut ByTimer(waiters), id) {
            wait_list.remove(&mut ByWait(waiters), id)?;
            return Err(err);
        }
    }
    Ok(())
}

/// Finish a pending wait with `outcome`
///
/// Unlinks the waiter from both lists and returns the thread to wake. A
/// waiter that is no longer pending was already finished by the other wake
/// path and is left alone.
pub(crate) fn release<T: Clone, const N: usize>(
    waiters: &mut Pool<Waiter<T>, N>,
    timers: &mut List,
    wait_list: &mut List,
    id: NodeId,
    outcome: WaitState,
) -> Option<T> {
    let waiter = waiters.get_index(id)?;
    if waiter.state != WaitState::Pending {
        return None;
    }
    let timed = waiter.timer_link.is_linked();

    let unlinked = wait_list.remove(&mut ByWait(waiters), id);
    debug_assert!(unlinked.is_ok(), "pending waiter {} not on its wait list", id);
    if timed {
        let unlinked = timers.remove(&mut ByTimer(waiters), id);
        debug_assert!(unlinked.is_ok(), "timed waiter {} not on the timer list", id);
    }

    let waiter = waiters.get_index_mut(id)?;
    waiter.state = outcome;
    Some(waiter.thread.clone())
}

/// Mutable kernel state, guarded by the critical section
pub(crate) struct KernelState<T, const FLAGS: usize, const WAITERS: usize> {
    pub(crate) flags: Pool<FlagsObject, FLAGS>,
    pub(crate) waiters: Pool<Waiter<T>, WAITERS>,
    pub(crate) timers: List,
    pub(crate) time: TimeBase,
    booted: bool,
    started: bool,
}

impl<T, const FLAGS: usize, const WAITERS: usize> KernelState<T, FLAGS, WAITERS> {
    const fn new() -> Self {
        Self {
            flags: Pool::new(),
            waiters: Pool::new(),
            timers: List::new(),
            time: TimeBase::new(),
            booted: false,
            started: false,
        }
    }
}

/// The kernel: event flags objects, blocked waiters and the time base
///
/// `P` is the CPU port and `S` the scheduler that suspends and wakes
/// threads. Capacities are fixed at compile time, and `new` is `const` so a
/// kernel is normally a `static`.
pub struct Kernel<
    P: Port,
    S: Scheduler,
    const FLAGS: usize = DEFAULT_FLAGS,
    const WAITERS: usize = DEFAULT_WAITERS,
> {
    pub(crate) state: Mutex<RefCell<KernelState<S::Thread, FLAGS, WAITERS>>>,
    pub(crate) scheduler: S,
    _port: PhantomData<fn() -> P>,
}

impl<P, S, const FLAGS: usize, const WAITERS: usize> Kernel<P, S, FLAGS, WAITERS>
where
    P: Port,
    S: Scheduler,
{
    /// Create a kernel that blocks threads through `scheduler`
    pub const fn new(scheduler: S) -> Self {
        Self {
            state: Mutex::new(RefCell::new(KernelState::new())),
            scheduler,
            _port: PhantomData,
        }
    }

    /// The scheduler collaborator
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub(crate) fn with_state<R>(
        &self,
        f: impl FnOnce(&mut KernelState<S::Thread, FLAGS, WAITERS>) -> R,
    ) -> R {
        critical::with::<P, _>(|cs| f(&mut self.state.borrow_ref_mut(cs)))
    }

    /// Enter the boot critical section and configure the port
    ///
    /// Objects may be created through the returned guard before
    /// [`Boot::start`] starts the tick and releases the section.
    pub fn init(&self) -> Boot<'_, P, S, FLAGS, WAITERS> {
        let section = CriticalSection::<P>::enter();
        {
            let mut state = self.state.borrow_ref_mut(section.token());
            debug_assert!(!state.booted, "kernel initialised twice");
            state.booted = true;
        }
        P::sys_init();
        debug!("kernel init, nominal tick {} Hz", P::TICK_HZ);
        Boot {
            kernel: self,
            _section: section,
        }
    }

    /// Check if [`Boot::start`] has run
    pub fn is_started(&self) -> bool {
        self.with_state(|state| state.started)
    }

    /// Body of the tick interrupt handler
    pub fn on_tick_interrupt(&self) {
        let elapsed = P::acknowledge_tick();
        self.tick(elapsed);
    }

    /// Advance the time base by `elapsed` time units and expire timed waiters
    pub fn tick(&self, elapsed: u32) {
        self.with_state(|state| {
            state.time.advance(elapsed);
            if elapsed == 0 {
                return;
            }

            let mut cursor = state.timers.head();
            while let Some(id) = cursor {
                let Some(waiter) = state.waiters.get_index_mut(id) else {
                    debug_assert!(false, "timer list names free slot {}", id);
                    break;
                };
                cursor = waiter.timer_link.next();
                let remaining = waiter.remaining.map_or(0, |r| r.saturating_sub(elapsed));
                waiter.remaining = Some(remaining);
                if remaining > 0 {
                    continue;
                }

                let owner = waiter.owner;
                let Some(object) = state.flags.get_mut(owner) else {
                    debug_assert!(false, "waiter {} outlived object {}", id, owner);
                    continue;
                };
                if let Some(thread) = release(
                    &mut state.waiters,
                    &mut state.timers,
                    &mut object.waiters,
                    id,
                    WaitState::TimedOut,
                ) {
                    trace!("waiter {} on {} timed out", id, owner);
                    self.scheduler.wake(thread);
                }
            }
        });
    }

    /// Time units since start, truncated to 32 bits
    pub fn tick_count(&self) -> u32 {
        self.with_state(|state| state.time.now().low())
    }

    /// Time units since start
    pub fn tick_count64(&self) -> u64 {
        self.with_state(|state| state.time.now().raw())
    }

    /// Tick interrupts handled since start
    pub fn raw_ticks(&self) -> u64 {
        self.with_state(|state| state.time.raw_ticks())
    }

    /// Smallest remaining timeout of all timed waiters, `u32::MAX` if none
    pub fn sleep_hint(&self) -> u32 {
        self.with_state(|state| {
            let mut hint = u32::MAX;
            let mut cursor = state.timers.head();
            while let Some(waiter) = cursor.and_then(|id| state.waiters.get_index(id)) {
                hint = hint.min(waiter.remaining.unwrap_or(u32::MAX));
                cursor = waiter.timer_link.next();
            }
            hint
        })
    }

    /// Sleep once through the port and account the slept time as idle time
    pub fn idle_once(&self) {
        let hint = self.sleep_hint();
        let before: Tick = self.with_state(|state| state.time.now());
        P::sys_sleep(hint);
        self.with_state(|state| {
            let slept = state.time.now().elapsed_since(before);
            state.time.add_idle(slept);
        });
    }

    /// Time units spent in [`idle_once`](Self::idle_once)
    pub fn idle_time(&self) -> u64 {
        self.with_state(|state| state.time.idle())
    }

    /// Idle loop for the lowest-priority thread
    pub fn idle(&self) -> ! {
        loop {
            self.idle_once();
        }
    }

    /// Usage of the waiter pool
    pub fn waiter_stats(&self) -> PoolStats {
        self.with_state(|state| state.waiters.stats())
    }

    /// Usage of the event flags pool
    pub fn flags_stats(&self) -> PoolStats {
        self.with_state(|state| state.flags.stats())
    }

    /// Suspend until the waiter at `waiter` is finished, then free its slot
    pub(crate) fn block_on(&self, waiter: Handle) -> KResult<u32> {
        loop {
            self.scheduler.suspend();
            let outcome = self.with_state(|state| {
                let result = match state.waiters.get(waiter).map(|w| w.state) {
                    Some(WaitState::Pending) => return None,
                    Some(WaitState::Satisfied(bits)) => Ok(bits),
                    Some(WaitState::TimedOut) => Err(KError::Timeout),
                    None => Err(KError::InvalidHandle),
                };
                state.waiters.free(waiter);
                Some(result)
            });
            if let Some(result) = outcome {
                return result;
            }
        }
    }
}

/// Boot phase of a kernel: the critical section entered by
/// [`Kernel::init`] is held until [`start`](Boot::start)
pub struct Boot<'k, P: Port, S: Scheduler, const FLAGS: usize, const WAITERS: usize> {
    kernel: &'k Kernel<P, S, FLAGS, WAITERS>,
    _section: CriticalSection<P>,
}

impl<'k, P, S, const FLAGS: usize, const WAITERS: usize> Boot<'k, P, S, FLAGS, WAITERS>
where
    P: Port,
    S: Scheduler,
{
    /// The kernel being booted
    pub fn kernel(&self) -> &'k Kernel<P, S, FLAGS, WAITERS> {
        self.kernel
    }

    /// Start the tick and leave the boot critical section
    pub fn start(self) {
        P::sys_start();
        self.kernel.with_state(|state| state.started = true);
        debug!("kernel started");
    }
}
