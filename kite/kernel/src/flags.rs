//! Event flags
//!
//! An event flags object is a 32-bit word plus a FIFO list of blocked
//! waiters. Setting bits wakes, in arrival order, every waiter whose
//! condition holds; a waiter with auto-reset consumes the bits it matched
//! before the next waiter is looked at.

use core::fmt;

use kite_core::{KError, KResult, List, Timeout, WaitOptions};
use kite_mem::Handle;
use log::{trace, warn};

use crate::critical::CriticalSection;
use crate::kernel::{enqueue, release, WaitState, Waiter};
use crate::{Kernel, Port, Scheduler};

/// Handle to an event flags object
///
/// Handles are `Copy`. Using one after its object was deleted yields
/// [`KError::InvalidHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventFlags(Handle);

impl EventFlags {
    /// Underlying pool handle
    pub const fn handle(&self) -> Handle {
        self.0
    }
}

impl fmt::Display for EventFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flags{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EventFlags {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "flags{}", self.0);
    }
}

#[derive(Debug, Default)]
pub(crate) struct FlagsObject {
    pub(crate) bits: u32,
    pub(crate) waiters: List,
}

impl<P, S, const FLAGS: usize, const WAITERS: usize> Kernel<P, S, FLAGS, WAITERS>
where
    P: Port,
    S: Scheduler,
{
    /// Create an event flags object with all bits clear
    ///
    /// Fails with [`KError::OutOfMemory`] when all `FLAGS` objects exist.
    pub fn event_flags_create(&self) -> KResult<EventFlags> {
        let handle = self
            .with_state(|state| state.flags.alloc(FlagsObject::default()))
            .map_err(|_| KError::OutOfMemory)?;
        trace!("created {}", handle);
        Ok(EventFlags(handle))
    }

    /// Delete an event flags object
    ///
    /// An object with blocked waiters is kept and
    /// [`KError::HasWaiters`] is returned.
    pub fn event_flags_delete(&self, flags: EventFlags) -> KResult<()> {
        self.with_state(|state| {
            let object = state.flags.get(flags.0).ok_or(KError::InvalidHandle)?;
            if !object.waiters.is_empty() {
                warn!("refusing to delete {} with {} waiters", flags, object.waiters.len());
                return Err(KError::HasWaiters);
            }
            state.flags.free(flags.0);
            trace!("deleted {}", flags);
            Ok(())
        })
    }

    /// OR `bits` into the word and wake every waiter that is now satisfied
    pub fn event_flags_set(&self, flags: EventFlags, bits: u32) -> KResult<()> {
        self.with_state(|state| {
            let object = state.flags.get_mut(flags.0).ok_or(KError::InvalidHandle)?;
            object.bits |= bits;

            let mut cursor = object.waiters.head();
            while let Some(id) = cursor {
                let Some(waiter) = state.waiters.get_index(id) else {
                    debug_assert!(false, "wait list of {} names free slot {}", flags, id);
                    break;
                };
                cursor = waiter.wait_link.next();
                let Some(hit) = waiter.options.matches(object.bits, waiter.mask) else {
                    continue;
                };
                if waiter.options.auto_reset {
                    object.bits &= !hit;
                }
                if let Some(thread) = release(
                    &mut state.waiters,
                    &mut state.timers,
                    &mut object.waiters,
                    id,
                    WaitState::Satisfied(hit),
                ) {
                    trace!("{} woke waiter {} with {:#x}", flags, id, hit);
                    self.scheduler.wake(thread);
                }
            }
            Ok(())
        })
    }

    /// Clear `bits` in the word; never wakes anyone
    pub fn event_flags_reset(&self, flags: EventFlags, bits: u32) -> KResult<()> {
        self.with_state(|state| {
            let object = state.flags.get_mut(flags.0).ok_or(KError::InvalidHandle)?;
            object.bits &= !bits;
            Ok(())
        })
    }

    /// Block until the condition on `bits` holds
    ///
    /// Returns the satisfying bits, `word & bits` at the moment of wake-up.
    pub fn event_flags_wait(
        &self,
        flags: EventFlags,
        bits: u32,
        options: WaitOptions,
    ) -> KResult<u32> {
        self.event_flags_timed_wait(flags, bits, options, Timeout::INFINITE)
    }

    /// Block until the condition on `bits` holds or `timeout` time units pass
    ///
    /// A zero timeout never blocks. Expiry returns [`KError::Timeout`].
    pub fn event_flags_timed_wait(
        &self,
        flags: EventFlags,
        bits: u32,
        options: WaitOptions,
        timeout: Timeout,
    ) -> KResult<u32> {
        let waiter = {
            let section = CriticalSection::<P>::enter();
            let mut state = self.state.borrow_ref_mut(section.token());
            let state = &mut *state;

            let object = state.flags.get_mut(flags.0).ok_or(KError::InvalidHandle)?;
            if let Some(hit) = options.matches(object.bits, bits) {
                if options.auto_reset {
                    object.bits &= !hit;
                }
                return Ok(hit);
            }
            if timeout.is_zero() {
                return Err(KError::Timeout);
            }

            let record = Waiter::new(
                bits,
                options,
                timeout.ticks(),
                self.scheduler.current(),
                flags.0,
            );
            let waiter = state.waiters.alloc(record).map_err(|_| {
                warn!("no free waiter slot for {}", flags);
                KError::OutOfMemory
            })?;
            let id = waiter.index();
            if let Err(err) = enqueue(
                &mut state.waiters,
                &mut state.timers,
                &mut object.waiters,
                id,
                !timeout.is_infinite(),
            ) {
                state.waiters.free(waiter);
                return Err(err.into());
            }
            trace!("waiter {} blocked on {} for {:#x} ({}, {})", id, flags, bits, options, timeout);
            waiter
        };
        self.block_on(waiter)
    }

    /// Take the condition if it already holds, without blocking
    pub fn event_flags_poll(
        &self,
        flags: EventFlags,
        bits: u32,
        options: WaitOptions,
    ) -> KResult<u32> {
        self.event_flags_timed_wait(flags, bits, options, Timeout::ZERO)
    }

    /// Current word
    pub fn event_flags_get(&self, flags: EventFlags) -> KResult<u32> {
        self.with_state(|state| {
            state
                .flags
                .get(flags.0)
                .map(|object| object.bits)
                .ok_or(KError::InvalidHandle)
        })
    }

    /// Number of threads blocked on the object
    pub fn event_flags_waiters(&self, flags: EventFlags) -> KResult<usize> {
        self.with_state(|state| {
            state
                .flags
                .get(flags.0)
                .map(|object| object.waiters.len())
                .ok_or(KError::InvalidHandle)
        })
    }
}
