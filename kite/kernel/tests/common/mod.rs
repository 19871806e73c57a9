//! Scripted scheduler for deterministic kernel tests
//!
//! A blocked "thread" is just a call stack: `suspend` runs the next queued
//! action, which plays the role of an interrupt or of another thread. An
//! action may itself block, nesting a second waiter inside the first.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use kite_kernel::{Kernel, Scheduler};
use kite_posix::PosixPort;

pub type ThreadId = u32;

#[derive(Default)]
pub struct Script {
    actions: RefCell<VecDeque<Box<dyn FnOnce()>>>,
    woken: RefCell<Vec<ThreadId>>,
    current: Cell<ThreadId>,
    suspends: Cell<usize>,
}

impl Script {
    pub fn then(&self, action: impl FnOnce() + 'static) -> &Self {
        self.actions.borrow_mut().push_back(Box::new(action));
        self
    }

    pub fn run_as(&self, thread: ThreadId) {
        self.current.set(thread);
    }

    pub fn woken(&self) -> Vec<ThreadId> {
        self.woken.borrow().clone()
    }

    pub fn suspends(&self) -> usize {
        self.suspends.get()
    }

    pub fn pending_actions(&self) -> usize {
        self.actions.borrow().len()
    }
}

impl Scheduler for Script {
    type Thread = ThreadId;

    fn current(&self) -> ThreadId {
        self.current.get()
    }

    fn suspend(&self) {
        self.suspends.set(self.suspends.get() + 1);
        let action = self.actions.borrow_mut().pop_front();
        match action {
            Some(action) => action(),
            None => panic!("thread {} blocked with nothing left to run", self.current.get()),
        }
    }

    fn wake(&self, thread: ThreadId) {
        self.woken.borrow_mut().push(thread);
    }
}

pub type TestKernel = Kernel<PosixPort, Script, 4, 4>;

/// A booted kernel that lives for the rest of the test
pub fn kernel() -> &'static TestKernel {
    let _ = env_logger::builder().is_test(true).try_init();
    let kernel: &'static TestKernel = Box::leak(Box::new(Kernel::new(Script::default())));
    kernel.init().start();
    kernel
}
