#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

//! # Kite Core
//!
//! Core types shared by every layer of the Kite kernel: the error type, the
//! index-based intrusive wait list, time base types and the wait options used
//! by event flags. Nothing in here touches hardware or global state.

use core::fmt;

pub mod flags;
pub mod list;
pub mod time;

pub use flags::*;
pub use list::*;
pub use time::*;

/// Kite kernel version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used throughout the Kite kernel
pub type KResult<T> = Result<T, KError>;

/// Error types for kernel operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KError {
    /// Backing storage (object or waiter pool) is exhausted
    OutOfMemory,
    /// Handle does not name a live object
    InvalidHandle,
    /// A timed wait expired before its condition was met
    Timeout,
    /// Object still has blocked waiters
    HasWaiters,
    /// Wait list misuse
    List(ListError),
}

impl From<ListError> for KError {
    fn from(err: ListError) -> Self {
        KError::List(err)
    }
}

impl fmt::Display for KError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KError::OutOfMemory => write!(f, "Kernel object storage exhausted"),
            KError::InvalidHandle => write!(f, "Handle does not refer to a live object"),
            KError::Timeout => write!(f, "Wait timed out"),
            KError::HasWaiters => write!(f, "Object still has blocked waiters"),
            KError::List(err) => write!(f, "Wait list error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KError {}

#[cfg(feature = "defmt")]
impl defmt::Format for KError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            KError::OutOfMemory => defmt::write!(fmt, "OutOfMemory"),
            KError::InvalidHandle => defmt::write!(fmt, "InvalidHandle"),
            KError::Timeout => defmt::write!(fmt, "Timeout"),
            KError::HasWaiters => defmt::write!(fmt, "HasWaiters"),
            KError::List(err) => defmt::write!(fmt, "List({})", err),
        }
    }
}
