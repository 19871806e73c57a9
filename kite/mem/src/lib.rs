#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

//! # Kite Memory Management
//!
//! Statically sized object pools for kernel objects and wait records.
//! Every slot is addressed by a [`Handle`] carrying a generation counter, so
//! a handle to a freed object is detected instead of aliasing its successor.

pub mod pool;

pub use pool::*;

/// Memory pool statistics for debugging and monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Total number of slots in the pool
    pub total_blocks: usize,
    /// Number of free slots currently available
    pub free_blocks: usize,
    /// Number of slots currently in use
    pub used_blocks: usize,
    /// Minimum number of free slots ever reached
    pub min_free_blocks: usize,
}

impl PoolStats {
    /// Statistics of an untouched pool
    pub const fn new(total_blocks: usize) -> Self {
        Self {
            total_blocks,
            free_blocks: total_blocks,
            used_blocks: 0,
            min_free_blocks: total_blocks,
        }
    }

    pub(crate) fn on_alloc(&mut self) {
        self.used_blocks += 1;
        self.free_blocks -= 1;
        if self.free_blocks < self.min_free_blocks {
            self.min_free_blocks = self.free_blocks;
        }
    }

    pub(crate) fn on_dealloc(&mut self) {
        if self.used_blocks > 0 {
            self.used_blocks -= 1;
            self.free_blocks += 1;
        }
    }

    /// Check if every slot is in use
    pub const fn is_full(&self) -> bool {
        self.free_blocks == 0
    }

    /// Check if no slot is in use
    pub const fn is_empty(&self) -> bool {
        self.used_blocks == 0
    }

    /// Utilization as a percentage (0-100)
    pub fn utilization(&self) -> u8 {
        if self.total_blocks == 0 {
            0
        } else {
            ((self.used_blocks * 100) / self.total_blocks) as u8
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PoolStats {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "PoolStats{{ total: {}, free: {}, used: {}, min_free: {} }}",
            self.total_blocks,
            self.free_blocks,
            self.used_blocks,
            self.min_free_blocks
        );
    }
}
