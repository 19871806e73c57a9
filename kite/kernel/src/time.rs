//! Kernel time base

use kite_core::Tick;

/// Tick counters of a running kernel
///
/// Both counters only grow and are only touched inside the critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeBase {
    raw: u64,
    now: Tick,
    idle: u64,
}

impl TimeBase {
    /// Time base at boot
    pub const fn new() -> Self {
        Self {
            raw: 0,
            now: Tick::ZERO,
            idle: 0,
        }
    }

    /// Account for one tick interrupt worth `elapsed` time units
    pub fn advance(&mut self, elapsed: u32) {
        self.raw = self.raw.saturating_add(1);
        self.now.advance(elapsed);
    }

    /// Tick interrupts seen since start
    pub const fn raw_ticks(&self) -> u64 {
        self.raw
    }

    /// Time units since start
    pub const fn now(&self) -> Tick {
        self.now
    }

    /// Time units spent in the idle path
    pub const fn idle(&self) -> u64 {
        self.idle
    }

    pub(crate) fn add_idle(&mut self, units: u64) {
        self.idle = self.idle.saturating_add(units);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TimeBase {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "TimeBase{{ raw: {}, now: {}, idle: {} }}",
            self.raw,
            self.now,
            self.idle
        );
    }
}
