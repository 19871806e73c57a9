//! Time base types and tick scaling

use core::fmt;

/// Time units per second of the millisecond-compatible time base
pub const UNITS_PER_SEC: u32 = 1000;

/// Point on the kernel time base, in time units since start
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Tick(u64);

impl Tick {
    /// Zero tick
    pub const ZERO: Self = Self(0);

    /// Create a new tick value
    pub const fn new(units: u64) -> Self {
        Self(units)
    }

    /// Get the raw value
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Low 32 bits, for APIs that report a wrapping 32-bit counter
    pub const fn low(self) -> u32 {
        self.0 as u32
    }

    /// Advance by `units`
    ///
    /// The time base never runs long enough to wrap a `u64`, so this
    /// saturates rather than wrapping back to zero.
    pub fn advance(&mut self, units: u32) {
        self.0 = self.0.saturating_add(units as u64);
    }

    /// Units elapsed since an earlier tick
    pub const fn elapsed_since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick:{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Tick {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "tick:{}", self.0);
    }
}

/// How long a wait may block, in time units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Give up after this many time units; zero means do not block at all
    Ticks(u32),
    /// Block until the condition is met
    Infinite,
}

impl Timeout {
    /// Non-blocking poll
    pub const ZERO: Self = Self::Ticks(0);

    /// Never time out
    pub const INFINITE: Self = Self::Infinite;

    /// Create a finite timeout
    pub const fn from_ticks(ticks: u32) -> Self {
        Self::Ticks(ticks)
    }

    /// Check if this is a non-blocking poll
    pub const fn is_zero(&self) -> bool {
        matches!(self, Self::Ticks(0))
    }

    /// Check if this timeout never expires
    pub const fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Finite tick count, `None` for an infinite timeout
    pub const fn ticks(&self) -> Option<u32> {
        match self {
            Self::Ticks(ticks) => Some(*ticks),
            Self::Infinite => None,
        }
    }
}

/// `u32::MAX` is the conventional "wait forever" value
impl From<u32> for Timeout {
    fn from(ticks: u32) -> Self {
        if ticks == u32::MAX {
            Self::Infinite
        } else {
            Self::Ticks(ticks)
        }
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ticks(ticks) => write!(f, "{}ticks", ticks),
            Self::Infinite => write!(f, "infinite"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Timeout {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Ticks(ticks) => defmt::write!(fmt, "{}ticks", ticks),
            Self::Infinite => defmt::write!(fmt, "infinite"),
        }
    }
}

/// Converts hardware tick interrupts at an arbitrary rate into whole time
/// units, carrying the fractional remainder between calls
///
/// Ports whose timer fires faster than the time unit feed every interrupt
/// through a scaler so the kernel still counts milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickScaler {
    tick_hz: u32,
    remainder: u32,
}

impl TickScaler {
    /// Create a scaler for a timer interrupting `tick_hz` times per second
    ///
    /// # Panics
    ///
    /// Panics if `tick_hz` is zero.
    pub const fn new(tick_hz: u32) -> Self {
        assert!(tick_hz > 0, "tick rate must be non-zero");
        Self {
            tick_hz,
            remainder: 0,
        }
    }

    /// Tick rate this scaler was built for
    pub const fn tick_hz(&self) -> u32 {
        self.tick_hz
    }

    /// Account for `ticks` interrupts and return the whole time units that
    /// elapsed
    pub fn advance(&mut self, ticks: u32) -> u32 {
        let total = self.remainder as u64 + ticks as u64 * UNITS_PER_SEC as u64;
        self.remainder = (total % self.tick_hz as u64) as u32;
        (total / self.tick_hz as u64) as u32
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TickScaler {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "TickScaler({}Hz, rem {})", self.tick_hz, self.remainder);
    }
}
