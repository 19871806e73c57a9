//! Event flag wait options and the wake condition

use core::fmt;

/// Raw option bit: any requested bit satisfies the wait
pub const WAIT_ANY: u32 = 0x00;
/// Raw option bit: all requested bits must be present
pub const WAIT_ALL: u32 = 0x01;
/// Raw option bit: clear the matched bits when the wait is satisfied
pub const AUTO_RESET: u32 = 0x02;

/// Whether any or all requested bits must be set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitMode {
    /// Satisfied when `flags & mask != 0`
    #[default]
    Any,
    /// Satisfied when `flags & mask == mask`
    All,
}

/// Options of a wait on an event flags object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaitOptions {
    pub mode: WaitMode,
    pub auto_reset: bool,
}

impl WaitOptions {
    /// Match any requested bit
    pub const ANY: Self = Self {
        mode: WaitMode::Any,
        auto_reset: false,
    };

    /// Match all requested bits
    pub const ALL: Self = Self {
        mode: WaitMode::All,
        auto_reset: false,
    };

    /// Same options with auto-reset enabled
    pub const fn auto_reset(self) -> Self {
        Self {
            mode: self.mode,
            auto_reset: true,
        }
    }

    /// Decode the raw `WAIT_ANY` / `WAIT_ALL` / `AUTO_RESET` bit encoding
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            mode: if bits & WAIT_ALL != 0 {
                WaitMode::All
            } else {
                WaitMode::Any
            },
            auto_reset: bits & AUTO_RESET != 0,
        }
    }

    /// Encode as raw option bits
    pub const fn bits(&self) -> u32 {
        let mode = match self.mode {
            WaitMode::Any => WAIT_ANY,
            WaitMode::All => WAIT_ALL,
        };
        if self.auto_reset {
            mode | AUTO_RESET
        } else {
            mode
        }
    }

    /// Evaluate the wake condition for `mask` against `flags`
    ///
    /// Returns the satisfying bits (`flags & mask`) when the condition holds.
    /// A zero mask never satisfies a match-any wait and always satisfies a
    /// match-all wait, yielding zero.
    pub const fn matches(&self, flags: u32, mask: u32) -> Option<u32> {
        let hit = flags & mask;
        let satisfied = match self.mode {
            WaitMode::Any => hit != 0,
            WaitMode::All => hit == mask,
        };
        if satisfied {
            Some(hit)
        } else {
            None
        }
    }
}

impl fmt::Display for WaitOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            WaitMode::Any => "any",
            WaitMode::All => "all",
        };
        if self.auto_reset {
            write!(f, "{}+auto-reset", mode)
        } else {
            write!(f, "{}", mode)
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for WaitMode {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            WaitMode::Any => defmt::write!(fmt, "Any"),
            WaitMode::All => defmt::write!(fmt, "All"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for WaitOptions {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "WaitOptions{{ {}, auto_reset: {} }}", self.mode, self.auto_reset);
    }
}
