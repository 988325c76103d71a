//! Virtual clock configuration.

use crate::Ticks;

/// Host frame rate. The BK video hardware refreshes at 50 Hz interlaced,
/// which the frontend presents as 25 full frames per second.
pub const FRAMES_PER_SECOND: u64 = 25;

/// CPU speed multiplier selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockMultiplier {
    #[default]
    Normal,
    Double,
}

impl ClockMultiplier {
    #[must_use]
    pub const fn factor(self) -> u64 {
        match self {
            ClockMultiplier::Normal => 1,
            ClockMultiplier::Double => 2,
        }
    }
}

/// Emulated clock for one session.
///
/// The base rate comes from the machine variant; the multiplier is a
/// runtime option. Every budget derives from the product of the two using
/// integer division, so a rate that is not a multiple of 25 drifts by the
/// remainder each frame. That drift is accepted and not corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualClock {
    /// Base tick rate in ticks per second (3 MHz or 4 MHz on real hardware).
    pub base_rate_hz: u64,
    pub multiplier: ClockMultiplier,
}

impl VirtualClock {
    #[must_use]
    pub const fn new(base_rate_hz: u64, multiplier: ClockMultiplier) -> Self {
        Self {
            base_rate_hz,
            multiplier,
        }
    }

    /// Effective tick rate in ticks per second.
    #[must_use]
    pub const fn tick_rate(&self) -> u64 {
        self.base_rate_hz * self.multiplier.factor()
    }

    /// Ticks per host frame.
    #[must_use]
    pub const fn frame_budget(&self) -> Ticks {
        Ticks::new(self.tick_rate() / FRAMES_PER_SECOND)
    }

    /// Ticks per video field (half a host frame).
    #[must_use]
    pub const fn half_frame_budget(&self) -> Ticks {
        Ticks::new(self.tick_rate() / (FRAMES_PER_SECOND * 2))
    }

    /// Absolute tick position at the end of `frames` frames counted from
    /// `origin`.
    ///
    /// The multiplication happens before the division so the rounding
    /// remainder is dropped once per call, not accumulated per frame.
    /// Saturates at `u64::MAX` instead of overflowing.
    #[must_use]
    pub const fn target_after(&self, origin: Ticks, frames: u64) -> Ticks {
        let span = frames.saturating_mul(self.tick_rate()) / FRAMES_PER_SECOND;
        Ticks::new(origin.get().saturating_add(span))
    }
}
