//! The fundamental unit of emulated time.

/// A count of emulated CPU clock ticks.
///
/// Ticks are independent of the host frame rate. The CPU collaborator keeps a
/// cumulative counter of these; the scheduler only ever asks it to run up to
/// an absolute tick position, never by a relative amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(pub u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Little-endian encoding used by the snapshot record.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }
}
