//! Per-epoch request sequence numbers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequence number of a request within one transaction epoch.
///
/// Zero is the value before any write in the epoch; the first write is
/// numbered one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Sequence(u32);

impl Sequence {
    pub const ZERO: Sequence = Sequence(0);
    pub const MAX: Sequence = Sequence(u32::MAX);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// The sequence number following this one, or `None` at [`Sequence::MAX`]
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// How many more sequence numbers can be allocated after this one
    pub const fn remaining(self) -> u32 {
        u32::MAX - self.0
    }
}

impl From<u32> for Sequence {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl PartialEq<u32> for Sequence {
    fn eq(&self, other: &u32) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_stops_at_max() {
        assert_eq!(Sequence::new(41).checked_next(), Some(Sequence::new(42)));
        assert_eq!(Sequence::new(u32::MAX - 1).checked_next(), Some(Sequence::MAX));
        assert_eq!(Sequence::MAX.checked_next(), None);
    }

    #[test]
    fn test_remaining() {
        assert_eq!(Sequence::ZERO.remaining(), u32::MAX);
        assert_eq!(Sequence::new(u32::MAX - 2).remaining(), 2);
        assert_eq!(Sequence::MAX.remaining(), 0);
    }
}
