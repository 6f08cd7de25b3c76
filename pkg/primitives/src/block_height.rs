use std::fmt::Debug;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

microtype::microtype! {
    #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
    pub u32 {
        /// A block height
        #[derive(Default)]
        #[int]  // add maths traits
        BlockHeight,
    }
}

// transparent debug impl
impl Debug for BlockHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl BlockHeight {
    /// The height `height`
    #[must_use]
    pub const fn at(height: u32) -> Self {
        Self(height)
    }

    /// The raw height
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// The height `delta` blocks after this one, clamped to `u32::MAX`
    #[must_use]
    pub const fn saturating_add(self, delta: u32) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturates() {
        assert_eq!(BlockHeight::at(10).saturating_add(5), BlockHeight::at(15));
        assert_eq!(
            BlockHeight::at(u32::MAX - 1).saturating_add(5),
            BlockHeight::at(u32::MAX)
        );
        assert!(BlockHeight::at(3) < BlockHeight::at(4));
    }
}
