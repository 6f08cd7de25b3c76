use base64::{prelude::BASE64_STANDARD, Engine};
use borsh::{BorshDeserialize, BorshSerialize};
use strum::EnumCount;

use crate::{error::InvalidPct, Pczt};

/// Versioned envelope around the binary form of a [`Pczt`]
///
/// New layouts are added as new variants, and older ones are upgraded on read.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize, strum_macros::EnumCount)]
pub enum PcztFormat {
    /// The first layout
    V1(Pczt),
}

impl PcztFormat {
    /// The newest version
    pub const MAX_VERSION: u64 = Self::COUNT as u64;

    /// The version of this envelope, starting at 1
    pub fn version(&self) -> u64 {
        match self {
            Self::V1(_) => 1,
        }
    }

    /// Bring the contents up to [`Self::MAX_VERSION`]
    pub fn upgrade(self) -> Pczt {
        match self {
            Self::V1(pczt) => pczt,
        }
    }
}

impl Pczt {
    /// Canonical binary encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        #[allow(clippy::expect_used)]
        borsh::to_vec(&PcztFormat::V1(self.clone())).expect("writing to a Vec never fails")
    }

    /// Decode the output of [`Pczt::to_bytes`]
    ///
    /// Trailing bytes and unknown versions are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InvalidPct> {
        borsh::from_slice::<PcztFormat>(bytes)
            .map(PcztFormat::upgrade)
            .map_err(InvalidPct::Encoding)
    }

    /// Base64 text form, for passing between parties
    pub fn serialize(&self) -> String {
        BASE64_STANDARD.encode(self.to_bytes())
    }

    /// Decode the output of [`Pczt::serialize`]
    pub fn parse(encoded: &str) -> Result<Self, InvalidPct> {
        let bytes = BASE64_STANDARD.decode(encoded.trim())?;
        Self::from_bytes(&bytes)
    }
}
