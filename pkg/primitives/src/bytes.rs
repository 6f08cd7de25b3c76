use borsh::{BorshDeserialize, BorshSerialize};
use hex::FromHex;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::str::FromStr;

/// A fixed 32-byte value, such as a commitment, nullifier, Merkle root or scalar encoding
///
/// The bytes are stored exactly as they appear on the wire. Serde uses a hex string, borsh uses
/// the raw 32 bytes.
#[derive(
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
// Serialize transparently with serde
// because otherwise it would be serialized as a tuple.
#[serde(transparent)]
pub struct Bytes32(#[serde(with = "hex::serde")] pub [u8; 32]);

impl Bytes32 {
    /// The length of the value in bytes
    pub const SIZE: usize = 32;

    /// All zeroes
    pub const ZERO: Self = Self([0u8; 32]);

    /// Wrap an array of bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// A value whose last 8 bytes are `n` in big-endian order
    ///
    /// Mostly useful for building readable fixtures
    #[must_use]
    pub fn from_u64(n: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..32].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    /// Copy a slice into a [`Bytes32`], failing if it is not exactly 32 bytes long
    pub fn from_slice(slice: &[u8]) -> Result<Self, core::array::TryFromSliceError> {
        <[u8; 32]>::try_from(slice).map(Self)
    }

    /// Fill a new value from `rng`
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Borrow the inner bytes
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &[u8; 32] {
        &self.0
    }

    /// Take the inner bytes
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> [u8; 32] {
        self.0
    }

    /// Whether every byte is zero
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Copy the bytes into a [`Vec`]
    #[must_use]
    pub fn to_vec(self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Lowercase hex, without a `0x` prefix
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Display for Bytes32 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Debug for Bytes32 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Bytes32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Bytes32> for [u8; 32] {
    fn from(value: Bytes32) -> Self {
        value.0
    }
}

impl FromStr for Bytes32 {
    type Err = hex::FromHexError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        <[u8; 32]>::from_hex(s).map(Self)
    }
}

#[cfg(any(test, feature = "proptest"))]
mod proptest {
    use super::Bytes32;
    use ::proptest::{arbitrary::StrategyFor, prelude::*, strategy::Map};

    impl Arbitrary for Bytes32 {
        type Strategy = Map<StrategyFor<[u8; 32]>, fn([u8; 32]) -> Self>;
        type Parameters = ();

        fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
            any::<[u8; 32]>().prop_map(Bytes32)
        }
    }
}
