//! Metadata shared by every record kind

use borsh::{BorshDeserialize, BorshSerialize};
use primitives::Bytes32;
use serde::{Deserialize, Serialize};

/// Bit set on hardened derivation indices
pub const HARDENED: u32 = 0x8000_0000;

/// Which key a downstream party should use for a record
///
/// This identifies a key without revealing it, so it is safe to hand to any party holding the
/// PCZT. It is metadata, not a capability.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Zip32Derivation {
    /// The [ZIP 32 seed fingerprint](https://zips.z.cash/zip-0032#seed-fingerprints)
    pub seed_fingerprint: Bytes32,

    /// The sequence of indices corresponding to the shielded HD path
    ///
    /// Hardened indices have [`HARDENED`] set.
    pub derivation_path: Vec<u32>,
}

/// Why a textual keypath could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeypathError {
    /// The path does not begin with `m`
    #[error("keypath must start with `m`")]
    MissingRoot,

    /// A component is not a number with an optional `'` or `h` suffix
    #[error("invalid keypath component `{0}`")]
    InvalidComponent(String),

    /// A component is too large to hold the hardened bit
    #[error("keypath index {0} is out of range")]
    IndexOutOfRange(u32),
}

impl Zip32Derivation {
    /// Provenance for the key at `derivation_path` under the seed with `seed_fingerprint`
    #[must_use]
    pub fn new(seed_fingerprint: Bytes32, derivation_path: Vec<u32>) -> Self {
        Self {
            seed_fingerprint,
            derivation_path,
        }
    }

    /// Build from a seed fingerprint and a textual keypath such as `m/32'/133'/0'`
    ///
    /// Components may be hardened with either `'` or `h`.
    pub fn from_keypath(seed_fingerprint: Bytes32, keypath: &str) -> Result<Self, KeypathError> {
        Ok(Self::new(seed_fingerprint, parse_keypath(keypath)?))
    }
}

/// Parse `m/a/b'/c` into derivation indices
pub fn parse_keypath(keypath: &str) -> Result<Vec<u32>, KeypathError> {
    let mut parts = keypath.trim().split('/');

    if parts.next() != Some("m") {
        return Err(KeypathError::MissingRoot);
    }

    parts
        .map(|part| {
            let (digits, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
                Some(digits) => (digits, true),
                None => (part, false),
            };

            let index: u32 = digits
                .parse()
                .map_err(|_| KeypathError::InvalidComponent(part.to_owned()))?;

            if index >= HARDENED {
                return Err(KeypathError::IndexOutOfRange(index));
            }

            Ok(if hardened { index | HARDENED } else { index })
        })
        .collect()
}
