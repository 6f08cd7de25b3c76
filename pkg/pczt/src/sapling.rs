//! Sapling records carried by a PCZT, and the wallet-side values used to build them

use borsh::{BorshDeserialize, BorshSerialize};
use primitives::Bytes32;
use serde::{Deserialize, Serialize};

use crate::{common::Zip32Derivation, constants::MEMO_SIZE};

/// A shielded spend
///
/// Created in one step by [`Pczt::add_sapling_spend`][crate::Pczt::add_sapling_spend]. Only
/// `spend_auth_sig` changes afterwards.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Spend {
    //
    // Spend-specific transaction effecting data.
    //
    /// Value commitment
    pub cv: Bytes32,
    /// Nullifier of the spent note
    pub nullifier: Bytes32,
    /// Randomized verification key
    pub rk: Bytes32,
    /// Groth16 proof bytes
    #[serde(with = "hex::serde")]
    pub zkproof: Vec<u8>,

    /// Filled in by the holder of the spend authorizing key
    #[serde(default, with = "primitives::util::hex_opt")]
    pub spend_auth_sig: Option<Vec<u8>>,

    //
    // Signer and prover data.
    //
    /// Randomizer for `rk`, needed to produce `spend_auth_sig`
    pub alpha: Bytes32,
    /// Value of the spent note
    pub value: u64,
    /// Value commitment trapdoor
    pub rcv: Bytes32,
    /// Key that authorizes the spend
    pub key: Zip32Derivation,
}

impl Spend {
    /// The spend authorization signature, if one has been filled in
    ///
    /// An empty signature counts as missing.
    pub fn signature(&self) -> Option<&[u8]> {
        self.spend_auth_sig.as_deref().filter(|sig| !sig.is_empty())
    }
}

/// A shielded output. Never changes once created.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Output {
    /// Value commitment
    pub cv: Bytes32,
    /// Note commitment
    pub cmu: Bytes32,
    /// Ephemeral public key for note decryption
    pub ephemeral_key: Bytes32,
    /// Note plaintext encrypted to the recipient
    #[serde(with = "hex::serde")]
    pub enc_ciphertext: Vec<u8>,
    /// Recovery data encrypted to the sender
    #[serde(with = "hex::serde")]
    pub out_ciphertext: Vec<u8>,
    /// Groth16 proof bytes
    #[serde(with = "hex::serde")]
    pub zkproof: Vec<u8>,

    /// Value of the created note
    pub value: u64,
    /// Value commitment trapdoor
    pub rcv: Bytes32,
    /// Key of the recipient
    pub key: Zip32Derivation,
}

/// A shielded payment address
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct PaymentAddress {
    /// Diversifier `d`
    pub diversifier: [u8; 11],
    /// Diversified transmission key
    pub pk_d: Bytes32,
}

/// A Sapling note
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Note {
    /// Recipient's diversifier
    pub diversifier: [u8; 11],
    /// Recipient's diversified transmission key
    pub pk_d: Bytes32,
    /// Value in zatoshis
    pub value: u64,
    /// Note commitment trapdoor
    pub rcm: Bytes32,
}

impl Note {
    /// A note of `value` to `to`
    #[must_use]
    pub fn new(to: PaymentAddress, value: u64, rcm: Bytes32) -> Self {
        Self {
            diversifier: to.diversifier,
            pk_d: to.pk_d,
            value,
            rcm,
        }
    }

    /// The address the note was sent to
    #[must_use]
    pub fn address(&self) -> PaymentAddress {
        PaymentAddress {
            diversifier: self.diversifier,
            pk_d: self.pk_d,
        }
    }
}

/// The parts of an expanded spending key a prover needs
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct ProofGenerationKey {
    /// Spend validating key
    pub ak: Bytes32,
    /// Nullifier private key
    pub nsk: Bytes32,
}

/// Lets the sender recover outputs they created
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(transparent)]
pub struct OutgoingViewingKey(pub Bytes32);

/// An authentication path for a note commitment
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct MerkleWitness {
    /// The root this path leads to
    pub root: Bytes32,
    /// Leaf position of the note commitment
    pub position: u64,
    /// Sibling hashes from the leaf upwards
    pub path: Vec<Bytes32>,
}

/// Memo attached to an output
///
/// Defaults to `0xF6` followed by zeroes, which means "no memo".
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Memo(pub [u8; MEMO_SIZE]);

impl Default for Memo {
    fn default() -> Self {
        let mut bytes = [0u8; MEMO_SIZE];
        bytes[0] = 0xF6;
        Self(bytes)
    }
}

impl Memo {
    /// Pad `text` with zeroes, or `None` if it is longer than [`MEMO_SIZE`]
    #[must_use]
    pub fn from_bytes(text: &[u8]) -> Option<Self> {
        if text.len() > MEMO_SIZE {
            return None;
        }

        let mut bytes = [0u8; MEMO_SIZE];
        bytes[..text.len()].copy_from_slice(text);
        Some(Self(bytes))
    }

    /// The padded memo
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; MEMO_SIZE] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_memo_is_empty_marker() {
        let memo = Memo::default();
        assert_eq!(memo.0[0], 0xF6);
        assert!(memo.0[1..].iter().all(|b| *b == 0));
    }

    #[test]
    fn memo_from_bytes() {
        let memo = Memo::from_bytes(b"hi").unwrap();
        assert_eq!(&memo.0[..3], b"hi\0");
        assert!(Memo::from_bytes(&[1; MEMO_SIZE + 1]).is_none());
    }

    #[test]
    fn spend_json_uses_hex() {
        let spend = Spend {
            zkproof: vec![0xab, 0xcd],
            spend_auth_sig: Some(vec![0x01]),
            value: 5,
            ..Spend::default()
        };

        let json = serde_json::to_value(&spend).unwrap();
        assert_eq!(json["zkproof"], "abcd");
        assert_eq!(json["spend_auth_sig"], "01");
        assert_eq!(json["value"], 5);

        let again: Spend = serde_json::from_value(json).unwrap();
        assert_eq!(again, spend);
    }

    #[test]
    fn empty_signature_is_unsigned() {
        let mut spend = Spend::default();
        assert_eq!(spend.signature(), None);

        spend.spend_auth_sig = Some(vec![]);
        assert_eq!(spend.signature(), None);

        spend.spend_auth_sig = Some(vec![3; 64]);
        assert_eq!(spend.signature(), Some(&[3; 64][..]));
    }
}
