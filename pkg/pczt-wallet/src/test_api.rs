//! An in-memory [`Wallet`] for tests

use std::collections::HashMap;

use pczt::{
    sapling::{MerkleWitness, Note, PaymentAddress},
    test_api,
};
use primitives::Bytes32;

use crate::wallet::{KeyMetadata, OutPoint, SpendableNote, SpendingKeys, Wallet, Witnesses};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MockWalletError {
    #[error("wallet is unavailable")]
    Unavailable,
}

/// Holds one address, its keys and the notes sent to it
#[derive(Debug, Clone)]
pub struct MockWallet {
    pub anchor: Bytes32,
    pub hd_keypath: String,
    /// Return [`MockWalletError::Unavailable`] from every call
    pub unavailable: bool,
    notes: Vec<(u32, SpendableNote)>,
    witnesses: HashMap<OutPoint, MerkleWitness>,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self {
            anchor: test_api::ANCHOR,
            hd_keypath: "m/32'/133'/0'".to_owned(),
            unavailable: false,
            notes: Vec::new(),
            witnesses: HashMap::new(),
        }
    }
}

impl MockWallet {
    /// The one address this wallet can spend from
    pub fn address(&self) -> PaymentAddress {
        test_api::address()
    }

    pub fn keys(&self) -> SpendingKeys {
        SpendingKeys {
            proof_generation_key: test_api::proof_generation_key(),
            ovk: test_api::ovk(),
        }
    }

    /// Receive a note of `value`, with a witness to the current anchor
    pub fn add_note(&mut self, value: u64, confirmations: u32) -> OutPoint {
        let position = self.notes.len() as u64;
        let outpoint = OutPoint {
            txid: Bytes32::from_u64(position + 1),
            index: 0,
        };
        let note = Note::new(self.address(), value, Bytes32::from_u64(position + 1));

        self.notes
            .push((confirmations, SpendableNote { outpoint, note }));
        self.witnesses
            .insert(outpoint, test_api::witness(self.anchor, position));

        outpoint
    }

    pub fn remove_witness(&mut self, outpoint: &OutPoint) {
        self.witnesses.remove(outpoint);
    }

    fn available(&self) -> Result<(), MockWalletError> {
        if self.unavailable {
            return Err(MockWalletError::Unavailable);
        }
        Ok(())
    }
}

impl Wallet for MockWallet {
    type Error = MockWalletError;

    fn spending_key(&self, address: &PaymentAddress) -> Result<Option<SpendingKeys>, Self::Error> {
        self.available()?;
        Ok((*address == self.address()).then(|| self.keys()))
    }

    fn key_metadata(&self, _keys: &SpendingKeys) -> Result<KeyMetadata, Self::Error> {
        self.available()?;
        Ok(KeyMetadata {
            seed_fingerprint: Bytes32([6; 32]),
            hd_keypath: self.hd_keypath.clone(),
        })
    }

    fn spendable_notes(
        &self,
        address: &PaymentAddress,
        min_confirmations: u32,
    ) -> Result<Vec<SpendableNote>, Self::Error> {
        self.available()?;
        Ok(self
            .notes
            .iter()
            .filter(|(confirmations, note)| {
                *confirmations >= min_confirmations && note.note.address() == *address
            })
            .map(|(_, note)| note.clone())
            .collect())
    }

    fn witnesses(&self, outpoints: &[OutPoint]) -> Result<Witnesses, Self::Error> {
        self.available()?;
        Ok(Witnesses {
            anchor: self.anchor,
            witnesses: outpoints
                .iter()
                .map(|outpoint| self.witnesses.get(outpoint).cloned())
                .collect(),
        })
    }
}
