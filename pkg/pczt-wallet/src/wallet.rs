use pczt::sapling::{MerkleWitness, Note, OutgoingViewingKey, PaymentAddress, ProofGenerationKey};
use primitives::Bytes32;
use serde::{Deserialize, Serialize};

/// Key material needed to build spends and outputs for an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendingKeys {
    pub proof_generation_key: ProofGenerationKey,
    pub ovk: OutgoingViewingKey,
}

/// Where a key came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    pub seed_fingerprint: Bytes32,
    /// Textual HD path, such as `m/32'/133'/0'`
    pub hd_keypath: String,
}

/// Identifies a note by the transaction that created it and its output index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: Bytes32,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendableNote {
    pub outpoint: OutPoint,
    pub note: Note,
}

/// The current anchor, and a witness to it for each requested note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witnesses {
    pub anchor: Bytes32,
    /// In the order the outpoints were requested, `None` if the wallet has no witness
    pub witnesses: Vec<Option<MerkleWitness>>,
}

/// The wallet state the funding workflow reads
pub trait Wallet {
    type Error: std::error::Error + Send + Sync + 'static;

    /// The keys for `address`, or `None` if this wallet cannot spend from it
    fn spending_key(&self, address: &PaymentAddress) -> Result<Option<SpendingKeys>, Self::Error>;

    fn key_metadata(&self, keys: &SpendingKeys) -> Result<KeyMetadata, Self::Error>;

    /// Unspent notes sent to `address` with at least `min_confirmations`
    fn spendable_notes(
        &self,
        address: &PaymentAddress,
        min_confirmations: u32,
    ) -> Result<Vec<SpendableNote>, Self::Error>;

    /// Fetch the anchor and all witnesses in one call, so they are consistent
    fn witnesses(&self, outpoints: &[OutPoint]) -> Result<Witnesses, Self::Error>;
}
