use borsh::{BorshDeserialize, BorshSerialize};
use primitives::Bytes32;
use serde::{Deserialize, Serialize};

use crate::{accumulator::Accumulator, constants::SAPLING_TX_VERSION, Error, Result};

/// Fields that apply to the transaction as a whole
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Global {
    //
    // Transaction effecting data.
    //
    // These end up in the final transaction, and must agree between instances being combined.
    //
    /// Transaction format version, without the overwintered flag
    pub tx_version: u32,
    /// Version group, which must match `tx_version`
    pub version_group_id: u32,
    /// Earliest block height or time the transaction may be mined
    pub lock_time: u32,
    /// Height after which the transaction can no longer be mined
    pub expiry_height: u32,
    /// Shared Merkle root every spend is proven against
    pub sapling_anchor: Option<Bytes32>,

    /// Net shielded value leaving the pool: spends minus outputs
    pub value_balance: i64,

    //
    // Accumulated trapdoor state for the binding signature.
    //
    // Both are `None` until the first spend or output is added.
    //
    /// See [`Accumulator::bsk`]
    pub bsk: Option<Bytes32>,
    /// See [`Accumulator::cv_sum`]
    pub cv_sum: Option<Bytes32>,
}

impl Global {
    /// The stored accumulator, if both halves are present
    #[must_use]
    pub fn accumulator(&self) -> Option<Accumulator> {
        match (self.bsk, self.cv_sum) {
            (Some(bsk), Some(cv_sum)) => Some(Accumulator { bsk, cv_sum }),
            _ => None,
        }
    }

    pub(crate) fn set_accumulator(&mut self, accumulator: Accumulator) {
        self.bsk = Some(accumulator.bsk);
        self.cv_sum = Some(accumulator.cv_sum);
    }

    /// Fails unless the header's version can carry shielded components
    pub(crate) fn require_sapling(&self) -> Result<()> {
        if self.tx_version < SAPLING_TX_VERSION {
            return Err(Error::UnsupportedVersion {
                version: self.tx_version,
            });
        }

        Ok(())
    }
}
