//! Partially created transactions (PCZTs) for Sapling-era shielded transactions
//!
//! A [`Pczt`] is a transaction under construction that several parties can pass around, each
//! adding what only they can add:
//!
//!  - a funding wallet appends spends and outputs ([`Pczt::add_sapling_spend`],
//!    [`Pczt::add_sapling_output`]), which needs a proving engine ([`Prover`]) but not spend
//!    authority
//!  - key holders fill in spend authorization signatures over [`Pczt::sighash`]
//!  - partial copies are reconciled with [`combine`]
//!  - a finalizer produces the binding signature and the broadcastable [`Transaction`]
//!    ([`Pczt::finalize`])
//!
//! Instances move between parties as base64 text ([`Pczt::serialize`], [`Pczt::parse`]).

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

mod accumulator;
mod builder;
mod combine;
pub mod common;
pub mod consensus;
pub mod constants;
mod encoding;
mod error;
mod finalize;
mod global;
pub mod prover;
pub mod sapling;
mod sighash;
mod transaction;

#[cfg(any(test, feature = "proptest"))]
mod proptest;

#[cfg(any(test, feature = "test-api"))]
pub mod test_api;

pub use accumulator::{Accumulator, ProvingContextGuard};
pub use combine::{
    combine, MergePolicy, MergeRule, GLOBAL_MERGE_RULES, OUTPUT_MERGE_RULES, SPEND_MERGE_RULES,
};
pub use common::Zip32Derivation;
pub use consensus::{BranchId, ConsensusParams, NetworkUpgrade};
pub use encoding::PcztFormat;
pub use error::{Error, InvalidPct, Location, Mismatch, Result};
pub use global::Global;
pub use prover::Prover;
pub use sapling::{Output, Spend};
pub use transaction::{OutputDescription, SpendDescription, Transaction};

/// A partially created transaction
///
/// Holds one [`Global`] header and ordered lists of [`Spend`]s and [`Output`]s. Record order is
/// significant and is kept across merges.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct Pczt {
    pub(crate) global: Global,
    pub(crate) spends: Vec<Spend>,
    pub(crate) outputs: Vec<Output>,
}

impl Pczt {
    /// The header
    pub fn global(&self) -> &Global {
        &self.global
    }

    /// Spends, in transaction order
    pub fn spends(&self) -> &[Spend] {
        &self.spends
    }

    /// Outputs, in transaction order
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Seed the header from an existing transaction
    ///
    /// Copies version, version group, lock time, expiry and value balance, and takes the anchor
    /// of the first shielded spend if there is one. No records are copied.
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            global: Global {
                tx_version: tx.version,
                version_group_id: tx.version_group_id,
                lock_time: tx.lock_time,
                expiry_height: tx.expiry_height,
                value_balance: tx.value_balance,
                sapling_anchor: tx.shielded_spends.first().map(|spend| spend.anchor),
                bsk: None,
                cv_sum: None,
            },
            spends: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// The miner fee, which is the value balance since there are no transparent components
    pub fn fee(&self) -> i64 {
        self.global.value_balance
    }
}

#[cfg(test)]
mod tests {
    use primitives::Bytes32;

    use crate::transaction::SpendDescription;

    use super::*;

    #[test]
    fn from_transaction_takes_header_and_first_anchor() {
        let first = SpendDescription {
            anchor: Bytes32::from_u64(11),
            ..SpendDescription::default()
        };
        let second = SpendDescription {
            anchor: Bytes32::from_u64(12),
            ..SpendDescription::default()
        };

        let tx = Transaction {
            version: 4,
            version_group_id: 0x892F_2085,
            lock_time: 7,
            expiry_height: 100,
            value_balance: 1234,
            shielded_spends: vec![first, second],
            ..Transaction::default()
        };

        let pczt = Pczt::from_transaction(&tx);

        assert_eq!(pczt.global.tx_version, 4);
        assert_eq!(pczt.global.version_group_id, 0x892F_2085);
        assert_eq!(pczt.global.lock_time, 7);
        assert_eq!(pczt.global.expiry_height, 100);
        assert_eq!(pczt.fee(), 1234);
        assert_eq!(pczt.global.sapling_anchor, Some(Bytes32::from_u64(11)));
        assert_eq!(pczt.global.accumulator(), None);
        assert!(pczt.spends.is_empty());
        assert!(pczt.outputs.is_empty());
    }

    #[test]
    fn from_transaction_without_spends_has_no_anchor() {
        let pczt = Pczt::from_transaction(&Transaction::default());
        assert_eq!(pczt.global.sapling_anchor, None);
    }
}
