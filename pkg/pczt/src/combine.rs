//! Reconciling copies of the same PCZT produced by different parties
//!
//! Each field has a [`MergePolicy`], listed in [`GLOBAL_MERGE_RULES`], [`SPEND_MERGE_RULES`]
//! and [`OUTPUT_MERGE_RULES`]. Fields that end up in the final transaction must match, while
//! data that later parties contribute (signatures, the accumulator) is taken from the right.

use primitives::Bytes32;
use tracing::warn;

use crate::{
    accumulator::Accumulator,
    common::Zip32Derivation,
    error::{Location, Mismatch},
    sapling::{Output, Spend},
    Error, Global, Pczt, Result,
};

/// How a field is reconciled when two instances are merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Both sides must hold the same value
    MustMatch,
    /// The right side always wins
    Overwrite,
    /// The right side wins if it has a value
    OverwriteIfSet,
}

/// The [`MergePolicy`] for one field, named as it serializes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRule {
    /// Field name
    pub field: &'static str,
    /// How the field is reconciled
    pub policy: MergePolicy,
}

const fn rule(field: &'static str, policy: MergePolicy) -> MergeRule {
    MergeRule { field, policy }
}

/// Policies for [`Global`] fields
pub const GLOBAL_MERGE_RULES: &[MergeRule] = &[
    rule("tx_version", MergePolicy::MustMatch),
    rule("version_group_id", MergePolicy::MustMatch),
    rule("lock_time", MergePolicy::MustMatch),
    rule("expiry_height", MergePolicy::MustMatch),
    rule("sapling_anchor", MergePolicy::MustMatch),
    rule("value_balance", MergePolicy::Overwrite),
    rule("bsk", MergePolicy::OverwriteIfSet),
    rule("cv_sum", MergePolicy::OverwriteIfSet),
];

/// Policies for [`Spend`] fields
pub const SPEND_MERGE_RULES: &[MergeRule] = &[
    rule("cv", MergePolicy::MustMatch),
    rule("nullifier", MergePolicy::MustMatch),
    rule("rk", MergePolicy::MustMatch),
    rule("zkproof", MergePolicy::MustMatch),
    rule("spend_auth_sig", MergePolicy::OverwriteIfSet),
    rule("alpha", MergePolicy::Overwrite),
    rule("value", MergePolicy::Overwrite),
    rule("rcv", MergePolicy::Overwrite),
    rule("key", MergePolicy::Overwrite),
];

/// Policies for [`Output`] fields
pub const OUTPUT_MERGE_RULES: &[MergeRule] = &[
    rule("cv", MergePolicy::MustMatch),
    rule("cmu", MergePolicy::MustMatch),
    rule("ephemeral_key", MergePolicy::MustMatch),
    rule("enc_ciphertext", MergePolicy::MustMatch),
    rule("out_ciphertext", MergePolicy::MustMatch),
    rule("zkproof", MergePolicy::MustMatch),
    rule("value", MergePolicy::Overwrite),
    rule("rcv", MergePolicy::Overwrite),
    rule("key", MergePolicy::Overwrite),
];

trait MergeValue: PartialEq {
    fn is_set(&self) -> bool {
        true
    }
}

impl<T: MergeValue> MergeValue for Option<T> {
    fn is_set(&self) -> bool {
        self.as_ref().is_some_and(MergeValue::is_set)
    }
}

// Empty byte strings count as unset
impl MergeValue for Vec<u8> {
    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

impl MergeValue for u32 {}
impl MergeValue for u64 {}
impl MergeValue for i64 {}
impl MergeValue for Bytes32 {}
impl MergeValue for Accumulator {}
impl MergeValue for Zip32Derivation {}

struct Fields {
    location: Location,
    rules: &'static [MergeRule],
}

impl Fields {
    fn policy(&self, field: &str) -> MergePolicy {
        self.rules
            .iter()
            .find(|rule| rule.field == field)
            .map_or(MergePolicy::MustMatch, |rule| rule.policy)
    }

    fn merge<T: MergeValue>(
        &self,
        field: &'static str,
        ours: &mut T,
        theirs: T,
    ) -> Result<(), Mismatch> {
        match self.policy(field) {
            MergePolicy::MustMatch if *ours != theirs => Err(Mismatch::Field {
                location: self.location,
                field,
            }),
            MergePolicy::MustMatch => Ok(()),
            MergePolicy::Overwrite => {
                *ours = theirs;
                Ok(())
            }
            MergePolicy::OverwriteIfSet => {
                if theirs.is_set() {
                    *ours = theirs;
                }
                Ok(())
            }
        }
    }
}

impl Global {
    fn merge(&mut self, other: Self) -> Result<(), Mismatch> {
        let Self {
            tx_version,
            version_group_id,
            lock_time,
            expiry_height,
            sapling_anchor,
            value_balance,
            bsk,
            cv_sum,
        } = other;

        let f = Fields {
            location: Location::Global,
            rules: GLOBAL_MERGE_RULES,
        };

        f.merge("tx_version", &mut self.tx_version, tx_version)?;
        f.merge("version_group_id", &mut self.version_group_id, version_group_id)?;
        f.merge("lock_time", &mut self.lock_time, lock_time)?;
        f.merge("expiry_height", &mut self.expiry_height, expiry_height)?;
        f.merge("sapling_anchor", &mut self.sapling_anchor, sapling_anchor)?;
        f.merge("value_balance", &mut self.value_balance, value_balance)?;

        // `bsk` and `cv_sum` come from one proving context and only move as a pair
        let mut accumulator = self.accumulator();
        let theirs = Self {
            bsk,
            cv_sum,
            ..Self::default()
        }
        .accumulator();
        f.merge("bsk", &mut accumulator, theirs)?;
        f.merge("cv_sum", &mut accumulator, theirs)?;
        if let Some(accumulator) = accumulator {
            self.set_accumulator(accumulator);
        }

        Ok(())
    }
}

impl Spend {
    fn merge(&mut self, other: Self, index: usize) -> Result<(), Mismatch> {
        let Self {
            cv,
            nullifier,
            rk,
            zkproof,
            spend_auth_sig,
            alpha,
            value,
            rcv,
            key,
        } = other;

        let f = Fields {
            location: Location::Spend(index),
            rules: SPEND_MERGE_RULES,
        };

        f.merge("cv", &mut self.cv, cv)?;
        f.merge("nullifier", &mut self.nullifier, nullifier)?;
        f.merge("rk", &mut self.rk, rk)?;
        f.merge("zkproof", &mut self.zkproof, zkproof)?;
        f.merge("spend_auth_sig", &mut self.spend_auth_sig, spend_auth_sig)?;
        f.merge("alpha", &mut self.alpha, alpha)?;
        f.merge("value", &mut self.value, value)?;
        f.merge("rcv", &mut self.rcv, rcv)?;
        f.merge("key", &mut self.key, key)?;

        Ok(())
    }
}

impl Output {
    fn merge(&mut self, other: Self, index: usize) -> Result<(), Mismatch> {
        let Self {
            cv,
            cmu,
            ephemeral_key,
            enc_ciphertext,
            out_ciphertext,
            zkproof,
            value,
            rcv,
            key,
        } = other;

        let f = Fields {
            location: Location::Output(index),
            rules: OUTPUT_MERGE_RULES,
        };

        f.merge("cv", &mut self.cv, cv)?;
        f.merge("cmu", &mut self.cmu, cmu)?;
        f.merge("ephemeral_key", &mut self.ephemeral_key, ephemeral_key)?;
        f.merge("enc_ciphertext", &mut self.enc_ciphertext, enc_ciphertext)?;
        f.merge("out_ciphertext", &mut self.out_ciphertext, out_ciphertext)?;
        f.merge("zkproof", &mut self.zkproof, zkproof)?;
        f.merge("value", &mut self.value, value)?;
        f.merge("rcv", &mut self.rcv, rcv)?;
        f.merge("key", &mut self.key, key)?;

        Ok(())
    }
}

impl Pczt {
    /// Merge `other` into this instance, with `other` winning where fields may differ
    ///
    /// Both must come from a common ancestor: the same header, the same number of records, and
    /// matching transaction data in each record. Nothing is returned unless every field merges.
    pub fn merge(mut self, other: Self) -> Result<Self> {
        let Self {
            global,
            spends,
            outputs,
        } = other;

        self.global.merge(global)?;

        if self.spends.len() != spends.len() {
            return Err(Mismatch::SpendCount {
                ours: self.spends.len(),
                theirs: spends.len(),
            }
            .into());
        }

        if self.outputs.len() != outputs.len() {
            return Err(Mismatch::OutputCount {
                ours: self.outputs.len(),
                theirs: outputs.len(),
            }
            .into());
        }

        for (index, (ours, theirs)) in self.spends.iter_mut().zip(spends).enumerate() {
            ours.merge(theirs, index)?;
        }

        for (index, (ours, theirs)) in self.outputs.iter_mut().zip(outputs).enumerate() {
            ours.merge(theirs, index)?;
        }

        Ok(self)
    }
}

/// Merge instances left to right, so later instances win on fields that may differ
///
/// Fails with [`Error::NothingToCombine`] if there are no instances, and with
/// [`Error::PctMismatch`] if any instance does not fit the ones before it.
#[tracing::instrument(err, skip_all)]
pub fn combine(pczts: impl IntoIterator<Item = Pczt>) -> Result<Pczt> {
    let mut pczts = pczts.into_iter();
    let first = pczts.next().ok_or(Error::NothingToCombine)?;

    pczts
        .enumerate()
        .try_fold(first, |combined, (index, next)| {
            combined.merge(next).map_err(|err| {
                warn!(index = index + 1, %err, "rejected PCZT");
                err
            })
        })
}
