//! Transaction signature digest for transactions without transparent parts
//!
//! Follows ZIP 243 (and ZIP 143 for pre-Sapling versions), signing as `NOT_AN_INPUT` with
//! `SIGHASH_ALL` and an empty script code.

use blake2b_simd::{Params, State};
use primitives::{BlockHeight, Bytes32};

use crate::{
    consensus::{BranchId, ConsensusParams},
    constants::{OVERWINTERED_FLAG, SAPLING_TX_VERSION, SIGHASH_ALL},
    Pczt, Result, Transaction,
};

const SIGHASH_PERSONALIZATION_PREFIX: &[u8; 12] = b"ZcashSigHash";
const PREVOUTS_PERSONALIZATION: &[u8; 16] = b"ZcashPrevoutHash";
const SEQUENCE_PERSONALIZATION: &[u8; 16] = b"ZcashSequencHash";
const OUTPUTS_PERSONALIZATION: &[u8; 16] = b"ZcashOutputsHash";
const SHIELDED_SPENDS_PERSONALIZATION: &[u8; 16] = b"ZcashSSpendsHash";
const SHIELDED_OUTPUTS_PERSONALIZATION: &[u8; 16] = b"ZcashSOutputHash";

fn state(personal: &[u8]) -> State {
    Params::new().hash_length(32).personal(personal).to_state()
}

fn finish(state: &State) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(state.finalize().as_bytes());
    out
}

/// Hash of an empty transparent list
fn empty(personal: &[u8]) -> [u8; 32] {
    finish(&state(personal))
}

fn shielded_spends(tx: &Transaction) -> [u8; 32] {
    if tx.shielded_spends.is_empty() {
        return [0; 32];
    }

    let mut hash = state(SHIELDED_SPENDS_PERSONALIZATION);
    for spend in &tx.shielded_spends {
        hash.update(spend.cv.inner());
        hash.update(spend.anchor.inner());
        hash.update(spend.nullifier.inner());
        hash.update(spend.rk.inner());
        hash.update(&spend.zkproof);
    }
    finish(&hash)
}

fn shielded_outputs(tx: &Transaction) -> [u8; 32] {
    if tx.shielded_outputs.is_empty() {
        return [0; 32];
    }

    let mut hash = state(SHIELDED_OUTPUTS_PERSONALIZATION);
    for output in &tx.shielded_outputs {
        hash.update(output.cv.inner());
        hash.update(output.cmu.inner());
        hash.update(output.ephemeral_key.inner());
        hash.update(&output.enc_ciphertext);
        hash.update(&output.out_ciphertext);
        hash.update(&output.zkproof);
    }
    finish(&hash)
}

impl Transaction {
    /// The digest spend authorization and binding signatures are made over
    ///
    /// Spend authorization signatures and the binding signature are not part of the digest.
    pub fn sighash(&self, branch_id: BranchId) -> Bytes32 {
        let mut personal = [0u8; 16];
        personal[..12].copy_from_slice(SIGHASH_PERSONALIZATION_PREFIX);
        personal[12..].copy_from_slice(&u32::from(branch_id).to_le_bytes());

        let mut hash = state(&personal);

        hash.update(&(self.version | OVERWINTERED_FLAG).to_le_bytes());
        hash.update(&self.version_group_id.to_le_bytes());
        hash.update(&empty(PREVOUTS_PERSONALIZATION));
        hash.update(&empty(SEQUENCE_PERSONALIZATION));
        hash.update(&empty(OUTPUTS_PERSONALIZATION));
        // no joinsplits
        hash.update(&[0; 32]);

        let sapling = self.version >= SAPLING_TX_VERSION;
        if sapling {
            hash.update(&shielded_spends(self));
            hash.update(&shielded_outputs(self));
        }

        hash.update(&self.lock_time.to_le_bytes());
        hash.update(&self.expiry_height.to_le_bytes());

        if sapling {
            hash.update(&self.value_balance.to_le_bytes());
        }

        hash.update(&SIGHASH_ALL.to_le_bytes());

        Bytes32(finish(&hash))
    }
}

impl Pczt {
    /// The digest spend authority holders sign, for a transaction mined at `height`
    ///
    /// This is the same digest [`Pczt::finalize`] binds, so it only changes if records are added
    /// or the header changes.
    pub fn sighash(&self, height: BlockHeight, params: &ConsensusParams) -> Result<Bytes32> {
        let tx = self.project()?;
        Ok(tx.sighash(params.branch_id(height)))
    }
}
