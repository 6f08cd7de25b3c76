use borsh::{BorshDeserialize, BorshSerialize};
use primitives::Bytes32;

use crate::{
    constants::{
        BINDING_SIG_SIZE, ENC_CIPHERTEXT_SIZE, GROTH_PROOF_SIZE, OUT_CIPHERTEXT_SIZE,
        SPEND_AUTH_SIG_SIZE,
    },
    error::Location,
    Error, Pczt, Result,
};

/// A spend as it appears in the transaction
///
/// Fields mean the same as on [`Spend`][crate::Spend], with every spend sharing one `anchor`.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
#[allow(missing_docs)]
pub struct SpendDescription {
    pub cv: Bytes32,
    pub anchor: Bytes32,
    pub nullifier: Bytes32,
    pub rk: Bytes32,
    pub zkproof: [u8; GROTH_PROOF_SIZE],
    pub spend_auth_sig: [u8; SPEND_AUTH_SIG_SIZE],
}

impl Default for SpendDescription {
    fn default() -> Self {
        Self {
            cv: Bytes32::ZERO,
            anchor: Bytes32::ZERO,
            nullifier: Bytes32::ZERO,
            rk: Bytes32::ZERO,
            zkproof: [0; GROTH_PROOF_SIZE],
            spend_auth_sig: [0; SPEND_AUTH_SIG_SIZE],
        }
    }
}

/// An output as it appears in the transaction, see [`Output`][crate::Output]
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
#[allow(missing_docs)]
pub struct OutputDescription {
    pub cv: Bytes32,
    pub cmu: Bytes32,
    pub ephemeral_key: Bytes32,
    pub enc_ciphertext: [u8; ENC_CIPHERTEXT_SIZE],
    pub out_ciphertext: [u8; OUT_CIPHERTEXT_SIZE],
    pub zkproof: [u8; GROTH_PROOF_SIZE],
}

impl Default for OutputDescription {
    fn default() -> Self {
        Self {
            cv: Bytes32::ZERO,
            cmu: Bytes32::ZERO,
            ephemeral_key: Bytes32::ZERO,
            enc_ciphertext: [0; ENC_CIPHERTEXT_SIZE],
            out_ciphertext: [0; OUT_CIPHERTEXT_SIZE],
            zkproof: [0; GROTH_PROOF_SIZE],
        }
    }
}

/// A finished, overwintered transaction with only shielded components
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Transaction {
    /// Format version, without the overwintered flag
    pub version: u32,
    /// Version group
    pub version_group_id: u32,
    /// Earliest height or time the transaction may be mined
    pub lock_time: u32,
    /// Last height the transaction may be mined at
    pub expiry_height: u32,
    /// Net value leaving the shielded pool, which is the fee
    pub value_balance: i64,
    /// Spends, in order
    pub shielded_spends: Vec<SpendDescription>,
    /// Outputs, in order
    pub shielded_outputs: Vec<OutputDescription>,
    /// Signature over the sighash with `bsk`
    pub binding_sig: [u8; BINDING_SIG_SIZE],
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            version: 0,
            version_group_id: 0,
            lock_time: 0,
            expiry_height: 0,
            value_balance: 0,
            shielded_spends: Vec::new(),
            shielded_outputs: Vec::new(),
            binding_sig: [0; BINDING_SIG_SIZE],
        }
    }
}

impl Transaction {
    /// Binary form
    pub fn to_bytes(&self) -> Vec<u8> {
        #[allow(clippy::expect_used)]
        borsh::to_vec(self).expect("writing to a Vec never fails")
    }

    /// Hex of [`Transaction::to_bytes`]
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

fn fixed<const N: usize>(bytes: &[u8], location: Location, field: &'static str) -> Result<[u8; N]> {
    <[u8; N]>::try_from(bytes).map_err(|_| Error::MalformedField {
        location,
        field,
        expected: N,
        actual: bytes.len(),
    })
}

impl Pczt {
    /// Copy the records into transaction layout
    ///
    /// Every fixed-size field must have exactly its required length. Unsigned spends get an
    /// all-zero signature and the binding signature is left zeroed.
    pub(crate) fn project(&self) -> Result<Transaction> {
        let global = &self.global;

        let anchor = match (global.sapling_anchor, self.spends.is_empty()) {
            (Some(anchor), _) => anchor,
            (None, true) => Bytes32::ZERO,
            (None, false) => return Err(Error::AnchorNotSet),
        };

        let shielded_spends = self
            .spends
            .iter()
            .enumerate()
            .map(|(index, spend)| {
                let location = Location::Spend(index);
                let spend_auth_sig = match spend.signature() {
                    Some(sig) => fixed(sig, location, "spend_auth_sig")?,
                    None => [0; SPEND_AUTH_SIG_SIZE],
                };

                Ok(SpendDescription {
                    cv: spend.cv,
                    anchor,
                    nullifier: spend.nullifier,
                    rk: spend.rk,
                    zkproof: fixed(&spend.zkproof, location, "zkproof")?,
                    spend_auth_sig,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let shielded_outputs = self
            .outputs
            .iter()
            .enumerate()
            .map(|(index, output)| {
                let location = Location::Output(index);

                Ok(OutputDescription {
                    cv: output.cv,
                    cmu: output.cmu,
                    ephemeral_key: output.ephemeral_key,
                    enc_ciphertext: fixed(&output.enc_ciphertext, location, "enc_ciphertext")?,
                    out_ciphertext: fixed(&output.out_ciphertext, location, "out_ciphertext")?,
                    zkproof: fixed(&output.zkproof, location, "zkproof")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Transaction {
            version: global.tx_version,
            version_group_id: global.version_group_id,
            lock_time: global.lock_time,
            expiry_height: global.expiry_height,
            value_balance: global.value_balance,
            shielded_spends,
            shielded_outputs,
            binding_sig: [0; BINDING_SIG_SIZE],
        })
    }
}
