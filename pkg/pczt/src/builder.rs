use primitives::Bytes32;
use tracing::debug;

use crate::{
    common::Zip32Derivation,
    constants::SPEND_AUTH_SIG_SIZE,
    error::Location,
    prover::{OutputProofInputs, Prover, SpendProofInputs},
    sapling::{
        Memo, MerkleWitness, Note, OutgoingViewingKey, Output, PaymentAddress, ProofGenerationKey,
        Spend,
    },
    Error, Pczt, Result,
};

impl Pczt {
    /// Set the anchor that every spend must be proven against
    #[tracing::instrument(err, skip(self))]
    pub fn set_sapling_anchor(&mut self, anchor: Bytes32) -> Result<()> {
        self.global.require_sapling()?;
        self.global.sapling_anchor = Some(anchor);
        Ok(())
    }

    /// Prove and append a spend of `note`
    ///
    /// The witness must lead to the anchor set with [`Pczt::set_sapling_anchor`]. If anything
    /// fails, the instance is unchanged.
    #[tracing::instrument(err, skip_all, fields(value = note.value, position = witness.position))]
    pub fn add_sapling_spend<P: Prover>(
        &mut self,
        prover: &P,
        key: Zip32Derivation,
        proof_generation_key: &ProofGenerationKey,
        note: &Note,
        witness: &MerkleWitness,
    ) -> Result<()> {
        self.global.require_sapling()?;

        let anchor = self.global.sapling_anchor.ok_or(Error::AnchorNotSet)?;
        if witness.root != anchor {
            return Err(Error::AnchorMismatch {
                anchor,
                witness: witness.root,
            });
        }

        if prover.note_commitment(note).is_none() {
            return Err(Error::InvalidNote);
        }
        let nullifier = prover
            .nullifier(proof_generation_key, note, witness.position)
            .ok_or(Error::InvalidNote)?;

        let value_balance = i64::try_from(note.value)
            .ok()
            .and_then(|value| self.global.value_balance.checked_add(value))
            .ok_or(Error::BalanceOverflow)?;

        let alpha = prover.random_scalar();

        let mut guard = self.proving_context(prover)?;
        let proof = prover
            .spend_proof(
                guard.context_mut(),
                &SpendProofInputs {
                    proof_generation_key,
                    note,
                    alpha,
                    anchor,
                    witness,
                },
            )
            .map_err(Error::ProofFailed)?;
        let accumulator = guard.accumulator();
        drop(guard);

        self.spends.push(Spend {
            cv: proof.cv,
            nullifier,
            rk: proof.rk,
            zkproof: proof.zkproof,
            spend_auth_sig: None,
            alpha,
            value: note.value,
            rcv: proof.rcv,
            key,
        });
        self.global.value_balance = value_balance;
        self.global.set_accumulator(accumulator);

        debug!(index = self.spends.len() - 1, value_balance, "added sapling spend");

        Ok(())
    }

    /// Prove and append an output paying `value` to `to`
    #[tracing::instrument(err, skip(self, prover, key, ovk, memo))]
    pub fn add_sapling_output<P: Prover>(
        &mut self,
        prover: &P,
        key: Zip32Derivation,
        ovk: &OutgoingViewingKey,
        to: PaymentAddress,
        value: u64,
        memo: &Memo,
    ) -> Result<()> {
        self.global.require_sapling()?;

        let value_balance = i64::try_from(value)
            .ok()
            .and_then(|value| self.global.value_balance.checked_sub(value))
            .ok_or(Error::BalanceOverflow)?;

        let note = Note::new(to, value, prover.random_scalar());

        let mut guard = self.proving_context(prover)?;
        let proof = prover
            .output_proof(
                guard.context_mut(),
                &OutputProofInputs {
                    ovk,
                    note: &note,
                    memo,
                },
            )
            .map_err(Error::ProofFailed)?;
        let accumulator = guard.accumulator();
        drop(guard);

        self.outputs.push(Output {
            cv: proof.cv,
            cmu: proof.cmu,
            ephemeral_key: proof.ephemeral_key,
            enc_ciphertext: proof.enc_ciphertext,
            out_ciphertext: proof.out_ciphertext,
            zkproof: proof.zkproof,
            value,
            rcv: proof.rcv,
            key,
        });
        self.global.value_balance = value_balance;
        self.global.set_accumulator(accumulator);

        debug!(index = self.outputs.len() - 1, value_balance, "added sapling output");

        Ok(())
    }

    /// Attach the spend authorization signature for the spend at `index`
    pub fn set_spend_auth_sig(&mut self, index: usize, sig: Vec<u8>) -> Result<()> {
        let len = self.spends.len();
        let spend = self
            .spends
            .get_mut(index)
            .ok_or(Error::SpendIndexOutOfRange { index, len })?;

        if sig.len() != SPEND_AUTH_SIG_SIZE {
            return Err(Error::MalformedField {
                location: Location::Spend(index),
                field: "spend_auth_sig",
                expected: SPEND_AUTH_SIG_SIZE,
                actual: sig.len(),
            });
        }

        spend.spend_auth_sig = Some(sig);
        Ok(())
    }
}
