//! The proving engine boundary
//!
//! Proof generation, value commitment arithmetic and binding signatures live behind [`Prover`].
//! This crate only threads the engine's context through builder and finalizer calls.

use primitives::Bytes32;

use crate::{
    accumulator::Accumulator,
    sapling::{Memo, MerkleWitness, Note, OutgoingViewingKey, ProofGenerationKey},
};

/// Failures reported by a [`Prover`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProverError {
    /// The spend circuit rejected its inputs
    #[error("spend proof could not be created")]
    SpendProof,

    /// The output circuit or note encryption failed
    #[error("output could not be created")]
    OutputProof,

    /// Binding signature requested for a balance the commitments do not match
    #[error("value commitments do not balance")]
    Unbalanced,

    /// Any other engine failure
    #[error("{0}")]
    Other(String),
}

/// Private inputs to a spend proof
#[derive(Debug, Clone, Copy)]
pub struct SpendProofInputs<'a> {
    /// Key material of the note's owner
    pub proof_generation_key: &'a ProofGenerationKey,
    /// The note being spent
    pub note: &'a Note,
    /// Randomizer for `rk`
    pub alpha: Bytes32,
    /// Root the witness must lead to
    pub anchor: Bytes32,
    /// Path from the note commitment to `anchor`
    pub witness: &'a MerkleWitness,
}

/// What a spend proof contributes to its [`Spend`][crate::Spend] record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendProof {
    /// Value commitment
    pub cv: Bytes32,
    /// Randomized verification key
    pub rk: Bytes32,
    /// Groth16 proof bytes
    pub zkproof: Vec<u8>,
    /// Trapdoor used for `cv`
    pub rcv: Bytes32,
}

/// Inputs to an output proof and note encryption
#[derive(Debug, Clone, Copy)]
pub struct OutputProofInputs<'a> {
    /// Sender's outgoing viewing key, used for `out_ciphertext`
    pub ovk: &'a OutgoingViewingKey,
    /// The note being created
    pub note: &'a Note,
    /// Memo encrypted to the recipient
    pub memo: &'a Memo,
}

/// What an output proof contributes to its [`Output`][crate::Output] record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputProof {
    /// Value commitment
    pub cv: Bytes32,
    /// Note commitment
    pub cmu: Bytes32,
    /// Ephemeral public key for note decryption
    pub ephemeral_key: Bytes32,
    /// Note plaintext encrypted to the recipient
    pub enc_ciphertext: Vec<u8>,
    /// Recovery data encrypted to the sender
    pub out_ciphertext: Vec<u8>,
    /// Groth16 proof bytes
    pub zkproof: Vec<u8>,
    /// Trapdoor used for `cv`
    pub rcv: Bytes32,
}

/// A Sapling proving engine
///
/// Every context handed out by [`Prover::init_context`] or
/// [`Prover::init_context_from_accumulator`] is given back through [`Prover::release`] exactly
/// once. Callers in this crate go through
/// [`ProvingContextGuard`][crate::accumulator::ProvingContextGuard], which does this on drop.
pub trait Prover {
    /// Running `bsk`/`cv_sum` state for one transaction
    type Context;

    /// A context with nothing accumulated
    fn init_context(&self) -> Self::Context;

    /// Restore a context from a stored accumulator, or `None` if the engine rejects it
    fn init_context_from_accumulator(&self, accumulator: &Accumulator) -> Option<Self::Context>;

    /// A uniformly random scalar, used for `alpha` and note trapdoors
    fn random_scalar(&self) -> Bytes32 {
        Bytes32::random(&mut rand::rngs::OsRng)
    }

    /// Prove a spend and fold its value commitment into `ctx`
    fn spend_proof(
        &self,
        ctx: &mut Self::Context,
        inputs: &SpendProofInputs<'_>,
    ) -> Result<SpendProof, ProverError>;

    /// Prove an output, encrypt its note, and fold its value commitment into `ctx`
    fn output_proof(
        &self,
        ctx: &mut Self::Context,
        inputs: &OutputProofInputs<'_>,
    ) -> Result<OutputProof, ProverError>;

    /// Sign `sighash` with the accumulated `bsk`, checking it against `value_balance`
    fn binding_signature(
        &self,
        ctx: &mut Self::Context,
        value_balance: i64,
        sighash: &Bytes32,
    ) -> Result<[u8; 64], ProverError>;

    /// The `bsk`/`cv_sum` state of `ctx`, for storing in the header
    fn accumulator(&self, ctx: &Self::Context) -> Accumulator;

    /// Give back a context
    fn release(&self, ctx: Self::Context) {
        drop(ctx);
    }

    /// The note commitment `cmu`, or `None` if the note is not valid
    fn note_commitment(&self, note: &Note) -> Option<Bytes32>;

    /// The nullifier of `note` at `position`, or `None` if it cannot be derived
    fn nullifier(&self, key: &ProofGenerationKey, note: &Note, position: u64) -> Option<Bytes32>;
}
