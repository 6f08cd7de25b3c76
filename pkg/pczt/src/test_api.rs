//! A deterministic proving engine and fixtures for tests
//!
//! [`MockProver`] keeps the homomorphic structure of real value commitments using wrapping
//! 256-bit integer arithmetic: `cv = value * VALUE_BASE + rcv`. Spends add to `bsk` and `cv_sum`,
//! outputs subtract, so a binding signature is only produced when
//! `cv_sum == value_balance * VALUE_BASE + bsk`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use ethnum::U256;
use parking_lot::Mutex;
use primitives::Bytes32;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::{
    accumulator::Accumulator,
    common::{Zip32Derivation, HARDENED},
    constants::{ENC_CIPHERTEXT_SIZE, GROTH_PROOF_SIZE, OUT_CIPHERTEXT_SIZE},
    prover::{OutputProof, OutputProofInputs, Prover, ProverError, SpendProof, SpendProofInputs},
    sapling::{MerkleWitness, Note, OutgoingViewingKey, PaymentAddress, ProofGenerationKey},
};

/// Generator for the value component of a commitment
pub const VALUE_BASE: U256 = U256::from_words(
    0x9e37_79b9_7f4a_7c15_f39c_c060_5ced_c834,
    0x1082_276b_f3a2_7251_f86c_6a11_d0c1_8e95,
);

/// A `bsk` the mock engine refuses to resume from
pub const INVALID_BSK: Bytes32 = Bytes32([0xff; 32]);

/// The anchor used by the fixtures
pub const ANCHOR: Bytes32 = Bytes32([0xaa; 32]);

fn to_u256(bytes: &Bytes32) -> U256 {
    U256::from_be_bytes(bytes.0)
}

fn to_bytes(value: U256) -> Bytes32 {
    Bytes32(value.to_be_bytes())
}

fn signed(value: i64) -> U256 {
    let magnitude = U256::from(value.unsigned_abs());
    if value < 0 {
        U256::ZERO.wrapping_sub(magnitude)
    } else {
        magnitude
    }
}

fn hash(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// `len` pseudo-random bytes derived from `seed`
fn expand(seed: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + 32);
    let mut counter = 0u32;
    while out.len() < len {
        out.extend_from_slice(&hash(&[seed, &counter.to_le_bytes()]));
        counter += 1;
    }
    out.truncate(len);
    out
}

/// The signature [`MockProver`] produces for `bsk` over `sighash`
pub fn binding_signature_for(bsk: &Bytes32, sighash: &Bytes32) -> [u8; 64] {
    let mut sig = [0u8; 64];
    sig[..32].copy_from_slice(&hash(&[b"binding", bsk.inner(), sighash.inner()]));
    sig[32..].copy_from_slice(&hash(&[b"binding", sighash.inner(), bsk.inner()]));
    sig
}

/// [`MockProver`]'s running sums
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockContext {
    bsk: U256,
    cv_sum: U256,
}

/// A proving engine with no cryptographic strength, for tests
#[derive(Debug)]
pub struct MockProver {
    rng: Mutex<ChaCha8Rng>,
    acquired: AtomicUsize,
    released: AtomicUsize,
    fail_spend_proofs: AtomicBool,
    fail_output_proofs: AtomicBool,
}

impl Default for MockProver {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MockProver {
    /// An engine whose random scalars are seeded with `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            acquired: AtomicUsize::new(0),
            released: AtomicUsize::new(0),
            fail_spend_proofs: AtomicBool::new(false),
            fail_output_proofs: AtomicBool::new(false),
        }
    }

    /// Contexts handed out so far
    pub fn contexts_acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Contexts given back so far
    pub fn contexts_released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Make subsequent spend proofs fail, or succeed again
    pub fn fail_spend_proofs(&self, fail: bool) {
        self.fail_spend_proofs.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent output proofs fail, or succeed again
    pub fn fail_output_proofs(&self, fail: bool) {
        self.fail_output_proofs.store(fail, Ordering::SeqCst);
    }

    /// The value commitment for `value` with trapdoor `rcv`
    pub fn value_commitment(value: u64, rcv: &Bytes32) -> Bytes32 {
        to_bytes(
            U256::from(value)
                .wrapping_mul(VALUE_BASE)
                .wrapping_add(to_u256(rcv)),
        )
    }

    fn acquire(&self, context: MockContext) -> MockContext {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        context
    }
}

impl Prover for MockProver {
    type Context = MockContext;

    fn init_context(&self) -> Self::Context {
        self.acquire(MockContext {
            bsk: U256::ZERO,
            cv_sum: U256::ZERO,
        })
    }

    fn init_context_from_accumulator(&self, accumulator: &Accumulator) -> Option<Self::Context> {
        if accumulator.bsk == INVALID_BSK {
            return None;
        }

        Some(self.acquire(MockContext {
            bsk: to_u256(&accumulator.bsk),
            cv_sum: to_u256(&accumulator.cv_sum),
        }))
    }

    fn random_scalar(&self) -> Bytes32 {
        Bytes32::random(&mut *self.rng.lock())
    }

    fn spend_proof(
        &self,
        ctx: &mut Self::Context,
        inputs: &SpendProofInputs<'_>,
    ) -> Result<SpendProof, ProverError> {
        if self.fail_spend_proofs.load(Ordering::SeqCst) {
            return Err(ProverError::SpendProof);
        }

        let rcv = self.random_scalar();
        let cv = Self::value_commitment(inputs.note.value, &rcv);
        let rk = Bytes32(hash(&[
            b"rk",
            inputs.proof_generation_key.ak.inner(),
            inputs.alpha.inner(),
        ]));
        let zkproof = expand(
            &hash(&[b"spend", cv.inner(), inputs.anchor.inner(), inputs.witness.root.inner()]),
            GROTH_PROOF_SIZE,
        );

        ctx.bsk = ctx.bsk.wrapping_add(to_u256(&rcv));
        ctx.cv_sum = ctx.cv_sum.wrapping_add(to_u256(&cv));

        Ok(SpendProof { cv, rk, zkproof, rcv })
    }

    fn output_proof(
        &self,
        ctx: &mut Self::Context,
        inputs: &OutputProofInputs<'_>,
    ) -> Result<OutputProof, ProverError> {
        if self.fail_output_proofs.load(Ordering::SeqCst) {
            return Err(ProverError::OutputProof);
        }

        let cmu = self
            .note_commitment(inputs.note)
            .ok_or(ProverError::OutputProof)?;
        let rcv = self.random_scalar();
        let cv = Self::value_commitment(inputs.note.value, &rcv);
        let ephemeral_key = self.random_scalar();

        let mut enc_ciphertext = inputs.memo.as_bytes().to_vec();
        enc_ciphertext.extend(expand(
            &hash(&[b"enc", cmu.inner(), ephemeral_key.inner()]),
            ENC_CIPHERTEXT_SIZE - enc_ciphertext.len(),
        ));
        let out_ciphertext = expand(
            &hash(&[b"out", inputs.ovk.0.inner(), cv.inner(), cmu.inner()]),
            OUT_CIPHERTEXT_SIZE,
        );
        let zkproof = expand(&hash(&[b"output", cv.inner(), cmu.inner()]), GROTH_PROOF_SIZE);

        ctx.bsk = ctx.bsk.wrapping_sub(to_u256(&rcv));
        ctx.cv_sum = ctx.cv_sum.wrapping_sub(to_u256(&cv));

        Ok(OutputProof {
            cv,
            cmu,
            ephemeral_key,
            enc_ciphertext,
            out_ciphertext,
            zkproof,
            rcv,
        })
    }

    fn binding_signature(
        &self,
        ctx: &mut Self::Context,
        value_balance: i64,
        sighash: &Bytes32,
    ) -> Result<[u8; 64], ProverError> {
        let expected = signed(value_balance)
            .wrapping_mul(VALUE_BASE)
            .wrapping_add(ctx.bsk);

        if expected != ctx.cv_sum {
            return Err(ProverError::Unbalanced);
        }

        Ok(binding_signature_for(&to_bytes(ctx.bsk), sighash))
    }

    fn accumulator(&self, ctx: &Self::Context) -> Accumulator {
        Accumulator {
            bsk: to_bytes(ctx.bsk),
            cv_sum: to_bytes(ctx.cv_sum),
        }
    }

    fn release(&self, _ctx: Self::Context) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }

    fn note_commitment(&self, note: &Note) -> Option<Bytes32> {
        if note.pk_d.is_zero() {
            return None;
        }

        Some(Bytes32(hash(&[
            b"cmu",
            &note.diversifier,
            note.pk_d.inner(),
            &note.value.to_le_bytes(),
            note.rcm.inner(),
        ])))
    }

    fn nullifier(&self, key: &ProofGenerationKey, note: &Note, position: u64) -> Option<Bytes32> {
        if key.nsk.is_zero() {
            return None;
        }

        let cmu = self.note_commitment(note)?;
        Some(Bytes32(hash(&[
            b"nf",
            key.ak.inner(),
            key.nsk.inner(),
            cmu.inner(),
            &position.to_le_bytes(),
        ])))
    }
}

/// The address every fixture note belongs to
pub fn address() -> PaymentAddress {
    PaymentAddress {
        diversifier: [1; 11],
        pk_d: Bytes32([2; 32]),
    }
}

/// Key material for [`address`]
pub fn proof_generation_key() -> ProofGenerationKey {
    ProofGenerationKey {
        ak: Bytes32([3; 32]),
        nsk: Bytes32([4; 32]),
    }
}

/// Outgoing viewing key for [`address`]
pub fn ovk() -> OutgoingViewingKey {
    OutgoingViewingKey(Bytes32([5; 32]))
}

/// Provenance for `m/32'/133'/0'`
pub fn key() -> Zip32Derivation {
    Zip32Derivation::new(
        Bytes32([6; 32]),
        vec![32 | HARDENED, 133 | HARDENED, HARDENED],
    )
}

/// A note of `value` to [`address`]
pub fn note(value: u64) -> Note {
    Note::new(address(), value, Bytes32::from_u64(value))
}

/// A witness for `position` leading to `root`
pub fn witness(root: Bytes32, position: u64) -> MerkleWitness {
    MerkleWitness {
        root,
        position,
        path: vec![Bytes32::from_u64(position); 4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_wraps_negative_values() {
        assert_eq!(signed(5).wrapping_add(signed(-5)), U256::ZERO);
        assert_eq!(signed(i64::MIN).wrapping_add(signed(i64::MAX)), signed(-1));
    }

    #[test]
    fn expand_has_exact_length() {
        assert_eq!(expand(b"seed", 0).len(), 0);
        assert_eq!(expand(b"seed", 80).len(), 80);
        assert_eq!(expand(b"seed", 580).len(), 580);
    }

    #[test]
    fn commitments_balance() {
        let prover = MockProver::default();
        let mut ctx = prover.init_context();

        let note = note(70);
        let witness = witness(ANCHOR, 0);
        let pgk = proof_generation_key();
        prover
            .spend_proof(
                &mut ctx,
                &SpendProofInputs {
                    proof_generation_key: &pgk,
                    note: &note,
                    alpha: Bytes32::ZERO,
                    anchor: ANCHOR,
                    witness: &witness,
                },
            )
            .unwrap();

        let out = Note::new(address(), 30, Bytes32::from_u64(1));
        prover
            .output_proof(
                &mut ctx,
                &OutputProofInputs {
                    ovk: &ovk(),
                    note: &out,
                    memo: &crate::sapling::Memo::default(),
                },
            )
            .unwrap();

        assert!(prover.binding_signature(&mut ctx, 40, &Bytes32::ZERO).is_ok());
        assert_eq!(
            prover.binding_signature(&mut ctx, 41, &Bytes32::ZERO),
            Err(ProverError::Unbalanced)
        );

        prover.release(ctx);
        assert_eq!(prover.contexts_released(), 1);
    }
}
