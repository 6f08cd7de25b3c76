//! Sizes and consensus constants for Sapling-era transactions

/// Length of a Groth16 proof, as used by both spends and outputs
pub const GROTH_PROOF_SIZE: usize = 192;

/// Length of the note ciphertext carried by an output
pub const ENC_CIPHERTEXT_SIZE: usize = 580;

/// Length of the outgoing-viewing ciphertext carried by an output
pub const OUT_CIPHERTEXT_SIZE: usize = 80;

/// Length of a spend authorization signature
pub const SPEND_AUTH_SIG_SIZE: usize = 64;

/// Length of the transaction binding signature
pub const BINDING_SIG_SIZE: usize = 64;

/// Length of a memo field
pub const MEMO_SIZE: usize = 512;

/// The first transaction version that can carry shielded spends and outputs
pub const SAPLING_TX_VERSION: u32 = 4;

/// Version group id for [`SAPLING_TX_VERSION`] transactions
pub const SAPLING_VERSION_GROUP_ID: u32 = 0x892F_2085;

/// Overwinter transaction version
pub const OVERWINTER_TX_VERSION: u32 = 3;

/// Version group id for [`OVERWINTER_TX_VERSION`] transactions
pub const OVERWINTER_VERSION_GROUP_ID: u32 = 0x03C4_8270;

/// Version used before any network upgrade is active
pub const SPROUT_TX_VERSION: u32 = 1;

/// Set in the serialized header of every overwintered transaction
pub const OVERWINTERED_FLAG: u32 = 1 << 31;

/// Expiry heights must be strictly below this value
pub const TX_EXPIRY_HEIGHT_THRESHOLD: u32 = 500_000_000;

/// Blocks until expiry for transactions created before Blossom
pub const PRE_BLOSSOM_EXPIRY_DELTA: u32 = 20;

/// Blocks until expiry for transactions created once Blossom is active
pub const POST_BLOSSOM_EXPIRY_DELTA: u32 = 40;

/// The only hash type finalized transactions are signed with
pub const SIGHASH_ALL: u32 = 1;
