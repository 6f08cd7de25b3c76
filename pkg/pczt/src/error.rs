use std::fmt;

use primitives::Bytes32;

use crate::prover::ProverError;

/// Where in a [`Pczt`][crate::Pczt] a field lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// The global header
    Global,
    /// The spend at this index
    Spend(usize),
    /// The output at this index
    Output(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Spend(index) => write!(f, "spend {index}"),
            Self::Output(index) => write!(f, "output {index}"),
        }
    }
}

/// The reason two instances could not be combined
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Mismatch {
    /// A field that must agree had different values
    #[error("{location} field `{field}` differs")]
    Field {
        /// The record holding the field
        location: Location,
        /// The field name
        field: &'static str,
    },

    /// The instances hold a different number of spends
    #[error("spend count differs: {ours} != {theirs}")]
    SpendCount {
        /// Spends in the accumulated instance
        ours: usize,
        /// Spends in the incoming instance
        theirs: usize,
    },

    /// The instances hold a different number of outputs
    #[error("output count differs: {ours} != {theirs}")]
    OutputCount {
        /// Outputs in the accumulated instance
        ours: usize,
        /// Outputs in the incoming instance
        theirs: usize,
    },
}

/// Why an encoded or in-memory instance is not a valid PCZT
#[derive(Debug, thiserror::Error)]
pub enum InvalidPct {
    /// The text form was not valid base64
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The binary form did not match the schema
    #[error("invalid encoding: {0}")]
    Encoding(std::io::Error),

    /// Records exist but `bsk` or `cv_sum` is missing
    #[error("records exist but bsk or cv_sum is missing")]
    AccumulatorMissing,

    /// The proving engine refused the stored `bsk`/`cv_sum`
    #[error("invalid bsk or cv_sum")]
    AccumulatorRejected,
}

/// Everything building, combining or finalizing a PCZT can fail with
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The instance is malformed or its accumulator is unusable
    #[error("invalid PCZT: {0}")]
    InvalidPct(#[from] InvalidPct),

    /// Instances being combined disagree
    #[error("PCZTs do not match: {0}")]
    PctMismatch(#[from] Mismatch),

    /// [`combine`][crate::combine] was given no instances
    #[error("no PCZTs to combine")]
    NothingToCombine,

    /// A fixed-size field has the wrong length
    #[error("{location} field `{field}` has length {actual}, expected {expected}")]
    MalformedField {
        /// The record holding the field
        location: Location,
        /// The field name
        field: &'static str,
        /// Required length in bytes
        expected: usize,
        /// Length found
        actual: usize,
    },

    /// The header's version predates Sapling
    #[error("transaction version {version} does not support shielded components")]
    UnsupportedVersion {
        /// The header's `tx_version`
        version: u32,
    },

    /// A spend was added before the anchor
    #[error("sapling anchor must be set before adding spends")]
    AnchorNotSet,

    /// The witness leads to a different root than the anchor
    #[error("witness root {witness} does not match sapling anchor {anchor}")]
    AnchorMismatch {
        /// The header's anchor
        anchor: Bytes32,
        /// The witness root
        witness: Bytes32,
    },

    /// The engine could not derive a commitment or nullifier for the note
    #[error("note has no valid commitment or nullifier")]
    InvalidNote,

    /// The engine failed to prove a spend or output
    #[error("proof failed: {0}")]
    ProofFailed(ProverError),

    /// The engine failed to produce the binding signature
    #[error("binding signature failed: {0}")]
    BindingSignature(ProverError),

    /// A spend has no authorization signature
    #[error("missing spend authorization signature for spend {index}")]
    MissingSignature {
        /// The first unsigned spend
        index: usize,
    },

    /// Outputs exceed spends
    #[error("negative fee: value balance is {value_balance}")]
    NegativeFee {
        /// The header's value balance
        value_balance: i64,
    },

    /// The value balance would leave the range of `i64`
    #[error("value balance overflow")]
    BalanceOverflow,

    /// No spend at the given index
    #[error("spend index {index} out of range for {len} spends")]
    SpendIndexOutOfRange {
        /// The requested index
        index: usize,
        /// Number of spends
        len: usize,
    },
}

/// Result with [`Error`] as the default error type
pub type Result<T, E = Error> = std::result::Result<T, E>;
