#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing spending key for sapling address")]
    MissingSpendingKey,

    #[error("missing witness for sapling note {index}")]
    MissingWitness { index: usize },

    #[error("wallet returned {actual} witnesses for {expected} notes")]
    WitnessCountMismatch { expected: usize, actual: usize },

    #[error("invalid keypath: {0}")]
    Keypath(#[from] pczt::common::KeypathError),

    #[error("pczt error: {0}")]
    Pczt(#[from] pczt::Error),

    #[error("wallet error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),

    #[error("config error: {0}")]
    Config(#[from] figment::Error),
}

impl Error {
    pub(crate) fn backend<E: std::error::Error + Send + Sync + 'static>(err: E) -> Self {
        Self::Backend(Box::new(err))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
