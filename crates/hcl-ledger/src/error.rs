/// Errors produced by ledger operations.
///
/// An invalid chain is not an error; see [`crate::StreamValidator`] and
/// [`hcl_crypto::HashChainVerifier::is_chain_valid`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger already has a genesis record")]
    AlreadyInitialized,

    #[error("ledger has no genesis record; create one before appending")]
    NotInitialized,

    #[error("index {index} out of range for ledger of length {len}")]
    OutOfRange { index: u64, len: u64 },

    #[error("invalid index range: from={from}, to={to}")]
    InvalidRange { from: u64, to: u64 },

    #[error("ledger lock poisoned")]
    LockPoisoned,

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unsupported snapshot format {0}")]
    UnsupportedFormat(u32),
}

impl From<std::io::Error> for LedgerError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
