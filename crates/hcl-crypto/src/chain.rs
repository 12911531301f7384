use hcl_types::{Record, GENESIS_SENTINEL};

use crate::hasher::RecordHasher;

/// Hash chain integrity verifier.
///
/// Verifies that a sequence of records forms a valid hash chain:
/// each record sits at its own index, links to the previous record's hash
/// (or to the genesis sentinel), and carries a hash that matches its fields.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Verify a chain of records, stopping at the first failure.
    ///
    /// Checks, for every record in order:
    /// 1. `index` equals the record's position
    /// 2. `previous_hash` is the sentinel for genesis, or the predecessor's hash
    /// 3. `hash` matches the canonical digest of the record's fields
    pub fn verify_chain(records: &[Record]) -> Result<(), ChainError> {
        let mut expected_prev = GENESIS_SENTINEL;

        for (position, record) in records.iter().enumerate() {
            let position = position as u64;
            if record.index != position {
                return Err(ChainError::IndexMismatch {
                    index: position,
                    found: record.index,
                });
            }

            if record.previous_hash != expected_prev {
                return Err(if position == 0 {
                    ChainError::GenesisLinkInvalid
                } else {
                    ChainError::BrokenLink { index: position }
                });
            }

            if !RecordHasher::V1.verify(record) {
                return Err(ChainError::HashMismatch { index: position });
            }

            expected_prev = record.hash;
        }

        Ok(())
    }

    /// Returns `true` if the chain is empty or every invariant holds.
    ///
    /// An invalid chain is an ordinary `false`, never an error.
    pub fn is_chain_valid(records: &[Record]) -> bool {
        Self::verify_chain(records).is_ok()
    }
}

/// Errors from chain verification.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("genesis record does not link to the genesis sentinel")]
    GenesisLinkInvalid,

    #[error("index mismatch at position {index}: record claims index {found}")]
    IndexMismatch { index: u64, found: u64 },

    #[error("broken link at index {index}: previous hash does not match")]
    BrokenLink { index: u64 },

    #[error("hash mismatch at index {index}: computed hash differs from stored")]
    HashMismatch { index: u64 },
}

impl ChainError {
    /// Position of the first failing record.
    pub fn index(&self) -> u64 {
        match self {
            Self::GenesisLinkInvalid => 0,
            Self::IndexMismatch { index, .. }
            | Self::BrokenLink { index }
            | Self::HashMismatch { index } => *index,
        }
    }
}
