use hcl_crypto::HashChainVerifier;
use hcl_types::Record;
use tracing::warn;

use crate::error::LedgerError;

/// Write boundary for ledger growth. Appending is the only way a ledger grows.
pub trait LedgerWriter: Send + Sync {
    /// Create the genesis record with an empty payload.
    fn create_genesis(&self) -> Result<Record, LedgerError> {
        self.create_genesis_with(Vec::new())
    }

    /// Create the genesis record with a caller-supplied payload.
    fn create_genesis_with(&self, payload: Vec<String>) -> Result<Record, LedgerError>;

    /// Append one record linked to the current head. Not idempotent.
    fn append(&self, payload: Vec<String>) -> Result<Record, LedgerError>;
}

/// Read boundary for ledger queries and verification.
pub trait LedgerReader: Send + Sync {
    fn get(&self, index: u64) -> Result<Record, LedgerError>;

    fn len(&self) -> Result<u64, LedgerError>;

    fn is_empty(&self) -> Result<bool, LedgerError> {
        Ok(self.len()? == 0)
    }

    fn head(&self) -> Result<Option<Record>, LedgerError>;

    /// Inclusive range read. `to` past the end is clamped.
    fn read_range(&self, from: u64, to: u64) -> Result<Vec<Record>, LedgerError>;

    /// Consistent copy of every record, in order.
    fn records(&self) -> Result<Vec<Record>, LedgerError>;

    /// Re-derive every hash and link over a consistent copy of the ledger.
    ///
    /// Errors only when the ledger cannot be read; a tampered ledger is `Ok(false)`.
    fn is_chain_valid(&self) -> Result<bool, LedgerError> {
        match HashChainVerifier::verify_chain(&self.records()?) {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(index = e.index(), error = %e, "hash chain verification failed");
                Ok(false)
            }
        }
    }
}
