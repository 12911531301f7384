use hcl_crypto::RecordHasher;
use hcl_types::{Record, GENESIS_SENTINEL};
use serde::Serialize;
use tracing::warn;

use crate::error::LedgerError;
use crate::traits::LedgerReader;

/// Result of ledger validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub record_count: u64,
    pub genesis_valid: bool,
    pub sequence_valid: bool,
    pub hash_chain_valid: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Index of the earliest violating record, if any.
    pub fn first_invalid_index(&self) -> Option<u64> {
        self.violations.iter().map(|v| v.index).min()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub index: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Record index differs from its position.
    SequenceGap,
    /// Genesis does not link to the sentinel.
    GenesisLink,
    /// `previous_hash` differs from the predecessor's stored hash.
    HashChainBreak,
    /// Stored hash differs from the recomputed digest.
    HashMismatch,
}

/// Ledger integrity validator.
///
/// Unlike [`hcl_crypto::HashChainVerifier`], this walks every record and
/// reports every violation instead of stopping at the first.
pub struct StreamValidator;

impl StreamValidator {
    /// Validate everything a reader currently holds.
    pub fn validate<R: LedgerReader + ?Sized>(reader: &R) -> Result<ValidationReport, LedgerError> {
        let records = reader.records()?;
        let report = Self::validate_records(&records);
        if !report.is_valid() {
            warn!(
                violations = report.violations.len(),
                first = ?report.first_invalid_index(),
                "ledger failed validation"
            );
        }
        Ok(report)
    }

    /// Validate a slice of records.
    pub fn validate_records(records: &[Record]) -> ValidationReport {
        let mut violations = Vec::new();
        let mut genesis_valid = true;
        let mut sequence_valid = true;
        let mut hash_chain_valid = true;

        for (position, record) in records.iter().enumerate() {
            let expected_index = position as u64;
            if record.index != expected_index {
                sequence_valid = false;
                violations.push(Violation {
                    index: expected_index,
                    kind: ViolationKind::SequenceGap,
                    description: format!(
                        "expected index {expected_index}, found {}",
                        record.index
                    ),
                });
            }

            if position == 0 {
                if record.previous_hash != GENESIS_SENTINEL {
                    genesis_valid = false;
                    violations.push(Violation {
                        index: expected_index,
                        kind: ViolationKind::GenesisLink,
                        description: "genesis does not link to the sentinel".into(),
                    });
                }
            } else if record.previous_hash != records[position - 1].hash {
                hash_chain_valid = false;
                violations.push(Violation {
                    index: expected_index,
                    kind: ViolationKind::HashChainBreak,
                    description: "previous hash link mismatch".into(),
                });
            }

            let computed = RecordHasher::V1.hash_record(record);
            if computed != record.hash {
                hash_chain_valid = false;
                violations.push(Violation {
                    index: expected_index,
                    kind: ViolationKind::HashMismatch,
                    description: format!(
                        "stored hash {} does not match computed {}",
                        record.hash.short_hex(),
                        computed.short_hex()
                    ),
                });
            }
        }

        ValidationReport {
            record_count: records.len() as u64,
            genesis_valid,
            sequence_valid,
            hash_chain_valid,
            violations,
        }
    }
}
