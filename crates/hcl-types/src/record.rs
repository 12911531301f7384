use std::fmt;

use serde::{Deserialize, Serialize};

use crate::digest::{Digest, GENESIS_SENTINEL};
use crate::timestamp::Timestamp;

/// One hash-linked ledger entry.
///
/// `hash` is stored alongside the committed fields instead of being derived
/// on read. A record whose `payload` or `timestamp` changed after creation
/// keeps its old `hash`, which is exactly what chain verification detects.
///
/// Records handed out by a ledger are copies; mutating one never affects the
/// ledger it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Position in the ledger, starting at 0 for genesis.
    pub index: u64,
    /// Creation time.
    pub timestamp: Timestamp,
    /// Opaque application data.
    pub payload: Vec<String>,
    /// Hash of the preceding record, or [`GENESIS_SENTINEL`] for genesis.
    pub previous_hash: Digest,
    /// Digest over `(index, timestamp, payload, previous_hash)` taken at creation.
    pub hash: Digest,
}

impl Record {
    /// Returns `true` if this record sits at index 0.
    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Returns `true` if the predecessor link is the genesis sentinel.
    pub fn links_to_sentinel(&self) -> bool {
        self.previous_hash == GENESIS_SENTINEL
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}]", self.index, self.hash.short_hex())
    }
}
