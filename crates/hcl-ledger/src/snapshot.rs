use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use hcl_types::Record;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::LedgerError;
use crate::memory::InMemoryLedger;
use crate::traits::LedgerReader;

/// Current snapshot layout version.
pub const SNAPSHOT_FORMAT: u32 = 1;

/// Persisted form of a ledger.
///
/// On-disk format is pretty-printed JSON:
/// ```text
/// {
///   "format": 1,
///   "records": [
///     { "index": 0, "timestamp": 1700000000, "payload": [],
///       "previousHash": "00…00", "hash": "…" },
///     ...
///   ]
/// }
/// ```
///
/// Loading never validates or repairs records; a tampered ledger reloads as
/// tampered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub format: u32,
    pub records: Vec<Record>,
}

impl LedgerSnapshot {
    /// Capture a consistent copy of a ledger.
    pub fn capture<R: LedgerReader + ?Sized>(reader: &R) -> Result<Self, LedgerError> {
        Ok(Self {
            format: SNAPSHOT_FORMAT,
            records: reader.records()?,
        })
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.format != SNAPSHOT_FORMAT {
            return Err(LedgerError::UnsupportedFormat(snapshot.format));
        }
        Ok(snapshot)
    }

    /// Write the snapshot to `path`, replacing any existing file.
    ///
    /// The JSON is written to a sibling `.tmp` file first and renamed over
    /// `path` once flushed to disk, so readers never observe a half-written
    /// snapshot. A failed save leaves no `.tmp` file behind.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        let tmp = tmp_path(path);
        if let Err(e) = write_synced(&tmp, json.as_bytes()).and_then(|()| fs::rename(&tmp, path)) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(path = %tmp.display(), error = %cleanup, "failed to remove temporary snapshot");
            }
            return Err(e.into());
        }

        info!(path = %path.display(), records = self.records.len(), "ledger snapshot saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let json = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&json)?;
        info!(path = %path.display(), records = snapshot.records.len(), "ledger snapshot loaded");
        Ok(snapshot)
    }

    /// Rebuild a ledger holding exactly these records.
    pub fn into_ledger(self) -> InMemoryLedger {
        InMemoryLedger::from_records(self.records)
    }
}

impl InMemoryLedger {
    /// Save this ledger as a JSON snapshot.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        LedgerSnapshot::capture(self)?.save(path)
    }

    /// Load a ledger from a JSON snapshot.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        Ok(LedgerSnapshot::load(path)?.into_ledger())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
