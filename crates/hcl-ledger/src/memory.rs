use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use hcl_crypto::compute_hash;
use hcl_types::{Digest, Record, GENESIS_SENTINEL};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::LedgerError;
use crate::traits::{LedgerReader, LedgerWriter};

/// In-memory ledger for embedding, demos, and tests.
///
/// All mutation goes through a single write guard, so an append reads the
/// head and pushes the new record as one step. Reads share the lock.
pub struct InMemoryLedger {
    clock: Box<dyn Clock>,
    inner: RwLock<Vec<Record>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create an empty ledger that timestamps records with `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            inner: RwLock::new(Vec::new()),
        }
    }

    /// Rebuild a ledger from previously persisted records.
    ///
    /// Records are taken exactly as given: nothing is re-indexed, re-linked
    /// or re-hashed, so a reloaded ledger verifies the same way the original
    /// did. Call [`LedgerReader::is_chain_valid`] to decide whether to trust it.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::from_records_with_clock(records, SystemClock)
    }

    pub fn from_records_with_clock(records: Vec<Record>, clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            inner: RwLock::new(records),
        }
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, Vec<Record>>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, Vec<Record>>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }

    fn seal(&self, index: u64, payload: Vec<String>, previous_hash: Digest) -> Record {
        let timestamp = self.clock.now();
        let hash = compute_hash(index, timestamp, &payload, &previous_hash);
        Record {
            index,
            timestamp,
            payload,
            previous_hash,
            hash,
        }
    }

    /// Apply `mutate` to the record at `index` in place and return the result.
    /// The stored hash is left untouched.
    #[cfg(any(test, feature = "tamper"))]
    pub(crate) fn mutate_in_place(
        &self,
        index: u64,
        mutate: impl FnOnce(&mut Record),
    ) -> Result<Record, LedgerError> {
        let mut records = self.write_guard()?;
        let len = records.len() as u64;
        let record = usize::try_from(index)
            .ok()
            .and_then(|i| records.get_mut(i))
            .ok_or(LedgerError::OutOfRange { index, len })?;
        mutate(record);
        Ok(record.clone())
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerWriter for InMemoryLedger {
    fn create_genesis_with(&self, payload: Vec<String>) -> Result<Record, LedgerError> {
        let mut records = self.write_guard()?;
        if !records.is_empty() {
            return Err(LedgerError::AlreadyInitialized);
        }

        let genesis = self.seal(0, payload, GENESIS_SENTINEL);
        records.push(genesis.clone());

        info!(hash = %genesis.hash, timestamp = %genesis.timestamp, "genesis record created");
        Ok(genesis)
    }

    fn append(&self, payload: Vec<String>) -> Result<Record, LedgerError> {
        let mut records = self.write_guard()?;
        let previous_hash = records
            .last()
            .map(|head| head.hash)
            .ok_or(LedgerError::NotInitialized)?;

        let record = self.seal(records.len() as u64, payload, previous_hash);
        records.push(record.clone());

        debug!(
            index = record.index,
            hash = %record.hash.short_hex(),
            previous = %record.previous_hash.short_hex(),
            "record appended"
        );
        Ok(record)
    }
}

impl LedgerReader for InMemoryLedger {
    fn get(&self, index: u64) -> Result<Record, LedgerError> {
        let records = self.read_guard()?;
        usize::try_from(index)
            .ok()
            .and_then(|i| records.get(i))
            .cloned()
            .ok_or(LedgerError::OutOfRange {
                index,
                len: records.len() as u64,
            })
    }

    fn len(&self) -> Result<u64, LedgerError> {
        Ok(self.read_guard()?.len() as u64)
    }

    fn head(&self) -> Result<Option<Record>, LedgerError> {
        Ok(self.read_guard()?.last().cloned())
    }

    fn read_range(&self, from: u64, to: u64) -> Result<Vec<Record>, LedgerError> {
        if from > to {
            return Err(LedgerError::InvalidRange { from, to });
        }

        let records = self.read_guard()?;
        let len = records.len() as u64;
        if from >= len {
            return Ok(vec![]);
        }

        let end_exclusive = to.saturating_add(1).min(len) as usize;
        Ok(records[from as usize..end_exclusive].to_vec())
    }

    fn records(&self) -> Result<Vec<Record>, LedgerError> {
        Ok(self.read_guard()?.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use hcl_crypto::{HashChainVerifier, RecordHasher};
    use proptest::prelude::*;

    use super::*;
    use crate::clock::FixedClock;

    fn entries(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn scenario_a() -> InMemoryLedger {
        let ledger = InMemoryLedger::with_clock(FixedClock::new(1_700_000_000));
        ledger.create_genesis().unwrap();
        ledger.append(entries(&["Alice sends 10 ETH to Bob"])).unwrap();
        ledger.append(entries(&["Bob sends 5 ETH to Charlie"])).unwrap();
        ledger
    }

    #[test]
    fn genesis_links_to_sentinel() {
        let ledger = InMemoryLedger::default();
        let genesis = ledger.create_genesis().unwrap();

        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_hash, GENESIS_SENTINEL);
        assert!(genesis.payload.is_empty());
        assert!(RecordHasher::V1.verify(&genesis));
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn genesis_accepts_caller_payload() {
        let ledger = InMemoryLedger::default();
        let genesis = ledger
            .create_genesis_with(entries(&["Genesis Block"]))
            .unwrap();
        assert_eq!(genesis.payload, vec!["Genesis Block".to_string()]);
        assert!(ledger.is_chain_valid().unwrap());
    }

    #[test]
    fn second_genesis_is_rejected() {
        let ledger = InMemoryLedger::default();
        ledger.create_genesis().unwrap();

        let err = ledger.create_genesis().unwrap_err();
        assert_eq!(err, LedgerError::AlreadyInitialized);
        assert_eq!(ledger.len().unwrap(), 1);
    }

    #[test]
    fn genesis_after_appends_is_rejected() {
        let ledger = scenario_a();
        assert_eq!(
            ledger.create_genesis_with(entries(&["again"])).unwrap_err(),
            LedgerError::AlreadyInitialized
        );
        assert_eq!(ledger.len().unwrap(), 3);
    }

    #[test]
    fn append_before_genesis_is_rejected() {
        let ledger = InMemoryLedger::default();
        let err = ledger.append(entries(&["too early"])).unwrap_err();
        assert_eq!(err, LedgerError::NotInitialized);
        assert_eq!(ledger.len().unwrap(), 0);
        assert!(ledger.is_empty().unwrap());
    }

    #[test]
    fn scenario_builds_valid_three_record_chain() {
        let ledger = scenario_a();

        assert_eq!(ledger.len().unwrap(), 3);
        assert!(ledger.is_chain_valid().unwrap());

        let block1 = ledger.get(1).unwrap();
        let block2 = ledger.get(2).unwrap();
        assert_eq!(block1.index, 1);
        assert_eq!(block1.payload, vec!["Alice sends 10 ETH to Bob".to_string()]);
        assert_eq!(block1.previous_hash, ledger.get(0).unwrap().hash);
        assert_eq!(block2.previous_hash, block1.hash);
    }

    #[test]
    fn get_out_of_range() {
        let ledger = scenario_a();
        let err = ledger.get(5).unwrap_err();
        assert_eq!(err, LedgerError::OutOfRange { index: 5, len: 3 });
        assert!(matches!(
            ledger.get(u64::MAX),
            Err(LedgerError::OutOfRange { .. })
        ));
    }

    #[test]
    fn get_on_empty_ledger() {
        let ledger = InMemoryLedger::default();
        assert_eq!(
            ledger.get(0).unwrap_err(),
            LedgerError::OutOfRange { index: 0, len: 0 }
        );
        assert!(ledger.head().unwrap().is_none());
    }

    #[test]
    fn empty_ledger_is_valid() {
        assert!(InMemoryLedger::default().is_chain_valid().unwrap());
    }

    #[test]
    fn head_tracks_latest_append() {
        let ledger = scenario_a();
        let head = ledger.head().unwrap().unwrap();
        assert_eq!(head.index, 2);

        let next = ledger.append(entries(&["Charlie sends 1 ETH to Dave"])).unwrap();
        assert_eq!(ledger.head().unwrap().unwrap(), next);
        assert_eq!(next.previous_hash, head.hash);
    }

    #[test]
    fn timestamps_come_from_the_clock() {
        let ledger = InMemoryLedger::with_clock(FixedClock::new(42));
        let genesis = ledger.create_genesis().unwrap();
        assert_eq!(genesis.timestamp.as_secs(), 42);
    }

    #[test]
    fn skewed_clock_is_tolerated() {
        let ledger = InMemoryLedger::with_clock(FixedClock::new(1_000));
        ledger.create_genesis().unwrap();
        let ledger = InMemoryLedger::from_records_with_clock(
            ledger.records().unwrap(),
            FixedClock::new(10),
        );
        let later = ledger.append(entries(&["from the past"])).unwrap();
        assert!(later.timestamp < ledger.get(0).unwrap().timestamp);
        assert!(ledger.is_chain_valid().unwrap());
    }

    #[test]
    fn identical_payloads_produce_distinct_records() {
        let ledger = InMemoryLedger::with_clock(FixedClock::new(5));
        ledger.create_genesis().unwrap();
        let a = ledger.append(entries(&["same"])).unwrap();
        let b = ledger.append(entries(&["same"])).unwrap();
        assert_ne!(a.hash, b.hash);
        assert_eq!(ledger.len().unwrap(), 3);
    }

    #[test]
    fn returned_records_are_copies() {
        let ledger = scenario_a();
        let mut copy = ledger.get(1).unwrap();
        copy.payload = entries(&["edited outside"]);
        assert_ne!(ledger.get(1).unwrap().payload, copy.payload);
        assert!(ledger.is_chain_valid().unwrap());
    }

    #[test]
    fn read_range_is_inclusive_and_validated() {
        let ledger = scenario_a();

        let range = ledger.read_range(1, 2).unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].index, 1);

        assert_eq!(ledger.read_range(0, 100).unwrap().len(), 3);
        assert!(ledger.read_range(3, 4).unwrap().is_empty());
        assert_eq!(ledger.read_range(2, u64::MAX).unwrap().len(), 1);

        let err = ledger.read_range(2, 1).unwrap_err();
        assert_eq!(err, LedgerError::InvalidRange { from: 2, to: 1 });
    }

    #[test]
    fn from_records_keeps_records_verbatim() {
        let original = scenario_a();
        let mut records = original.records().unwrap();
        records[1].payload = entries(&["rewritten"]);

        let rebuilt = InMemoryLedger::from_records(records.clone());
        assert_eq!(rebuilt.records().unwrap(), records);
        assert!(!rebuilt.is_chain_valid().unwrap());
    }

    #[test]
    fn concurrent_appends_never_share_an_index() {
        let ledger = Arc::new(InMemoryLedger::default());
        ledger.create_genesis().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for i in 0..25 {
                        ledger.append(vec![format!("writer {t} entry {i}")]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let records = ledger.records().unwrap();
        assert_eq!(records.len(), 1 + 8 * 25);
        assert!(HashChainVerifier::is_chain_valid(&records));
    }

    proptest! {
        #[test]
        fn appends_keep_sequence_linkage_and_validity(
            payloads in proptest::collection::vec(proptest::collection::vec(".{0,16}", 0..3), 0..20)
        ) {
            let ledger = InMemoryLedger::default();
            ledger.create_genesis().unwrap();
            for payload in &payloads {
                ledger.append(payload.clone()).unwrap();
            }

            let len = ledger.len().unwrap();
            prop_assert_eq!(len, payloads.len() as u64 + 1);
            for i in 0..len {
                prop_assert_eq!(ledger.get(i).unwrap().index, i);
            }
            for i in 1..len {
                prop_assert_eq!(ledger.get(i).unwrap().previous_hash, ledger.get(i - 1).unwrap().hash);
            }
            prop_assert!(ledger.is_chain_valid().unwrap());
        }
    }
}
