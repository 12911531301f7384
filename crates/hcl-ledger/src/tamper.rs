//! Debug-only mutation of stored records.
//!
//! Compiled only with the `tamper` feature (and in this crate's own tests).
//! Nothing here recomputes a hash: every call leaves the ledger in a state
//! that chain verification reports as invalid, unless the new value equals
//! the old one.

use hcl_types::{Record, Timestamp};
use tracing::warn;

use crate::error::LedgerError;
use crate::memory::InMemoryLedger;

/// Out-of-band write path that bypasses hashing, used to demonstrate tamper
/// detection. Kept apart from [`crate::LedgerWriter`] so ordinary callers
/// never see it.
pub trait TamperHook: Send + Sync {
    /// Replace the payload of the record at `index`, keeping its stored hash.
    fn tamper(&self, index: u64, payload: Vec<String>) -> Result<Record, LedgerError>;

    /// Replace the timestamp of the record at `index`, keeping its stored hash.
    fn tamper_timestamp(&self, index: u64, timestamp: Timestamp) -> Result<Record, LedgerError>;
}

impl TamperHook for InMemoryLedger {
    fn tamper(&self, index: u64, payload: Vec<String>) -> Result<Record, LedgerError> {
        let record = self.mutate_in_place(index, |record| record.payload = payload)?;
        warn!(index, hash = %record.hash.short_hex(), "record payload tampered");
        Ok(record)
    }

    fn tamper_timestamp(&self, index: u64, timestamp: Timestamp) -> Result<Record, LedgerError> {
        let record = self.mutate_in_place(index, |record| record.timestamp = timestamp)?;
        warn!(index, %timestamp, "record timestamp tampered");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use hcl_crypto::{ChainError, HashChainVerifier};

    use super::*;
    use crate::clock::FixedClock;
    use crate::traits::{LedgerReader, LedgerWriter};
    use proptest::prelude::*;

    fn scenario_a() -> InMemoryLedger {
        let ledger = InMemoryLedger::with_clock(FixedClock::new(1_700_000_000));
        ledger.create_genesis().unwrap();
        ledger
            .append(vec!["Alice sends 10 ETH to Bob".into()])
            .unwrap();
        ledger
            .append(vec!["Bob sends 5 ETH to Charlie".into()])
            .unwrap();
        ledger
    }

    #[test]
    fn tamper_changes_payload_but_not_hash() {
        let ledger = scenario_a();
        let before = ledger.get(1).unwrap();
        assert!(ledger.is_chain_valid().unwrap());

        let tampered = ledger
            .tamper(1, vec!["Hacker steals 100 ETH".into()])
            .unwrap();

        assert_eq!(tampered.payload, vec!["Hacker steals 100 ETH".to_string()]);
        assert_eq!(tampered.hash, before.hash);
        assert_eq!(ledger.get(1).unwrap(), tampered);
        assert_eq!(ledger.len().unwrap(), 3);
        assert!(!ledger.is_chain_valid().unwrap());
        assert_eq!(
            HashChainVerifier::verify_chain(&ledger.records().unwrap()).unwrap_err(),
            ChainError::HashMismatch { index: 1 }
        );
    }

    #[test]
    fn tamper_timestamp_is_detected() {
        let ledger = scenario_a();
        let tampered = ledger.tamper_timestamp(2, Timestamp::from_secs(1)).unwrap();
        assert_eq!(tampered.timestamp.as_secs(), 1);
        assert!(!ledger.is_chain_valid().unwrap());
    }

    #[test]
    fn tamper_out_of_range() {
        let ledger = scenario_a();
        let err = ledger.tamper(3, vec![]).unwrap_err();
        assert_eq!(err, LedgerError::OutOfRange { index: 3, len: 3 });

        let empty = InMemoryLedger::default();
        assert!(matches!(
            empty.tamper_timestamp(0, Timestamp::from_secs(0)),
            Err(LedgerError::OutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn tamper_with_identical_payload_keeps_chain_valid() {
        let ledger = scenario_a();
        ledger
            .tamper(1, vec!["Alice sends 10 ETH to Bob".into()])
            .unwrap();
        assert!(ledger.is_chain_valid().unwrap());
    }

    #[test]
    fn tampered_ledger_still_accepts_appends() {
        let ledger = scenario_a();
        ledger.tamper(0, vec!["rewritten genesis".into()]).unwrap();

        let next = ledger.append(vec!["after the fact".into()]).unwrap();
        assert_eq!(next.index, 3);
        assert_eq!(next.previous_hash, ledger.get(2).unwrap().hash);
        assert!(!ledger.is_chain_valid().unwrap());
    }

    proptest! {
        #[test]
        fn any_payload_change_is_detected(
            count in 1usize..8,
            target in any::<proptest::sample::Index>(),
            replacement in proptest::collection::vec(".{0,16}", 0..3),
        ) {
            let ledger = InMemoryLedger::default();
            ledger.create_genesis().unwrap();
            for i in 1..count {
                ledger.append(vec![format!("entry {i}")]).unwrap();
            }

            let index = target.index(count) as u64;
            let original = ledger.get(index).unwrap().payload;
            prop_assume!(original != replacement);

            ledger.tamper(index, replacement).unwrap();
            prop_assert!(!ledger.is_chain_valid().unwrap());
        }
    }
}
