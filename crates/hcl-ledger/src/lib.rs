//! Append-only record store for the HashChain Ledger (HCL).
//!
//! This crate is the heart of HCL. It provides:
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `InMemoryLedger`, a lock-guarded single-writer implementation
//! - `StreamValidator`, a full violation report over a ledger
//! - JSON snapshots for saving and reloading a ledger unchanged
//! - `TamperHook`, a debug-only mutation path behind the `tamper` feature

pub mod clock;
pub mod error;
pub mod memory;
pub mod snapshot;
#[cfg(any(test, feature = "tamper"))]
pub mod tamper;
pub mod traits;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::LedgerError;
pub use memory::InMemoryLedger;
pub use snapshot::{LedgerSnapshot, SNAPSHOT_FORMAT};
#[cfg(any(test, feature = "tamper"))]
pub use tamper::TamperHook;
pub use traits::{LedgerReader, LedgerWriter};
pub use validation::{StreamValidator, ValidationReport, Violation, ViolationKind};
