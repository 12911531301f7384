//! Foundation types for the HashChain Ledger (HCL).
//!
//! Every other HCL crate depends on `hcl-types`. The types here carry no
//! hashing logic of their own; digests are produced by `hcl-crypto`.
//!
//! # Key Types
//!
//! - [`Digest`]: 32-byte record hash, rendered as lowercase hex
//! - [`Timestamp`]: seconds since the UNIX epoch
//! - [`Record`]: one hash-linked ledger entry
//! - [`GENESIS_SENTINEL`]: predecessor link of the genesis record

pub mod digest;
pub mod error;
pub mod record;
pub mod timestamp;

pub use digest::{Digest, GENESIS_SENTINEL};
pub use error::TypeError;
pub use record::Record;
pub use timestamp::Timestamp;
