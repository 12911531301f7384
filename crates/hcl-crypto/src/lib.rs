//! Integrity primitives for the HashChain Ledger.
//!
//! Provides the canonical, domain-separated BLAKE3 record hash and whole-chain
//! verification. Nothing here holds state: every function is a pure
//! computation over the records it is given.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod chain;
pub mod hasher;

pub use chain::{ChainError, HashChainVerifier};
pub use hasher::{compute_hash, RecordHasher};
