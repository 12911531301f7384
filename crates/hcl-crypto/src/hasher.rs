use hcl_types::{Digest, Record, Timestamp};

/// Domain-separated BLAKE3 record hasher.
///
/// The hasher prepends `"<domain>:"` to the canonical encoding of a record's
/// committed fields:
///
/// ```text
/// index                       u64 big-endian
/// timestamp                   u64 big-endian (seconds)
/// payload entry count         u64 big-endian
/// per entry: byte length      u64 big-endian, then the UTF-8 bytes
/// previous_hash               32 raw bytes
/// ```
///
/// Every persisted digest depends on this layout. Any change to it must ship
/// under a new domain tag.
pub struct RecordHasher {
    domain: &'static str,
}

impl RecordHasher {
    /// The canonical hasher for ledger records.
    pub const V1: Self = Self {
        domain: "hcl-record-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Canonical byte encoding of a record's committed fields, without the
    /// domain tag.
    pub fn encode<S: AsRef<str>>(
        index: u64,
        timestamp: Timestamp,
        payload: &[S],
        previous_hash: &Digest,
    ) -> Vec<u8> {
        let payload_len: usize = payload.iter().map(|s| 8 + s.as_ref().len()).sum();
        let mut out = Vec::with_capacity(8 + 8 + 8 + payload_len + 32);

        out.extend_from_slice(&index.to_be_bytes());
        out.extend_from_slice(&timestamp.as_secs().to_be_bytes());
        out.extend_from_slice(&(payload.len() as u64).to_be_bytes());
        for entry in payload {
            let bytes = entry.as_ref().as_bytes();
            out.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
            out.extend_from_slice(bytes);
        }
        out.extend_from_slice(previous_hash.as_bytes());
        out
    }

    /// Hash a record's committed fields.
    pub fn compute_hash<S: AsRef<str>>(
        &self,
        index: u64,
        timestamp: Timestamp,
        payload: &[S],
        previous_hash: &Digest,
    ) -> Digest {
        let encoded = Self::encode(index, timestamp, payload, previous_hash);
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(&encoded);
        Digest::from_hash(*hasher.finalize().as_bytes())
    }

    /// Recompute the digest of an existing record from its current fields.
    ///
    /// The record's stored `hash` is ignored.
    pub fn hash_record(&self, record: &Record) -> Digest {
        self.compute_hash(
            record.index,
            record.timestamp,
            &record.payload,
            &record.previous_hash,
        )
    }

    /// Returns `true` if the record's stored hash matches its fields.
    pub fn verify(&self, record: &Record) -> bool {
        self.hash_record(record) == record.hash
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Hash a record's committed fields with the canonical [`RecordHasher::V1`].
pub fn compute_hash<S: AsRef<str>>(
    index: u64,
    timestamp: Timestamp,
    payload: &[S],
    previous_hash: &Digest,
) -> Digest {
    RecordHasher::V1.compute_hash(index, timestamp, payload, previous_hash)
}
