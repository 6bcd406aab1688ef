//! Records and ordered batches of records.

use std::sync::OnceLock;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hashutil;

/// A single user-submitted entry. Immutable once created; two records are
/// equal iff their content hashes are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Randomly generated per record.
    pub uuid: Uuid,
    /// Unix seconds, assigned when the record is synthesized.
    #[serde(rename = "unixtime")]
    pub timestamp: i64,
    /// Opaque UTF-8 payload.
    pub entry: String,
    /// Lazily computed content hash. Never serialized.
    #[serde(skip)]
    hash: OnceLock<Vec<u8>>,
}

impl Record {
    /// A fresh record stamped with the current wall clock.
    pub fn new(entry: String) -> Self {
        Self::with_parts(Uuid::new_v4(), Utc::now().timestamp(), entry)
    }

    pub fn with_parts(uuid: Uuid, timestamp: i64, entry: String) -> Self {
        Self {
            uuid,
            timestamp,
            entry,
            hash: OnceLock::new(),
        }
    }

    /// SHAKE256-64 over `varint(timestamp) || uuid(16 bytes) || entry`.
    pub fn hash(&self) -> &[u8] {
        self.hash.get_or_init(|| {
            hashutil::shake256(&hashutil::concat(&[
                &hashutil::int_to_bytes(self.timestamp),
                self.uuid.as_bytes(),
                self.entry.as_bytes(),
            ]))
        })
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}

impl Eq for Record {}

/// An ordered batch of records committed together inside one block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCollection {
    pub items: Vec<Record>,
}

impl RecordCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(items: Vec<Record>) -> Self {
        Self { items }
    }

    /// The concatenation of the member hashes in insertion order.
    /// Deliberately NOT hashed again; the enclosing block hashes it.
    pub fn composite_hash(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.items.len() * hashutil::DIGEST_LEN);
        for record in &self.items {
            out.extend_from_slice(record.hash());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, record: Record) {
        self.items.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_record(entry: &str) -> Record {
        Record::with_parts(
            Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap(),
            1_700_000_000,
            entry.to_string(),
        )
    }

    #[test]
    fn hash_is_deterministic() {
        let record = fixed_record("hello");
        assert_eq!(record.hash(), record.hash());
        assert_eq!(record.hash().len(), hashutil::DIGEST_LEN);
        assert_eq!(record.hash(), fixed_record("hello").hash());
    }

    #[test]
    fn equality_follows_the_hash() {
        assert_eq!(fixed_record("a"), fixed_record("a"));
        assert_ne!(fixed_record("a"), fixed_record("b"));
        let other_uuid = Record::with_parts(Uuid::new_v4(), 1_700_000_000, "a".to_string());
        assert_ne!(fixed_record("a"), other_uuid);
    }

    #[test]
    fn memoized_hash_is_not_serialized() {
        let record = fixed_record("hello");
        record.hash();
        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert!(object.contains_key("uuid"));
        assert!(object.contains_key("unixtime"));
        assert!(object.contains_key("entry"));

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back.hash(), record.hash());
    }

    #[test]
    fn composite_hash_concatenates_in_order() {
        let a = fixed_record("a");
        let b = fixed_record("b");
        let collection = RecordCollection::from_records(vec![a.clone(), b.clone()]);
        let mut expected = a.hash().to_vec();
        expected.extend_from_slice(b.hash());
        assert_eq!(collection.composite_hash(), expected);

        let reversed = RecordCollection::from_records(vec![b, a]);
        assert_ne!(collection.composite_hash(), reversed.composite_hash());
    }

    #[test]
    fn collection_equality_is_order_sensitive() {
        let a = fixed_record("a");
        let b = fixed_record("b");
        let left = RecordCollection::from_records(vec![a.clone(), b.clone()]);
        let right = RecordCollection::from_records(vec![b, a]);
        assert_ne!(left, right);
        assert_eq!(left, left.clone());
    }
}
