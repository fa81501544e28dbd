//! The persisted document: collection name -> ordered records.

use crate::core::{ID_FIELD, Record, RecordId, Result, ShopError};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Reserved collection holding the highest id ever issued per collection.
pub(crate) const SEQUENCES: &str = "_sequences";

const SEQUENCE_COLLECTION_FIELD: &str = "collection";
const SEQUENCE_LAST_ID_FIELD: &str = "last_id";

/// Entire persisted state. Loaded and rewritten in full on every mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    collections: BTreeMap<String, Vec<Record>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records of a collection in file order; empty when the collection is absent.
    pub fn records(&self, collection: &str) -> &[Record] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Mutable records of a collection, creating it when absent.
    pub fn records_mut(&mut self, collection: &str) -> &mut Vec<Record> {
        self.collections.entry(collection.to_string()).or_default()
    }

    /// Mutable records of a collection only if it already exists.
    pub fn existing_records_mut(&mut self, collection: &str) -> Option<&mut Vec<Record>> {
        self.collections.get_mut(collection)
    }

    /// User-visible collection names; reserved names are skipped.
    pub fn collection_names(&self) -> Vec<String> {
        self.collections
            .keys()
            .filter(|name| !name.starts_with('_'))
            .cloned()
            .collect()
    }

    /// Allocates the next id for `collection`.
    ///
    /// The next id is one past the larger of the highest id present and the
    /// highest id ever issued, so ids of deleted records are never handed out
    /// again. Documents written without a sequence entry fall back to
    /// `max + 1` (or 1 when empty). Fails once the id space is used up.
    pub fn allocate_id(&mut self, collection: &str) -> Result<RecordId> {
        let present = self.records(collection).iter().filter_map(RecordId::of).max();
        let issued = self.last_issued(collection);

        let next = following(present.max(issued))?;
        self.set_last_issued(collection, next)?;
        Ok(next)
    }

    fn last_issued(&self, collection: &str) -> Option<RecordId> {
        self.records(SEQUENCES)
            .iter()
            .find(|entry| sequence_matches(entry, collection))
            .and_then(|entry| entry.get(SEQUENCE_LAST_ID_FIELD))
            .and_then(RecordId::from_json)
    }

    fn set_last_issued(&mut self, collection: &str, id: RecordId) -> Result<()> {
        let sequences = self.records_mut(SEQUENCES);

        if let Some(entry) = sequences
            .iter_mut()
            .find(|entry| sequence_matches(entry, collection))
        {
            entry.insert(SEQUENCE_LAST_ID_FIELD.to_string(), id.into());
            return Ok(());
        }

        let entry_id = following(sequences.iter().filter_map(RecordId::of).max())?;

        let mut entry = Record::new();
        entry.insert(ID_FIELD.to_string(), entry_id.into());
        entry.insert(
            SEQUENCE_COLLECTION_FIELD.to_string(),
            JsonValue::String(collection.to_string()),
        );
        entry.insert(SEQUENCE_LAST_ID_FIELD.to_string(), id.into());
        sequences.push(entry);
        Ok(())
    }
}

/// First id, or the one after `last`.
fn following(last: Option<RecordId>) -> Result<RecordId> {
    match last {
        None => Ok(RecordId::FIRST),
        Some(last) => last
            .next()
            .ok_or_else(|| ShopError::storage("id space exhausted")),
    }
}

fn sequence_matches(entry: &Record, collection: &str) -> bool {
    entry
        .get(SEQUENCE_COLLECTION_FIELD)
        .and_then(JsonValue::as_str)
        == Some(collection)
}

/// Any non-empty name is a collection name, except those starting with `_`,
/// which are reserved for the store itself.
pub fn validate_collection_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ShopError::validation("collection name cannot be empty"));
    }

    if name.starts_with('_') {
        return Err(ShopError::validation(format!(
            "collection name '{}' is reserved",
            name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record_from;
    use serde_json::json;

    #[test]
    fn test_absent_collection_is_empty() {
        let document = Document::new();
        assert!(document.records("users").is_empty());
        assert!(document.collection_names().is_empty());
    }

    #[test]
    fn test_allocate_on_empty_collection_starts_at_one() {
        let mut document = Document::new();
        assert_eq!(document.allocate_id("categories").unwrap(), RecordId::new(1));
        assert_eq!(document.allocate_id("categories").unwrap(), RecordId::new(2));
        assert_eq!(document.allocate_id("products").unwrap(), RecordId::new(1));
    }

    #[test]
    fn test_allocate_without_sequence_uses_max_plus_one() {
        let mut document: Document = serde_json::from_value(json!({
            "categories": [{"id": 3, "name": "a"}, {"id": 9, "name": "b"}]
        }))
        .unwrap();

        assert_eq!(document.allocate_id("categories").unwrap(), RecordId::new(10));
    }

    #[test]
    fn test_allocate_never_reuses_removed_max() {
        let mut document = Document::new();
        let first = document.allocate_id("categories").unwrap();
        document
            .records_mut("categories")
            .push(record_from(json!({"id": first, "name": "x"})));

        document.records_mut("categories").clear();

        assert_eq!(document.allocate_id("categories").unwrap(), RecordId::new(2));
    }

    #[test]
    fn test_sequences_are_hidden_from_names() {
        let mut document = Document::new();
        document.allocate_id("users").unwrap();
        document.records_mut("users");

        assert_eq!(document.collection_names(), vec!["users".to_string()]);
    }

    #[test]
    fn test_allocate_fails_when_id_space_is_exhausted() {
        let mut document: Document = serde_json::from_value(json!({
            "categories": [{"id": u64::MAX, "name": "last"}]
        }))
        .unwrap();

        let err = document.allocate_id("categories").unwrap_err();
        assert!(matches!(err, ShopError::Storage(_)));
        assert_eq!(document.records("categories").len(), 1);
    }

    #[test]
    fn test_allocate_after_whole_float_id() {
        let mut document: Document = serde_json::from_value(json!({
            "categories": [{"id": 4.0, "name": "legacy"}]
        }))
        .unwrap();

        assert_eq!(document.allocate_id("categories").unwrap(), RecordId::new(5));
    }

    #[test]
    fn test_validate_collection_name() {
        assert!(validate_collection_name("categories").is_ok());
        assert!(validate_collection_name("order-items").is_ok());
        assert!(validate_collection_name("9lives").is_ok());
        assert!(validate_collection_name("line items").is_ok());
        assert!(validate_collection_name(&"a".repeat(65)).is_ok());
        assert!(validate_collection_name("").is_err());
        assert!(validate_collection_name("_sequences").is_err());
        assert!(validate_collection_name("_private").is_err());
    }
}
