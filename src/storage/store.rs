use crate::core::{ID_FIELD, Record, RecordId, Result};
use crate::storage::document::{Document, validate_collection_name};
use crate::storage::persistence::DocumentFile;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Generic collection CRUD over the on-disk document.
///
/// Every operation reads the whole document first; mutations write the
/// whole document back before returning. Nothing is cached between calls.
///
/// Cloning yields another handle to the same file. Mutations issued through
/// handles of one store are serialized, so a read-modify-write cycle never
/// loses another handle's update. Independent processes writing the same
/// file still race, and the last writer wins.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    file: Arc<DocumentFile>,
    write_lock: Arc<Mutex<()>>,
}

impl DocumentStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            file: Arc::new(DocumentFile::new(path)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// All records of `collection` in file order; empty if the collection is absent.
    pub async fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        validate_collection_name(collection)?;
        let document = self.file.load().await?;
        Ok(document.records(collection).to_vec())
    }

    /// First record whose id equals `id`.
    pub async fn get_by_id(&self, collection: &str, id: RecordId) -> Result<Option<Record>> {
        validate_collection_name(collection)?;
        let document = self.file.load().await?;
        Ok(document
            .records(collection)
            .iter()
            .find(|record| RecordId::of(record) == Some(id))
            .cloned())
    }

    /// First record matching every key/value pair of `predicate`.
    pub async fn find_one(&self, collection: &str, predicate: &Record) -> Result<Option<Record>> {
        validate_collection_name(collection)?;
        let document = self.file.load().await?;
        Ok(document
            .records(collection)
            .iter()
            .find(|record| matches_all(record, predicate))
            .cloned())
    }

    /// Append a record with a freshly assigned id.
    ///
    /// An `id` among `fields` is ignored; ids only come from the store.
    pub async fn create(&self, collection: &str, fields: Record) -> Result<Record> {
        validate_collection_name(collection)?;
        let _guard = self.write_lock.lock().await;

        let mut document = self.file.load().await?;
        let id = document.allocate_id(collection)?;

        let mut record = Record::new();
        record.insert(ID_FIELD.to_string(), id.into());
        for (key, value) in fields {
            if key != ID_FIELD {
                record.insert(key, value);
            }
        }

        document.records_mut(collection).push(record.clone());
        self.file.save(&document).await?;

        debug!(collection, %id, "record created");
        Ok(record)
    }

    /// Shallow-merge `patch` over the record with `id`.
    ///
    /// Fields absent from `patch` are kept; fields present replace the old
    /// value wholesale. The `id` field cannot be patched. Returns `None`
    /// without writing when no record has that id.
    pub async fn update(
        &self,
        collection: &str,
        id: RecordId,
        patch: Record,
    ) -> Result<Option<Record>> {
        validate_collection_name(collection)?;
        let _guard = self.write_lock.lock().await;

        let mut document = self.file.load().await?;
        let Some(record) = document
            .existing_records_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| RecordId::of(r) == Some(id)))
        else {
            debug!(collection, %id, "update target missing");
            return Ok(None);
        };

        for (key, value) in patch {
            if key != ID_FIELD {
                record.insert(key, value);
            }
        }
        let updated = record.clone();

        self.file.save(&document).await?;

        debug!(collection, %id, "record updated");
        Ok(Some(updated))
    }

    /// Remove the record with `id`. Writes only when something was removed.
    pub async fn delete(&self, collection: &str, id: RecordId) -> Result<bool> {
        validate_collection_name(collection)?;
        let _guard = self.write_lock.lock().await;

        let mut document = self.file.load().await?;
        let removed = match document.existing_records_mut(collection) {
            Some(records) => {
                let before = records.len();
                records.retain(|record| RecordId::of(record) != Some(id));
                records.len() != before
            }
            None => false,
        };

        if removed {
            self.file.save(&document).await?;
            debug!(collection, %id, "record deleted");
        }

        Ok(removed)
    }

    /// Names of the collections present in the document.
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        let document = self.file.load().await?;
        Ok(document.collection_names())
    }

    pub async fn count(&self, collection: &str) -> Result<usize> {
        validate_collection_name(collection)?;
        let document = self.file.load().await?;
        Ok(document.records(collection).len())
    }

    /// Snapshot of the full document, mainly for inspection and tests.
    pub async fn document(&self) -> Result<Document> {
        self.file.load().await
    }
}

fn matches_all(record: &Record, predicate: &Record) -> bool {
    predicate
        .iter()
        .all(|(key, expected)| record.get(key) == Some(expected))
}
