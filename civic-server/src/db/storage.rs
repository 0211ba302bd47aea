//! redb-based document store
//!
//! # Tables
//!
//! One table per collection, `key = 24-hex id`, `value = JSON-serialized record`.
//!
//! | Table | Record |
//! |-------|--------|
//! | `incidents` | `Incident` |
//! | `tickets` | `Ticket` |
//! | `messages` | `Message` |
//! | `users` | `User` |
//! | `password_resets` | `PasswordReset` |
//!
//! # Atomicity
//!
//! Every mutating call runs in its own write transaction. `update` reads,
//! mutates and writes the document inside that transaction, so a single
//! document update is atomic. `insert_with` writes two documents of
//! different collections in one transaction. Nothing is cached across calls.

use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Collection names created on open
pub const COLLECTIONS: [&str; 5] = [
    "incidents",
    "tickets",
    "messages",
    "users",
    "password_resets",
];

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A typed record stored in its own table
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Table name, one of [`COLLECTIONS`]
    const TABLE: &'static str;

    fn id(&self) -> &str;
}

fn table_def(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

/// Document store backed by redb
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open or create the database at the given path
    ///
    /// Parent directories are created as needed.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests and tools)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        for name in COLLECTIONS {
            let _ = write_txn.open_table(table_def(name))?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Typed handle on one collection
    pub fn collection<T: Document>(&self) -> Collection<T> {
        Collection {
            db: self.db.clone(),
            _marker: PhantomData,
        }
    }
}

/// Typed view over one table
pub struct Collection<T> {
    db: Arc<Database>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> Collection<T> {
    /// Insert or replace a document under its id
    pub fn insert(&self, doc: &T) -> StorageResult<()> {
        let json = serde_json::to_vec(doc)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(table_def(T::TABLE))?;
            table.insert(doc.id(), json.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Insert `doc` and a companion document of another collection together
    ///
    /// Both are serialized before the transaction opens; on any error
    /// neither is written.
    pub fn insert_with<U: Document>(&self, doc: &T, companion: &U) -> StorageResult<()> {
        let json = serde_json::to_vec(doc)?;
        let companion_json = serde_json::to_vec(companion)?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(table_def(T::TABLE))?;
            table.insert(doc.id(), json.as_slice())?;
            let mut other = txn.open_table(table_def(U::TABLE))?;
            other.insert(companion.id(), companion_json.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Get a document by id
    pub fn get(&self, id: &str) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table_def(T::TABLE))?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All documents matching `pred`, in key order
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table_def(T::TABLE))?;
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let doc: T = serde_json::from_slice(value.value())?;
            if pred(&doc) {
                out.push(doc);
            }
        }
        Ok(out)
    }

    /// All documents matching `pred`, sorted by `cmp`
    pub fn find_sorted(
        &self,
        pred: impl Fn(&T) -> bool,
        cmp: impl FnMut(&T, &T) -> Ordering,
    ) -> StorageResult<Vec<T>> {
        let mut docs = self.find(pred)?;
        docs.sort_by(cmp);
        Ok(docs)
    }

    /// First document matching `pred`
    pub fn find_one(&self, pred: impl Fn(&T) -> bool) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table_def(T::TABLE))?;
        for entry in table.iter()? {
            let (_, value) = entry?;
            let doc: T = serde_json::from_slice(value.value())?;
            if pred(&doc) {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    /// Read-modify-write one document atomically
    ///
    /// Returns the updated document, or `None` when the id is unknown.
    pub fn update(&self, id: &str, mutate: impl FnOnce(&mut T)) -> StorageResult<Option<T>> {
        let txn = self.db.begin_write()?;
        let updated = {
            let mut table = txn.open_table(table_def(T::TABLE))?;
            let current: Option<T> = match table.get(id)? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };
            match current {
                Some(mut doc) => {
                    mutate(&mut doc);
                    let json = serde_json::to_vec(&doc)?;
                    table.insert(id, json.as_slice())?;
                    Some(doc)
                }
                None => None,
            }
        };
        txn.commit()?;
        Ok(updated)
    }

    /// Apply `mutate` to every document matching `pred` in one transaction
    ///
    /// Returns the number of documents written.
    pub fn update_where(
        &self,
        pred: impl Fn(&T) -> bool,
        mut mutate: impl FnMut(&mut T),
    ) -> StorageResult<usize> {
        let txn = self.db.begin_write()?;
        let count = {
            let mut table = txn.open_table(table_def(T::TABLE))?;
            let mut matched = Vec::new();
            for entry in table.iter()? {
                let (_, value) = entry?;
                let doc: T = serde_json::from_slice(value.value())?;
                if pred(&doc) {
                    matched.push(doc);
                }
            }
            for doc in matched.iter_mut() {
                mutate(doc);
                let json = serde_json::to_vec(&*doc)?;
                table.insert(doc.id(), json.as_slice())?;
            }
            matched.len()
        };
        txn.commit()?;
        Ok(count)
    }

    /// Delete by id; `true` when a document was removed
    pub fn delete(&self, id: &str) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(table_def(T::TABLE))?;
            table.remove(id)?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }

    /// Delete every document matching `pred`; returns the count removed
    pub fn delete_where(&self, pred: impl Fn(&T) -> bool) -> StorageResult<usize> {
        let txn = self.db.begin_write()?;
        let count = {
            let mut table = txn.open_table(table_def(T::TABLE))?;
            let mut ids = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let doc: T = serde_json::from_slice(value.value())?;
                if pred(&doc) {
                    ids.push(key.value().to_string());
                }
            }
            for id in &ids {
                table.remove(id.as_str())?;
            }
            ids.len()
        };
        txn.commit()?;
        Ok(count)
    }

    /// Count documents matching `pred`
    pub fn count(&self, pred: impl Fn(&T) -> bool) -> StorageResult<u64> {
        Ok(self.find(pred)?.len() as u64)
    }

    /// Total documents in the table
    pub fn len(&self) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table_def(T::TABLE))?;
        Ok(table.len()?)
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        owner: String,
        body: String,
    }

    impl Document for Note {
        const TABLE: &'static str = "messages";

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, owner: &str, body: &str) -> Note {
        Note {
            id: id.into(),
            owner: owner.into(),
            body: body.into(),
        }
    }

    #[test]
    fn test_insert_get() {
        let store = Store::open_in_memory().unwrap();
        let notes = store.collection::<Note>();
        assert!(notes.get("a").unwrap().is_none());

        notes.insert(&note("a", "u1", "hello")).unwrap();
        assert_eq!(notes.get("a").unwrap(), Some(note("a", "u1", "hello")));
        assert_eq!(notes.len().unwrap(), 1);
    }

    #[test]
    fn test_find_and_count() {
        let store = Store::open_in_memory().unwrap();
        let notes = store.collection::<Note>();
        notes.insert(&note("a", "u1", "x")).unwrap();
        notes.insert(&note("b", "u2", "y")).unwrap();
        notes.insert(&note("c", "u1", "z")).unwrap();

        let mine = notes.find(|n| n.owner == "u1").unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(notes.count(|n| n.owner == "u2").unwrap(), 1);
        assert_eq!(
            notes.find_one(|n| n.body == "z").unwrap().map(|n| n.id),
            Some("c".to_string())
        );

        let sorted = notes
            .find_sorted(|_| true, |a, b| b.id.cmp(&a.id))
            .unwrap();
        let ids: Vec<_> = sorted.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    /// Record whose serialization always fails
    struct Unwritable {
        id: String,
    }

    impl Serialize for Unwritable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("unwritable"))
        }
    }

    impl<'de> Deserialize<'de> for Unwritable {
        fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            String::deserialize(d).map(|id| Self { id })
        }
    }

    impl Document for Unwritable {
        const TABLE: &'static str = "tickets";

        fn id(&self) -> &str {
            &self.id
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Tag {
        id: String,
    }

    impl Document for Tag {
        const TABLE: &'static str = "tickets";

        fn id(&self) -> &str {
            &self.id
        }
    }

    #[test]
    fn test_insert_with_writes_both() {
        let store = Store::open_in_memory().unwrap();
        let notes = store.collection::<Note>();
        notes
            .insert_with(&note("a", "u1", "x"), &Tag { id: "t1".into() })
            .unwrap();
        assert!(notes.get("a").unwrap().is_some());
        assert_eq!(
            store.collection::<Tag>().get("t1").unwrap(),
            Some(Tag { id: "t1".into() })
        );
    }

    #[test]
    fn test_insert_with_writes_nothing_when_companion_fails() {
        let store = Store::open_in_memory().unwrap();
        let notes = store.collection::<Note>();
        let companion = Unwritable { id: "t1".into() };
        assert!(notes.insert_with(&note("a", "u1", "x"), &companion).is_err());
        assert!(notes.get("a").unwrap().is_none());
        assert!(notes.is_empty().unwrap());
        assert!(store.collection::<Tag>().is_empty().unwrap());
    }

    #[test]
    fn test_update() {
        let store = Store::open_in_memory().unwrap();
        let notes = store.collection::<Note>();
        notes.insert(&note("a", "u1", "x")).unwrap();

        let updated = notes.update("a", |n| n.body = "edited".into()).unwrap();
        assert_eq!(updated.unwrap().body, "edited");
        assert_eq!(notes.get("a").unwrap().unwrap().body, "edited");

        assert!(notes.update("missing", |n| n.body.clear()).unwrap().is_none());
    }

    #[test]
    fn test_update_where_and_delete_where() {
        let store = Store::open_in_memory().unwrap();
        let notes = store.collection::<Note>();
        notes.insert(&note("a", "u1", "x")).unwrap();
        notes.insert(&note("b", "u1", "y")).unwrap();
        notes.insert(&note("c", "u2", "z")).unwrap();

        let n = notes.update_where(|n| n.owner == "u1", |n| n.body = "bulk".into()).unwrap();
        assert_eq!(n, 2);
        assert_eq!(notes.count(|n| n.body == "bulk").unwrap(), 2);

        let removed = notes.delete_where(|n| n.owner == "u1").unwrap();
        assert_eq!(removed, 2);
        assert!(notes.find(|n| n.owner == "u1").unwrap().is_empty());
        assert_eq!(notes.len().unwrap(), 1);
    }

    #[test]
    fn test_delete() {
        let store = Store::open_in_memory().unwrap();
        let notes = store.collection::<Note>();
        notes.insert(&note("a", "u1", "x")).unwrap();
        assert!(notes.delete("a").unwrap());
        assert!(!notes.delete("a").unwrap());
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("civic.redb");
        {
            let store = Store::open(&path).unwrap();
            store.collection::<Note>().insert(&note("a", "u1", "x")).unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert!(store.collection::<Note>().get("a").unwrap().is_some());
    }
}
