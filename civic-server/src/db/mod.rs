//! Database layer
//!
//! - [`storage`]: redb document store and typed collections
//! - [`repository`]: per-entity repositories over the collections

pub mod repository;
pub mod storage;

pub use storage::{Collection, Document, Store, StorageError, StorageResult};
