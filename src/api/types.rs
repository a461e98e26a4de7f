//! Shared request state.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;

use crate::db::{sqlite, DatabaseError};
use crate::rag::embedding::Embedder;
use crate::safety::SafetyClassifier;

/// Opens a fresh connection per request. SQLite connections are cheap to
/// open and `rusqlite::Connection` is not `Sync`, so sharing one across
/// handlers would need a mutex that serializes all requests.
#[derive(Clone)]
pub struct DbHandle {
    path: PathBuf,
}

impl DbHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(&self) -> Result<Connection, DatabaseError> {
        sqlite::open_database(&self.path)
    }
}

/// State handed to every handler.
#[derive(Clone)]
pub struct ApiContext {
    pub db: DbHandle,
    pub embedder: Arc<dyn Embedder>,
    pub classifier: Arc<dyn SafetyClassifier>,
    /// Base64 server pepper for passcode hashing and audit IP hashing.
    /// `None` means share-pack creation and verification are unavailable.
    pub pepper: Option<String>,
}
