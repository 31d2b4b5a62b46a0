//! The ledger document: a JSON object mapping user id strings to accounts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use coffer_ledger::{AccountStore, StoreError};
use coffer_types::{Account, UserId};

use crate::file::{read_optional, write_json_atomic};

/// [`AccountStore`] backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonAccountStore {
    path: PathBuf,
}

impl JsonAccountStore {
    /// Bind a store to `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AccountStore for JsonAccountStore {
    fn load(&self) -> Result<BTreeMap<UserId, Account>, StoreError> {
        let Some(text) = read_optional(&self.path)? else {
            tracing::info!(path = %self.path.display(), "no ledger document yet, starting empty");
            return Ok(BTreeMap::new());
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|source| StoreError::Serialization {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, document: &BTreeMap<UserId, Account>) -> Result<(), StoreError> {
        write_json_atomic(&self.path, document)
    }
}
