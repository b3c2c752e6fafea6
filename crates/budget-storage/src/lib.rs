//! Budget ledger storage.
//!
//! The ledger reads through [`LedgerStore`] and writes only by committing a
//! [`ChangeSet`]. A change set is validated as a whole before any of it is
//! applied, so a rejected commit leaves the store exactly as it was.
//!
//! Backends:
//! - [`InMemoryLedgerStore`] for tests and embedded hosts
//! - [`FileLedgerStore`] which mirrors every commit to a checksummed JSON
//!   snapshot before making it visible in memory

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod changes;
mod error;
pub mod file;
pub mod memory;
mod state;
mod traits;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use changes::{ChangeSet, Write};
pub use error::{StorageError, StorageResult};
pub use file::FileLedgerStore;
pub use memory::InMemoryLedgerStore;
pub use state::LedgerState;
pub use traits::LedgerStore;

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LedgerStorageConfig {
    /// Process memory only.
    Memory,
    /// JSON snapshot on local disk, hydrated and verified on open.
    File { path: PathBuf },
}

impl LedgerStorageConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }
}

impl Default for LedgerStorageConfig {
    fn default() -> Self {
        Self::Memory
    }
}

/// Open the backend described by `config`.
pub fn open_store(config: &LedgerStorageConfig) -> StorageResult<Arc<dyn LedgerStore>> {
    match config {
        LedgerStorageConfig::Memory => Ok(Arc::new(InMemoryLedgerStore::new())),
        LedgerStorageConfig::File { path } => Ok(Arc::new(FileLedgerStore::open(path)?)),
    }
}
