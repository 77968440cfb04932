//! Rite Ledger - the append-only accountability view over dispatch storage.
//!
//! This crate provides the ledger-facing API while delegating persistence
//! to `rite-storage`. Entries are immutable once appended; there is no
//! update-in-place operation anywhere on this surface. Corrections are new
//! entries carrying a `links` back-reference.

#![deny(unsafe_code)]

use rite_storage::memory::InMemoryRiteStorage;
use rite_storage::{DispatchStore, QueryWindow, StorageError};
use rite_types::{DispatchId, LedgerEntry, SealLevel};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// The dispatch ledger facade.
pub struct DispatchLedger {
    store: Arc<dyn DispatchStore>,
}

impl DispatchLedger {
    /// Create a ledger backed by in-memory storage.
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryRiteStorage::new()),
        }
    }

    /// Create a ledger backed by an explicit storage adapter.
    pub fn with_store(store: Arc<dyn DispatchStore>) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    pub fn store(&self) -> Arc<dyn DispatchStore> {
        Arc::clone(&self.store)
    }

    /// Append a committed entry. The entry is durable when this returns.
    pub async fn append(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        let dispatch_id = entry.dispatch_id.clone();
        self.store.append_dispatch(entry).await?;
        info!(dispatch_id = %dispatch_id, "Ledger entry committed");
        Ok(())
    }

    /// Get an entry by dispatch identifier.
    pub async fn get(&self, id: &DispatchId) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self.store.get_dispatch(id).await?)
    }

    /// Get an entry, treating absence as an error.
    pub async fn require(&self, id: &DispatchId) -> Result<LedgerEntry, LedgerError> {
        self.get(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(id.0.clone()))
    }

    /// List entries, oldest identifier first.
    pub async fn list(&self, window: QueryWindow) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.store.list_dispatches(window).await?)
    }

    /// Aggregate counts over the whole ledger.
    pub async fn statistics(&self) -> Result<LedgerStatistics, LedgerError> {
        let entries = self.list(QueryWindow::default()).await?;

        let total_dispatches = entries.len();
        let mut by_seal_level: HashMap<SealLevel, usize> = HashMap::new();
        let mut by_capsule: HashMap<String, usize> = HashMap::new();
        let mut audit_required = 0;

        for entry in entries {
            *by_seal_level.entry(entry.governance.seal_level).or_insert(0) += 1;
            *by_capsule.entry(entry.capsule).or_insert(0) += 1;
            if entry.governance.audit_required {
                audit_required += 1;
            }
        }

        Ok(LedgerStatistics {
            total_dispatches,
            by_seal_level,
            by_capsule,
            audit_required,
        })
    }
}

impl Default for DispatchLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate ledger counts.
#[derive(Clone, Debug)]
pub struct LedgerStatistics {
    pub total_dispatches: usize,
    pub by_seal_level: HashMap<SealLevel, usize>,
    pub by_capsule: HashMap<String, usize>,
    pub audit_required: usize,
}

/// Ledger-related errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("dispatch not found: {0}")]
    NotFound(String),

    #[error("duplicate dispatch identifier: {0}")]
    DuplicateId(String),

    /// The durable store cannot be read or written; callers may retry.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("storage error: {0}")]
    Backend(String),
}

impl From<StorageError> for LedgerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NotFound(msg) => Self::NotFound(msg),
            StorageError::Conflict(msg) => Self::DuplicateId(msg),
            StorageError::Unavailable(msg) => Self::Unavailable(msg),
            StorageError::InvalidInput(msg) | StorageError::Serialization(msg) => {
                Self::Backend(msg)
            }
        }
    }
}
