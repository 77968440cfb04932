//! Rite Service - the unified ceremonial dispatch ledger.
//!
//! This is the request/response surface external callers (CLIs, dashboards,
//! automation) consume. It wires the registry, identifier generator, and
//! durable stores into the four operations of the ledger: submit dispatch,
//! generate replay, audit, and grant honor. Callers own transport-level
//! concerns such as timeouts and cancellation.

#![deny(unsafe_code)]

use rite_audit::{AuditError, AuditReport, AuditVerifier};
use rite_dispatch::{DispatchError, DispatchProcessor, DispatchReceipt, DispatchRequest};
use rite_honor::{GrantRequest, HonorError, HonorRoll};
use rite_idgen::IdGenerator;
use rite_ledger::{DispatchLedger, LedgerError, LedgerStatistics};
use rite_registry::{RegistryError, RegistrySnapshot, RegistryStore};
use rite_replay::{ReplayError, ReplayGenerator};
use rite_storage::memory::InMemoryRiteStorage;
use rite_storage::{QueryWindow, RiteStorage};
use rite_types::{DispatchId, HonorAward, LedgerEntry, Replay, ReplayId};
use std::sync::Arc;
use thiserror::Error;

/// The ceremonial dispatch ledger service.
pub struct RiteService {
    registry: Arc<RegistryStore>,
    ledger: Arc<DispatchLedger>,
    processor: DispatchProcessor,
    replays: ReplayGenerator,
    auditor: AuditVerifier,
    honors: HonorRoll,
}

impl RiteService {
    /// Create a service backed by in-memory storage and an empty registry.
    pub fn new() -> Self {
        Self::with_storage(Arc::new(InMemoryRiteStorage::new()))
    }

    /// Create a service over an explicit storage adapter.
    pub fn with_storage<S: RiteStorage + 'static>(storage: Arc<S>) -> Self {
        Self::with_components(
            Arc::new(RegistryStore::new()),
            storage,
            Arc::new(IdGenerator::new()),
        )
    }

    /// Create a service from explicit components.
    pub fn with_components<S: RiteStorage + 'static>(
        registry: Arc<RegistryStore>,
        storage: Arc<S>,
        ids: Arc<IdGenerator>,
    ) -> Self {
        let ledger = Arc::new(DispatchLedger::with_store(storage.clone()));
        let processor = DispatchProcessor::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            Arc::clone(&ids),
        );
        let replays = ReplayGenerator::new(
            Arc::clone(&registry),
            Arc::clone(&ledger),
            storage.clone(),
            Arc::clone(&ids),
        );
        let auditor = AuditVerifier::new(Arc::clone(&registry), Arc::clone(&ledger));
        let honors = HonorRoll::new(Arc::clone(&registry), storage, ids);

        Self {
            registry,
            ledger,
            processor,
            replays,
            auditor,
            honors,
        }
    }

    // ============ Write path ============

    /// Submit an action for validation and durable commit.
    pub async fn submit_dispatch(
        &self,
        request: DispatchRequest,
    ) -> Result<DispatchReceipt, RiteError> {
        Ok(self.processor.submit(request).await?)
    }

    /// Grant an honor award.
    pub async fn grant_honor(&self, request: GrantRequest) -> Result<HonorAward, RiteError> {
        Ok(self.honors.grant(request).await?)
    }

    // ============ Read paths ============

    /// Produce and persist a replay of a committed dispatch.
    pub async fn generate_replay(&self, source: &DispatchId) -> Result<Replay, RiteError> {
        Ok(self.replays.replay(source).await?)
    }

    /// Report presence and consistency for a dispatch identifier.
    pub async fn audit(&self, id: &DispatchId) -> Result<AuditReport, RiteError> {
        Ok(self.auditor.audit(id).await?)
    }

    pub async fn get_dispatch(&self, id: &DispatchId) -> Result<Option<LedgerEntry>, RiteError> {
        Ok(self.ledger.get(id).await?)
    }

    pub async fn get_replay(&self, id: &ReplayId) -> Result<Option<Replay>, RiteError> {
        Ok(self.replays.get(id).await?)
    }

    /// All replays of one source dispatch, oldest first.
    pub async fn replay_history(&self, source: &DispatchId) -> Result<Vec<Replay>, RiteError> {
        Ok(self.replays.history(source).await?)
    }

    pub async fn list_dispatches(
        &self,
        window: QueryWindow,
    ) -> Result<Vec<LedgerEntry>, RiteError> {
        Ok(self.ledger.list(window).await?)
    }

    /// Awards in timestamp-ascending order, optionally for one recipient.
    pub async fn list_honors(
        &self,
        recipient: Option<&str>,
    ) -> Result<Vec<HonorAward>, RiteError> {
        Ok(self.honors.list(recipient).await?)
    }

    pub async fn ledger_statistics(&self) -> Result<LedgerStatistics, RiteError> {
        Ok(self.ledger.statistics().await?)
    }

    // ============ Registry administration ============

    /// Replace the registry contents wholesale.
    pub fn reload_registry(&self, snapshot: RegistrySnapshot) -> Result<(), RiteError> {
        Ok(self.registry.reload(snapshot)?)
    }

    /// Access the governance registry.
    pub fn registry(&self) -> &RegistryStore {
        &self.registry
    }

    /// Access the dispatch ledger.
    pub fn ledger(&self) -> &DispatchLedger {
        &self.ledger
    }
}

impl Default for RiteService {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified service errors.
#[derive(Debug, Error)]
pub enum RiteError {
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("replay error: {0}")]
    Replay(#[from] ReplayError),

    #[error("audit error: {0}")]
    Audit(#[from] AuditError),

    #[error("honor error: {0}")]
    Honor(#[from] HonorError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}
