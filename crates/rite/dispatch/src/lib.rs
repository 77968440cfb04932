//! Rite Dispatch - the write path of the ledger.
//!
//! Validates an incoming action against the registry, assigns a dispatch
//! identifier, and commits an immutable entry. Validation is fail-fast in
//! a fixed order; on any failure the ledger is left untouched.

#![deny(unsafe_code)]

use chrono::Utc;
use rite_idgen::IdGenerator;
use rite_ledger::{DispatchLedger, LedgerError};
use rite_registry::{RealmStatus, RegistryError, RegistryStore};
use rite_types::{
    compute_entry_hash, DispatchId, EntryLink, GovernanceStamp, HashError, LedgerEntry, SealLevel,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Maximum serialized size of an input payload. Payloads are opaque to the
/// ledger beyond this bound.
pub const MAX_INPUT_BYTES: usize = 64 * 1024;

/// An action submission.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub actor: String,
    pub realm: String,
    pub capsule: String,
    pub intent: String,
    /// Defaults to the capsule's minimum seal level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal_level: Option<SealLevel>,
    pub input: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<EntryLink>,
}

/// Returned to the caller after a durable commit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DispatchReceipt {
    pub dispatch_id: DispatchId,
    pub summary: String,
}

/// The dispatch processor.
pub struct DispatchProcessor {
    registry: Arc<RegistryStore>,
    ledger: Arc<DispatchLedger>,
    ids: Arc<IdGenerator>,
}

impl DispatchProcessor {
    pub fn new(
        registry: Arc<RegistryStore>,
        ledger: Arc<DispatchLedger>,
        ids: Arc<IdGenerator>,
    ) -> Self {
        Self {
            registry,
            ledger,
            ids,
        }
    }

    /// Validate and durably commit a submission.
    ///
    /// Validation order (first failure wins): actor, capsule, realm,
    /// authority, intent, payload bound. The entry is committed before this
    /// returns; a failure returns a structured error and appends nothing.
    pub async fn submit(&self, request: DispatchRequest) -> Result<DispatchReceipt, DispatchError> {
        let actor = self
            .registry
            .get_actor(&request.actor)?
            .filter(|a| a.active)
            .ok_or_else(|| DispatchError::UnknownActor(request.actor.clone()))?;

        let capsule = self
            .registry
            .get_capsule(&request.capsule)?
            .filter(|c| c.active)
            .ok_or_else(|| DispatchError::UnknownCapsule(request.capsule.clone()))?;

        // Unregistered realms pass as freeform tags; a deactivated
        // registered realm does not.
        if self.registry.realm_status(&request.realm)? == RealmStatus::Inactive {
            return Err(DispatchError::UnknownRealm(request.realm.clone()));
        }

        let seal_level = request.seal_level.unwrap_or(capsule.min_seal_level);
        if !self
            .registry
            .is_permitted(&actor.name, &capsule.name, seal_level)?
        {
            warn!(
                actor = %actor.name,
                capsule = %capsule.name,
                seal = %seal_level,
                "Dispatch rejected: insufficient authority"
            );
            return Err(DispatchError::InsufficientAuthority {
                actor: actor.name,
                capsule: capsule.name,
                requested: seal_level,
            });
        }

        let intent = request.intent.trim();
        if intent.is_empty() {
            return Err(DispatchError::InvalidIntent);
        }

        let input_len = serde_json::to_vec(&request.input)
            .map_err(|e| DispatchError::Hash(HashError::Serialization(e.to_string())))?
            .len();
        if input_len > MAX_INPUT_BYTES {
            return Err(DispatchError::PayloadTooLarge {
                size: input_len,
                limit: MAX_INPUT_BYTES,
            });
        }

        let dispatch_id = self.ids.next_dispatch();
        let timestamp = Utc::now();
        let audit_required = capsule.audit_required || seal_level >= SealLevel::Immutable;
        let summary = format!(
            "{} performed {} via {} in {} under {} seal",
            actor.name, intent, capsule.name, request.realm, seal_level
        );
        let output = serde_json::json!({ "summary": summary });
        let governance = GovernanceStamp {
            seal_level,
            audit_required,
        };

        let content_hash = compute_entry_hash(
            &dispatch_id,
            timestamp,
            &actor.name,
            &request.realm,
            &capsule.name,
            intent,
            &request.input,
            &output,
            &governance,
            &request.links,
        )?;

        let entry = LedgerEntry {
            dispatch_id: dispatch_id.clone(),
            timestamp,
            actor: actor.name.clone(),
            realm: request.realm,
            capsule: capsule.name.clone(),
            intent: intent.to_string(),
            input: request.input,
            output,
            governance,
            links: request.links,
            content_hash,
        };

        self.ledger.append(entry).await?;
        info!(
            dispatch_id = %dispatch_id,
            actor = %actor.name,
            capsule = %capsule.name,
            seal = %seal_level,
            "Dispatch committed"
        );

        Ok(DispatchReceipt {
            dispatch_id,
            summary,
        })
    }
}

/// Dispatch validation and commit errors.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown or inactive actor: {0}")]
    UnknownActor(String),

    #[error("unknown or inactive capsule: {0}")]
    UnknownCapsule(String),

    #[error("deactivated realm: {0}")]
    UnknownRealm(String),

    #[error("actor {actor} may not use capsule {capsule} at seal level {requested}")]
    InsufficientAuthority {
        actor: String,
        capsule: String,
        requested: SealLevel,
    },

    #[error("intent must be non-empty")]
    InvalidIntent,

    #[error("input payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("hash error: {0}")]
    Hash(#[from] HashError),
}
