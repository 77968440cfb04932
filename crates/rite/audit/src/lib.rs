//! Rite Audit - read-only verification of committed dispatches.
//!
//! An audit answers two questions without persisting anything: is the
//! dispatch present, and is it still consistent with the current registry?
//! "Consistent" models governance drift: an action once lawful may later
//! be flagged when its actor or capsule is deactivated or its seal level
//! no longer falls inside the permitted window. History is never altered.
//!
//! The consistency assessment lives here and is shared with the replay
//! generator, which persists the same verdict as a derived record.

#![deny(unsafe_code)]

use rite_ledger::{DispatchLedger, LedgerError};
use rite_registry::{RegistryError, RegistryStore};
use rite_types::{DispatchId, HashError, LedgerEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Outcome of re-checking one entry against current governance state.
#[derive(Clone, Debug)]
pub struct ConsistencyReport {
    pub consistent: bool,
    pub notes: Vec<String>,
}

/// Re-derive an entry's governance verdict against the *current* registry
/// and verify its stored content hash.
pub fn assess_entry(
    registry: &RegistryStore,
    entry: &LedgerEntry,
) -> Result<ConsistencyReport, AuditError> {
    let mut notes = Vec::new();

    if !registry.is_permitted(&entry.actor, &entry.capsule, entry.governance.seal_level)? {
        notes.push(format!(
            "actor {} is no longer permitted to use capsule {} at seal level {}",
            entry.actor, entry.capsule, entry.governance.seal_level
        ));
    }

    if !entry.verify_hash()? {
        notes.push(format!(
            "content hash mismatch for {}: stored record differs from committed fields",
            entry.dispatch_id
        ));
    }

    Ok(ConsistencyReport {
        consistent: notes.is_empty(),
        notes,
    })
}

/// Result of an audit query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditReport {
    pub present: bool,
    /// `None` when the dispatch is absent.
    pub consistent: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// The audit verifier. Pure read path; no persistence side effects.
pub struct AuditVerifier {
    registry: Arc<RegistryStore>,
    ledger: Arc<DispatchLedger>,
}

impl AuditVerifier {
    pub fn new(registry: Arc<RegistryStore>, ledger: Arc<DispatchLedger>) -> Self {
        Self { registry, ledger }
    }

    /// Report presence and current consistency for a dispatch identifier.
    pub async fn audit(&self, id: &DispatchId) -> Result<AuditReport, AuditError> {
        let Some(entry) = self.ledger.get(id).await? else {
            return Ok(AuditReport {
                present: false,
                consistent: None,
                notes: vec![],
            });
        };

        let report = assess_entry(&self.registry, &entry)?;
        Ok(AuditReport {
            present: true,
            consistent: Some(report.consistent),
            notes: report.notes,
        })
    }
}

/// Audit-related errors.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("hash error: {0}")]
    Hash(#[from] HashError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rite_registry::{Actor, Capsule, RegistrySnapshot};
    use rite_types::{GovernanceStamp, SealLevel};

    fn registry() -> Arc<RegistryStore> {
        Arc::new(RegistryStore::from_snapshot(RegistrySnapshot {
            actors: vec![Actor {
                name: "Custodian".to_string(),
                max_seal_level: SealLevel::Eternal,
                active: true,
            }],
            capsules: vec![Capsule {
                name: "SovereignCrown".to_string(),
                min_seal_level: SealLevel::Temporal,
                audit_required: false,
                active: true,
            }],
            realms: vec![],
        }))
    }

    fn entry(id: &str) -> LedgerEntry {
        let mut entry = LedgerEntry {
            dispatch_id: DispatchId::new(id),
            timestamp: Utc::now(),
            actor: "Custodian".to_string(),
            realm: "Planetary:Jackson-NC".to_string(),
            capsule: "SovereignCrown".to_string(),
            intent: "Reasoning.Replay.Audit".to_string(),
            input: serde_json::json!({"prompt": "test"}),
            output: serde_json::json!({"summary": "ok"}),
            governance: GovernanceStamp {
                seal_level: SealLevel::Temporal,
                audit_required: false,
            },
            links: vec![],
            content_hash: String::new(),
        };
        entry.content_hash = entry.compute_hash().unwrap();
        entry
    }

    #[tokio::test]
    async fn committed_entry_audits_present_and_consistent() {
        let registry = registry();
        let ledger = Arc::new(DispatchLedger::new());
        ledger.append(entry("RITE-2026-01-05-0a1b2c3d")).await.unwrap();

        let verifier = AuditVerifier::new(registry, ledger);
        let report = verifier
            .audit(&DispatchId::new("RITE-2026-01-05-0a1b2c3d"))
            .await
            .unwrap();
        assert!(report.present);
        assert_eq!(report.consistent, Some(true));
        assert!(report.notes.is_empty());
    }

    #[tokio::test]
    async fn absent_entry_audits_not_present() {
        let verifier = AuditVerifier::new(registry(), Arc::new(DispatchLedger::new()));
        let report = verifier
            .audit(&DispatchId::new("RITE-2026-01-05-ffffffff"))
            .await
            .unwrap();
        assert!(!report.present);
        assert_eq!(report.consistent, None);
    }

    #[tokio::test]
    async fn actor_deactivation_flags_governance_drift() {
        let registry = registry();
        let ledger = Arc::new(DispatchLedger::new());
        ledger.append(entry("RITE-2026-01-05-0a1b2c3d")).await.unwrap();

        registry.deactivate_actor("Custodian").unwrap();

        let verifier = AuditVerifier::new(registry, ledger);
        let report = verifier
            .audit(&DispatchId::new("RITE-2026-01-05-0a1b2c3d"))
            .await
            .unwrap();
        assert!(report.present);
        assert_eq!(report.consistent, Some(false));
        assert!(!report.notes.is_empty());
    }

    #[tokio::test]
    async fn tampered_entry_is_inconsistent() {
        let registry = registry();
        let ledger = Arc::new(DispatchLedger::new());
        let mut tampered = entry("RITE-2026-01-05-0a1b2c3d");
        tampered.intent = "Reasoning.Replay.Forged".to_string();
        // hash was computed before the mutation above
        ledger.append(tampered).await.unwrap();

        let verifier = AuditVerifier::new(registry, ledger);
        let report = verifier
            .audit(&DispatchId::new("RITE-2026-01-05-0a1b2c3d"))
            .await
            .unwrap();
        assert_eq!(report.consistent, Some(false));
        assert!(report.notes.iter().any(|n| n.contains("hash")));
    }
}
