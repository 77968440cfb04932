//! Rite Honor - the award roll.
//!
//! A parallel append-only store of honor awards, keyed by recipient. The
//! registry is consulted only to validate that the recipient exists and is
//! active; awards never feed back into dispatch governance.

#![deny(unsafe_code)]

use chrono::Utc;
use rite_idgen::IdGenerator;
use rite_registry::{RegistryError, RegistryStore};
use rite_storage::{HonorStore, StorageError};
use rite_types::{HonorAward, HonorId, SealLevel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request to grant an honor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GrantRequest {
    pub recipient: String,
    pub achievement: String,
    pub seal_level: SealLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verification_refs: Vec<String>,
}

/// The honor roll.
pub struct HonorRoll {
    registry: Arc<RegistryStore>,
    store: Arc<dyn HonorStore>,
    ids: Arc<IdGenerator>,
}

impl HonorRoll {
    pub fn new(
        registry: Arc<RegistryStore>,
        store: Arc<dyn HonorStore>,
        ids: Arc<IdGenerator>,
    ) -> Self {
        Self {
            registry,
            store,
            ids,
        }
    }

    /// Validate and append an immutable award.
    pub async fn grant(&self, request: GrantRequest) -> Result<HonorAward, HonorError> {
        let recipient = self
            .registry
            .get_actor(&request.recipient)?
            .filter(|a| a.active)
            .ok_or_else(|| HonorError::UnknownRecipient(request.recipient.clone()))?;

        let achievement = request.achievement.trim();
        if achievement.is_empty() {
            return Err(HonorError::InvalidAchievement);
        }

        let award = HonorAward {
            honor_id: self.ids.next_honor(),
            recipient: recipient.name,
            achievement: achievement.to_string(),
            seal_level: request.seal_level,
            timestamp: Utc::now(),
            verification_refs: request.verification_refs,
        };

        self.store.append_honor(award.clone()).await?;
        info!(
            honor_id = %award.honor_id,
            recipient = %award.recipient,
            "Honor granted"
        );
        Ok(award)
    }

    /// Fetch one award.
    pub async fn get(&self, id: &HonorId) -> Result<Option<HonorAward>, HonorError> {
        Ok(self.store.get_honor(id).await?)
    }

    /// Awards in timestamp-ascending order, optionally for one recipient.
    pub async fn list(&self, recipient: Option<&str>) -> Result<Vec<HonorAward>, HonorError> {
        Ok(self.store.list_honors(recipient).await?)
    }
}

/// Honor-related errors.
#[derive(Debug, Error)]
pub enum HonorError {
    #[error("unknown or inactive recipient: {0}")]
    UnknownRecipient(String),

    #[error("achievement must be non-empty")]
    InvalidAchievement,

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rite_registry::{Actor, RegistrySnapshot};
    use rite_storage::InMemoryRiteStorage;

    fn roll() -> HonorRoll {
        let registry = Arc::new(RegistryStore::from_snapshot(RegistrySnapshot {
            actors: vec![
                Actor {
                    name: "Custodian".to_string(),
                    max_seal_level: SealLevel::Eternal,
                    active: true,
                },
                Actor {
                    name: "Herald".to_string(),
                    max_seal_level: SealLevel::Temporal,
                    active: true,
                },
            ],
            capsules: vec![],
            realms: vec![],
        }));
        HonorRoll::new(
            registry,
            Arc::new(InMemoryRiteStorage::new()),
            Arc::new(IdGenerator::new()),
        )
    }

    fn request(recipient: &str) -> GrantRequest {
        GrantRequest {
            recipient: recipient.to_string(),
            achievement: "First verified replay".to_string(),
            seal_level: SealLevel::Eternal,
            verification_refs: vec!["RITE-2026-01-05-0a1b2c3d".to_string()],
        }
    }

    #[tokio::test]
    async fn grant_then_get_round_trips() {
        let roll = roll();
        let award = roll.grant(request("Custodian")).await.unwrap();
        assert!(award.honor_id.0.starts_with("HNR-"));

        let loaded = roll.get(&award.honor_id).await.unwrap().unwrap();
        assert_eq!(loaded.recipient, "Custodian");
        assert_eq!(loaded.verification_refs.len(), 1);
    }

    #[tokio::test]
    async fn unknown_recipient_is_rejected() {
        let roll = roll();
        let result = roll.grant(request("GhostUser")).await;
        assert!(matches!(result, Err(HonorError::UnknownRecipient(_))));
    }

    #[tokio::test]
    async fn blank_achievement_is_rejected() {
        let roll = roll();
        let mut bad = request("Custodian");
        bad.achievement = "  ".to_string();
        let result = roll.grant(bad).await;
        assert!(matches!(result, Err(HonorError::InvalidAchievement)));
    }

    #[tokio::test]
    async fn listing_filters_by_recipient_in_order() {
        let roll = roll();
        roll.grant(request("Custodian")).await.unwrap();
        roll.grant(request("Herald")).await.unwrap();
        roll.grant(request("Custodian")).await.unwrap();

        let custodian = roll.list(Some("Custodian")).await.unwrap();
        assert_eq!(custodian.len(), 2);
        assert!(custodian[0].timestamp <= custodian[1].timestamp);

        let all = roll.list(None).await.unwrap();
        assert_eq!(all.len(), 3);
    }
}
