use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::identity::errors::StoreError;
use crate::domain::identity::ports::RevocationList;

/// Per-process revocation list keyed by JTI.
///
/// Entries are purged once the token they block would have expired on its own.
#[derive(Default)]
pub struct InMemoryRevocationList {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryRevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn revoke_at(&self, jti: &str, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries.write().await;
        entries.retain(|_, until| *until >= now);
        if expires_at < now {
            // Already unusable; nothing to track.
            return true;
        }
        entries.insert(jti.to_string(), expires_at).is_none()
    }

    async fn is_revoked_at(&self, jti: &str, now: DateTime<Utc>) -> bool {
        self.entries
            .read()
            .await
            .get(jti)
            .is_some_and(|until| *until >= now)
    }
}

#[async_trait]
impl RevocationList for InMemoryRevocationList {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<bool, StoreError> {
        let newly_revoked = self.revoke_at(jti, expires_at, Utc::now()).await;
        if newly_revoked {
            tracing::debug!(jti = %jti, until = %expires_at, "Token id revoked");
        }
        Ok(newly_revoked)
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, StoreError> {
        Ok(self.is_revoked_at(jti, Utc::now()).await)
    }
}
