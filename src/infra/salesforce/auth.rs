//! Cached Salesforce session with an explicit expiry.

use crate::domain::error::CrmResult;
use crate::infra::salesforce::Credentials;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct CachedCredentials {
    pub credentials: Credentials,
    pub expires_at: DateTime<Utc>,
}

impl CachedCredentials {
    pub fn new(credentials: Credentials, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365));
        Self {
            credentials,
            expires_at: issued_at + ttl,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Holds at most one session. Refreshes are serialized so concurrent callers
/// share a single login.
pub struct CredentialCache {
    slot: Mutex<Option<CachedCredentials>>,
    ttl: Duration,
}

impl CredentialCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }

    /// Returns the cached session if still fresh, otherwise runs `refresh` and caches its result.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> CrmResult<Credentials>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = CrmResult<Credentials>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(cached) = slot.as_ref().filter(|c| c.is_fresh(Utc::now())) {
            return Ok(cached.credentials.clone());
        }
        let fresh = refresh().await?;
        *slot = Some(CachedCredentials::new(fresh.clone(), Utc::now(), self.ttl));
        Ok(fresh)
    }

    /// Drops the session if it still holds `stale_token`.
    pub async fn invalidate(&self, stale_token: &str) {
        let mut slot = self.slot.lock().await;
        if slot
            .as_ref()
            .is_some_and(|c| c.credentials.access_token == stale_token)
        {
            *slot = None;
        }
    }

    pub async fn current(&self) -> Option<CachedCredentials> {
        self.slot.lock().await.clone()
    }
}
