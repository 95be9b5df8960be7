//! Salesforce access: OAuth password-grant login plus Apex REST calls.

use crate::domain::error::CrmResult;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value as JsonValue;

pub mod auth;
pub mod client;

pub use auth::{CachedCredentials, CredentialCache};
pub use client::SalesforceClient;

/// Session returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub instance_url: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("instance_url", &self.instance_url)
            .finish()
    }
}

/// The capability the delegate needs from a remote CRM.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Logs in (or returns the cached session).
    async fn authenticate(&self) -> CrmResult<Credentials>;

    /// Calls `{apex root}[/path][?query]` and returns the decoded JSON body.
    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
        query: Option<&[(String, String)]>,
    ) -> CrmResult<JsonValue>;
}
