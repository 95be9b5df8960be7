// Responsible for all communication with Salesforce.

use crate::domain::error::{CrmError, CrmResult};
use crate::infra::config::SalesforceConfig;
use crate::infra::salesforce::auth::CredentialCache;
use crate::infra::salesforce::{Credentials, RemoteApi};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, error, info};

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    instance_url: String,
}

enum Sent {
    Ok(JsonValue),
    Unauthorized,
}

/// Apex REST client with a cached OAuth session.
///
/// A `401` from Apex drops the cached session, logs in again and retries the
/// call once. Nothing else is retried.
pub struct SalesforceClient {
    http: reqwest::Client,
    config: SalesforceConfig,
    cache: CredentialCache,
}

impl SalesforceClient {
    pub fn new(config: SalesforceConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let cache = CredentialCache::new(config.token_ttl);
        Ok(Self { http, config, cache })
    }

    pub fn config(&self) -> &SalesforceConfig {
        &self.config
    }

    async fn login(&self) -> CrmResult<Credentials> {
        let url = format!("{}/services/oauth2/token", self.config.login_url);
        let password = format!("{}{}", self.config.password, self.config.security_token);
        let params = [
            ("grant_type", "password"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("username", self.config.username.as_str()),
            ("password", password.as_str()),
        ];

        let resp = self
            .http
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = upstream_message(status, &body);
            error!("Salesforce login failed ({}): {}", status, message);
            return Err(CrmError::remote(message));
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| CrmError::remote(format!("Invalid Salesforce token response: {}", e)))?;
        info!(instance_url = %token.instance_url, "authenticated with Salesforce");

        Ok(Credentials {
            access_token: token.access_token,
            instance_url: token.instance_url,
        })
    }

    fn apex_url(&self, instance_url: &str, path: &str) -> String {
        let path = path.trim_matches('/');
        let mut url = format!(
            "{}{}",
            instance_url.trim_end_matches('/'),
            self.config.apex_path
        );
        if !path.is_empty() {
            url.push('/');
            url.push_str(path);
        }
        url
    }

    async fn send(
        &self,
        creds: &Credentials,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
        query: Option<&[(String, String)]>,
    ) -> CrmResult<Sent> {
        let url = self.apex_url(&creds.instance_url, path);
        debug!(%method, %url, "calling Apex REST");

        let mut req = self
            .http
            .request(method, &url)
            .bearer_auth(&creds.access_token);
        if let Some(q) = query {
            req = req.query(q);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(transport_error)?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(Sent::Unauthorized);
        }

        let text = resp.text().await.map_err(transport_error)?;
        if !status.is_success() {
            let message = upstream_message(status, &text);
            error!("Salesforce API error ({}): {}", status, message);
            return Err(CrmError::remote(message));
        }

        if text.trim().is_empty() {
            return Ok(Sent::Ok(JsonValue::Null));
        }
        Ok(Sent::Ok(
            serde_json::from_str(&text).unwrap_or(JsonValue::String(text)),
        ))
    }
}

#[async_trait]
impl RemoteApi for SalesforceClient {
    async fn authenticate(&self) -> CrmResult<Credentials> {
        self.cache.get_or_refresh(|| self.login()).await
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
        query: Option<&[(String, String)]>,
    ) -> CrmResult<JsonValue> {
        let creds = self.authenticate().await?;
        if let Sent::Ok(v) = self.send(&creds, method.clone(), path, body, query).await? {
            return Ok(v);
        }

        info!("Salesforce session rejected, re-authenticating");
        self.cache.invalidate(&creds.access_token).await;
        let creds = self.authenticate().await?;
        match self.send(&creds, method, path, body, query).await? {
            Sent::Ok(v) => Ok(v),
            Sent::Unauthorized => Err(CrmError::remote(
                "Salesforce rejected the refreshed session (401 Unauthorized)",
            )),
        }
    }
}

fn transport_error(e: reqwest::Error) -> CrmError {
    if e.is_timeout() {
        CrmError::remote(format!("Salesforce request timed out: {}", e))
    } else {
        CrmError::remote(e.to_string())
    }
}

/// Pulls the human-readable message out of a Salesforce error body.
///
/// Apex errors come as `[{"message": .., "errorCode": ..}]`, OAuth errors as
/// `{"error": .., "error_description": ..}`.
pub fn upstream_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<JsonValue>(body) {
        let obj = match &json {
            JsonValue::Array(items) => items.first(),
            other => Some(other),
        };
        if let Some(obj) = obj {
            for key in ["message", "error_description", "error"] {
                if let Some(msg) = obj.get(key).and_then(JsonValue::as_str) {
                    return msg.to_string();
                }
            }
        }
    }
    if body.trim().is_empty() {
        format!("Salesforce returned HTTP {}", status)
    } else {
        body.to_string()
    }
}
