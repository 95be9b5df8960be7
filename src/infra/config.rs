//! Centralized configuration (environment variables + defaults).

use crate::domain::delegate::DelegationPolicy;
use crate::domain::ids::IdStrategy;
use crate::domain::table::TableName;
use crate::domain::validation::ValidationOptions;
use crate::infra::logging::LogFormat;
use anyhow::{anyhow, bail, Context};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com";
pub const DEFAULT_APEX_PATH: &str = "/services/apexrest/MultiObjectAPI";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Base URL advertised in the plugin manifest.
    pub public_base_url: String,
    pub tables: Vec<TableName>,
    pub seed_demo_data: bool,
    pub id_strategy: IdStrategy,
    pub clear_on_empty: bool,
    pub delegation: DelegationPolicy,
    /// `None` when no Salesforce credentials are configured.
    pub salesforce: Option<SalesforceConfig>,
    pub log_format: LogFormat,
}

#[derive(Clone)]
pub struct SalesforceConfig {
    pub login_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub security_token: String,
    pub apex_path: String,
    pub timeout: Duration,
    pub token_ttl: Duration,
}

impl fmt::Debug for SalesforceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SalesforceConfig")
            .field("login_url", &self.login_url)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("apex_path", &self.apex_path)
            .field("timeout", &self.timeout)
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Reads the process environment. Call `dotenv::dotenv()` first to honour `.env`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("PORT must be a valid u16, got '{}'", v))?,
            None => 3000,
        };
        let public_base_url = get("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let tables = match get("CRM_TABLES") {
            Some(list) => parse_tables(&list)?,
            None => TableName::ALL.to_vec(),
        };

        let seed_demo_data = parse_bool(&get, "CRM_SEED_DEMO_DATA", true)?;
        let clear_on_empty = parse_bool(&get, "CRM_CLEAR_ON_EMPTY", false)?;

        let id_strategy = match get("CRM_ID_STRATEGY") {
            Some(v) => v.parse::<IdStrategy>().map_err(|e| anyhow!("CRM_ID_STRATEGY: {}", e))?,
            None => IdStrategy::default(),
        };

        let delegation = DelegationPolicy::parse(&get("CRM_DELEGATE").unwrap_or_default())
            .map_err(|e| anyhow!("CRM_DELEGATE: {}", e))?;

        let salesforce = match (get("SF_CLIENT_ID"), get("SF_USERNAME")) {
            (Some(client_id), Some(username)) => Some(SalesforceConfig {
                login_url: get("SF_LOGIN_URL")
                    .unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                client_id,
                client_secret: get("SF_CLIENT_SECRET").unwrap_or_default(),
                username,
                password: get("SF_PASSWORD").unwrap_or_default(),
                security_token: get("SF_SECURITY_TOKEN").unwrap_or_default(),
                apex_path: get("SF_APEX_PATH").unwrap_or_else(|| DEFAULT_APEX_PATH.to_string()),
                timeout: Duration::from_secs(parse_u64(&get, "SF_TIMEOUT_SECS", 30)?.max(1)),
                token_ttl: Duration::from_secs(parse_u64(&get, "SF_TOKEN_TTL_SECS", 3600)?),
            }),
            _ => None,
        };

        if delegation.needs_remote() && salesforce.is_none() {
            bail!("CRM_DELEGATE routes tables to Salesforce but SF_CLIENT_ID / SF_USERNAME are not set");
        }

        let log_format = match get("LOG_FORMAT") {
            Some(v) => v.parse::<LogFormat>().map_err(|e| anyhow!("LOG_FORMAT: {}", e))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            port,
            public_base_url,
            tables,
            seed_demo_data,
            id_strategy,
            clear_on_empty,
            delegation,
            salesforce,
            log_format,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            clear_on_empty: self.clear_on_empty,
        }
    }
}

fn parse_tables(list: &str) -> anyhow::Result<Vec<TableName>> {
    let mut tables = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let t: TableName = name.parse().map_err(|e| anyhow!("CRM_TABLES: {}", e))?;
        if !tables.contains(&t) {
            tables.push(t);
        }
    }
    if tables.is_empty() {
        bail!("CRM_TABLES must name at least one table");
    }
    Ok(tables)
}

fn parse_bool<G>(get: &G, key: &str, default: bool) -> anyhow::Result<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(v) => match v.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => bail!("{} must be a boolean, got '{}'", key, v),
        },
    }
}

fn parse_u64<G>(get: &G, key: &str, default: u64) -> anyhow::Result<u64>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(v) => v
            .parse::<u64>()
            .with_context(|| format!("{} must be a valid u64, got '{}'", key, v)),
    }
}
