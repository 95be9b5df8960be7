//! The record service.
//!
//! Sits between the transports and the tables. It is responsible for:
//! 1.  Resolving the table and validating the request (tablename first).
//! 2.  Applying the operation to the in-memory table under that table's lock.
//! 3.  Forwarding to the remote delegate when the delegation policy says so,
//!     without holding any table lock across the network call.

use crate::app::apex_delegate::ApexDelegate;
use crate::domain::delegate::{DelegationMode, DelegationPolicy, RemoteDelegate};
use crate::domain::error::{CrmError, CrmResult};
use crate::domain::ids::{IdGenerator, MonotonicIdGenerator};
use crate::domain::record::{NewRecord, Record, RecordPatch};
use crate::domain::table::registry::SharedTable;
use crate::domain::table::{TableName, TableRegistry};
use crate::domain::validation::{
    self, Command, OperationKind, ValidationOptions, INVALID_TABLENAME,
};
use crate::infra::config::AppConfig;
use crate::infra::salesforce::SalesforceClient;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Attempts at finding an unused Id before giving up.
const MAX_ID_ATTEMPTS: usize = 32;

/// Where a result came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Served<T> {
    Local(T),
    Remote(JsonValue),
}

impl<T> Served<T> {
    pub fn is_remote(&self) -> bool {
        matches!(self, Served::Remote(_))
    }

    pub fn local(self) -> Option<T> {
        match self {
            Served::Local(v) => Some(v),
            Served::Remote(_) => None,
        }
    }
}

/// Result of executing one [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Added(Served<Record>),
    Filtered(Served<Vec<Record>>),
    Updated(Served<Record>),
    Deleted(Served<Record>),
}

impl Outcome {
    fn remote(kind: OperationKind, value: JsonValue) -> Self {
        match kind {
            OperationKind::Add => Outcome::Added(Served::Remote(value)),
            OperationKind::Filter => Outcome::Filtered(Served::Remote(value)),
            OperationKind::Update => Outcome::Updated(Served::Remote(value)),
            OperationKind::Delete => Outcome::Deleted(Served::Remote(value)),
        }
    }
}

pub struct CrudEngine {
    registry: TableRegistry,
    ids: Box<dyn IdGenerator>,
    policy: DelegationPolicy,
    delegate: Option<Arc<dyn RemoteDelegate>>,
    options: ValidationOptions,
    remote_timeout: Option<Duration>,
}

impl CrudEngine {
    /// Local-only engine with monotonic Ids and default validation.
    pub fn new(registry: TableRegistry) -> Self {
        Self {
            registry,
            ids: Box::new(MonotonicIdGenerator::new()),
            policy: DelegationPolicy::local_only(),
            delegate: None,
            options: ValidationOptions::default(),
            remote_timeout: None,
        }
    }

    /// Wires registry, Id strategy, validation options and (when configured)
    /// the Salesforce delegate from the process configuration.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let registry = TableRegistry::with_tables(&config.tables, config.seed_demo_data);
        let mut engine = Self::new(registry)
            .with_id_generator(config.id_strategy.build())
            .with_options(config.validation_options());

        if config.delegation.needs_remote() {
            let sf = config.salesforce.clone().ok_or_else(|| {
                anyhow::anyhow!("remote delegation configured without Salesforce credentials")
            })?;
            let timeout = sf.timeout;
            let client = SalesforceClient::new(sf)?;
            engine = engine
                .with_delegate(
                    Arc::new(ApexDelegate::new(Arc::new(client))),
                    config.delegation.clone(),
                )
                .with_remote_timeout(timeout);
            info!("remote delegation enabled via Salesforce Apex REST");
        }

        Ok(engine)
    }

    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_delegate(
        mut self,
        delegate: Arc<dyn RemoteDelegate>,
        policy: DelegationPolicy,
    ) -> Self {
        self.delegate = Some(delegate);
        self.policy = policy;
        self
    }

    /// Upper bound on any single delegate call.
    pub fn with_remote_timeout(mut self, timeout: Duration) -> Self {
        self.remote_timeout = Some(timeout);
        self
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    pub fn policy(&self) -> &DelegationPolicy {
        &self.policy
    }

    /// Validates `payload` (including its `tablename`) and executes it.
    pub async fn handle(&self, kind: OperationKind, payload: &JsonValue) -> CrmResult<Outcome> {
        let command = validation::parse_command(kind, payload, &self.registry, self.options)?;
        self.execute(command).await
    }

    /// Like [`handle`](Self::handle) for callers bound to a single table.
    pub async fn handle_for_table(
        &self,
        kind: OperationKind,
        table: TableName,
        payload: &JsonValue,
    ) -> CrmResult<Outcome> {
        if !self.registry.contains(table) {
            return Err(CrmError::validation(INVALID_TABLENAME));
        }
        let command = validation::parse_for_table(kind, table, payload, self.options)?;
        self.execute(command).await
    }

    pub async fn execute(&self, command: Command) -> CrmResult<Outcome> {
        let mode = self.policy.mode_for(command.table(), command.kind());
        debug!(table = %command.table(), op = command.kind().as_str(), ?mode, "executing command");

        match mode {
            DelegationMode::Local => self.apply_local(&command).await,
            DelegationMode::Remote => {
                let value = self.forward(&command).await?;
                Ok(Outcome::remote(command.kind(), value))
            }
            DelegationMode::Mirror => {
                match self.apply_local(&command).await {
                    Ok(_) => {}
                    Err(CrmError::NotFound(msg)) => {
                        debug!(table = %command.table(), "mirror: local copy missing ({}), forwarding anyway", msg);
                    }
                    Err(e) => return Err(e),
                }
                let value = self.forward(&command).await?;
                Ok(Outcome::remote(command.kind(), value))
            }
        }
    }

    async fn apply_local(&self, command: &Command) -> CrmResult<Outcome> {
        match command {
            Command::Add { table, fields } => {
                let record = self.add(*table, fields.clone()).await?;
                Ok(Outcome::Added(Served::Local(record)))
            }
            Command::Filter { table, filter } => {
                let records = self.filter(*table, filter).await?;
                Ok(Outcome::Filtered(Served::Local(records)))
            }
            Command::Update { table, id, patch } => {
                let record = self.update(*table, id, patch).await?;
                Ok(Outcome::Updated(Served::Local(record)))
            }
            Command::Delete { table, id } => {
                let record = self.delete(*table, id).await?;
                Ok(Outcome::Deleted(Served::Local(record)))
            }
        }
    }

    async fn forward(&self, command: &Command) -> CrmResult<JsonValue> {
        let delegate = self.delegate.as_ref().ok_or_else(|| {
            CrmError::Internal(format!(
                "no remote delegate configured for table '{}'",
                command.table()
            ))
        })?;

        let call = delegate.forward(command);
        let result = match self.remote_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                CrmError::remote(format!("Remote call timed out after {:?}", limit))
            })?,
            None => call.await,
        };

        if let Err(e) = &result {
            warn!(table = %command.table(), op = command.kind().as_str(), "remote delegate failed: {}", e);
        }
        result
    }

    fn table(&self, name: TableName) -> CrmResult<SharedTable> {
        self.registry
            .get(name)
            .ok_or_else(|| CrmError::validation(INVALID_TABLENAME))
    }

    pub async fn add(&self, table: TableName, fields: NewRecord) -> CrmResult<Record> {
        let shared = self.table(table)?;
        let mut guard = shared.write().await;

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id(table);
            if id.is_empty() || guard.contains_id(&id) {
                continue;
            }
            let record = Record::new(id, fields);
            guard.insert(record.clone());
            info!(table = %table, id = %record.id, "record added");
            return Ok(record);
        }

        Err(CrmError::Internal(format!(
            "could not allocate a unique Id in '{}'",
            table
        )))
    }

    pub async fn filter(&self, table: TableName, filter: &str) -> CrmResult<Vec<Record>> {
        let shared = self.table(table)?;
        let records = shared.read().await.filter(filter);
        info!(table = %table, count = records.len(), "filter matched");
        Ok(records)
    }

    pub async fn update(&self, table: TableName, id: &str, patch: &RecordPatch) -> CrmResult<Record> {
        let shared = self.table(table)?;
        let updated = shared.write().await.update(id, patch);
        match updated {
            Some(record) => {
                info!(table = %table, id = %id, "record updated");
                Ok(record)
            }
            None => Err(CrmError::not_found("Record not found.")),
        }
    }

    pub async fn delete(&self, table: TableName, id: &str) -> CrmResult<Record> {
        let shared = self.table(table)?;
        let removed = shared.write().await.remove(id);
        match removed {
            Some(record) => {
                info!(table = %table, id = %id, "record deleted");
                Ok(record)
            }
            None => Err(CrmError::not_found("Record not found.")),
        }
    }
}
