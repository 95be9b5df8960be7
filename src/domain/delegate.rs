//! Contract for forwarding record operations to a remote CRM, and the policy
//! deciding which (table, operation) pairs are forwarded.

use crate::domain::error::CrmResult;
use crate::domain::table::TableName;
use crate::domain::validation::{Command, OperationKind};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::str::FromStr;

/// Forwards an already validated command to an external system.
///
/// Implementations must report failures as `CrmError::Remote` with the
/// upstream message preserved.
#[async_trait]
pub trait RemoteDelegate: Send + Sync {
    async fn forward(&self, command: &Command) -> CrmResult<JsonValue>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelegationMode {
    /// Served from the in-memory table only.
    #[default]
    Local,
    /// Forwarded to the remote system; the local table is not touched.
    Remote,
    /// Applied locally, then forwarded; the caller sees the remote result.
    Mirror,
}

impl DelegationMode {
    pub fn uses_remote(self) -> bool {
        !matches!(self, DelegationMode::Local)
    }
}

impl FromStr for DelegationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(DelegationMode::Local),
            "remote" => Ok(DelegationMode::Remote),
            "mirror" => Ok(DelegationMode::Mirror),
            other => Err(format!("unknown delegation mode '{}'", other)),
        }
    }
}

/// Per-table defaults with per-operation overrides. Anything unset is `Local`.
#[derive(Debug, Clone, Default)]
pub struct DelegationPolicy {
    tables: HashMap<TableName, DelegationMode>,
    operations: HashMap<(TableName, OperationKind), DelegationMode>,
}

impl DelegationPolicy {
    pub fn local_only() -> Self {
        Self::default()
    }

    pub fn set_table(&mut self, table: TableName, mode: DelegationMode) -> &mut Self {
        self.tables.insert(table, mode);
        self
    }

    pub fn set_operation(
        &mut self,
        table: TableName,
        op: OperationKind,
        mode: DelegationMode,
    ) -> &mut Self {
        self.operations.insert((table, op), mode);
        self
    }

    pub fn mode_for(&self, table: TableName, op: OperationKind) -> DelegationMode {
        self.operations
            .get(&(table, op))
            .or_else(|| self.tables.get(&table))
            .copied()
            .unwrap_or_default()
    }

    /// True if any route needs a remote delegate.
    pub fn needs_remote(&self) -> bool {
        self.tables
            .values()
            .chain(self.operations.values())
            .any(|m| m.uses_remote())
    }

    /// Parses `contact=remote,lead:add=mirror`.
    pub fn parse(spec: &str) -> Result<Self, String> {
        let mut policy = Self::default();
        for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (target, mode) = entry
                .split_once('=')
                .ok_or_else(|| format!("expected table[:operation]=mode, got '{}'", entry))?;
            let mode: DelegationMode = mode.parse()?;
            match target.trim().split_once(':') {
                Some((table, op)) => {
                    let table: TableName = table.trim().parse()?;
                    let op: OperationKind = op.trim().parse()?;
                    policy.set_operation(table, op, mode);
                }
                None => {
                    let table: TableName = target.trim().parse()?;
                    policy.set_table(table, mode);
                }
            }
        }
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_override_beats_table_default() {
        let policy = DelegationPolicy::parse("contact=remote, contact:filter=local").unwrap();
        assert_eq!(
            policy.mode_for(TableName::Contact, OperationKind::Add),
            DelegationMode::Remote
        );
        assert_eq!(
            policy.mode_for(TableName::Contact, OperationKind::Filter),
            DelegationMode::Local
        );
        assert_eq!(
            policy.mode_for(TableName::Lead, OperationKind::Add),
            DelegationMode::Local
        );
        assert!(policy.needs_remote());
    }

    #[test]
    fn empty_spec_is_local_only() {
        let policy = DelegationPolicy::parse("").unwrap();
        assert!(!policy.needs_remote());
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(DelegationPolicy::parse("contact").is_err());
        assert!(DelegationPolicy::parse("opportunity=remote").is_err());
        assert!(DelegationPolicy::parse("contact:merge=remote").is_err());
        assert!(DelegationPolicy::parse("contact=sometimes").is_err());
    }
}
