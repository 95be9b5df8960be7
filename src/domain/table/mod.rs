//! Tables: the closed set of table names and the in-memory record store.

use crate::domain::record::{Record, RecordPatch};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub mod registry;
pub mod seed;

pub use registry::TableRegistry;

/// Every table the service knows about. Parsing is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    Contact,
    Account,
    Lead,
}

impl TableName {
    pub const ALL: [TableName; 3] = [TableName::Contact, TableName::Account, TableName::Lead];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Contact => "contact",
            TableName::Account => "account",
            TableName::Lead => "lead",
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableName::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown table '{}'", s))
    }
}

/// Ordered collection of records with unique Ids.
#[derive(Debug, Default, Clone)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Record>) -> Self {
        let mut table = Self::new();
        for r in records {
            table.insert(r);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Appends `record`. Returns false (and leaves the table alone) on a duplicate Id.
    pub fn insert(&mut self, record: Record) -> bool {
        if self.contains_id(&record.id) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Matches in insertion order.
    pub fn filter(&self, needle: &str) -> Vec<Record> {
        let needle = needle.to_lowercase();
        self.records
            .iter()
            .filter(|r| r.matches(&needle))
            .cloned()
            .collect()
    }

    pub fn update(&mut self, id: &str, patch: &RecordPatch) -> Option<Record> {
        let record = self.records.iter_mut().find(|r| r.id == id)?;
        record.apply(patch);
        Some(record.clone())
    }

    pub fn remove(&mut self, id: &str) -> Option<Record> {
        let idx = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(idx))
    }
}
