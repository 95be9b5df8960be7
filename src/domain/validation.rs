//! Boundary validation: turns an untyped JSON payload into a typed [`Command`].
//!
//! Ordering matters for consistent error codes: the `tablename` is resolved
//! first, then the operation's fields are checked. Nothing here touches a table.

use crate::domain::error::{CrmError, CrmResult};
use crate::domain::record::{NewRecord, RecordPatch};
use crate::domain::table::{TableName, TableRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use utoipa::ToSchema;

pub const INVALID_TABLENAME: &str = "Invalid tablename";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Add,
    Filter,
    Update,
    Delete,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Add,
        OperationKind::Filter,
        OperationKind::Update,
        OperationKind::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Add => "add",
            OperationKind::Filter => "filter",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }
}

impl std::str::FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperationKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown operation '{}'", s))
    }
}

/// A fully validated request against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        table: TableName,
        fields: NewRecord,
    },
    Filter {
        table: TableName,
        filter: String,
    },
    Update {
        table: TableName,
        id: String,
        patch: RecordPatch,
    },
    Delete {
        table: TableName,
        id: String,
    },
}

impl Command {
    pub fn table(&self) -> TableName {
        match self {
            Command::Add { table, .. }
            | Command::Filter { table, .. }
            | Command::Update { table, .. }
            | Command::Delete { table, .. } => *table,
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Command::Add { .. } => OperationKind::Add,
            Command::Filter { .. } => OperationKind::Filter,
            Command::Update { .. } => OperationKind::Update,
            Command::Delete { .. } => OperationKind::Delete,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// When set, an explicit `""` in an update clears the field instead of
    /// being treated as "not provided".
    pub clear_on_empty: bool,
}

/// Classification of one payload field using JSON truthiness.
#[derive(Debug, PartialEq)]
enum Field {
    Absent,
    Empty,
    Text(String),
    NotText,
}

fn field(obj: &Map<String, JsonValue>, name: &str) -> Field {
    match obj.get(name) {
        None | Some(JsonValue::Null) | Some(JsonValue::Bool(false)) => Field::Absent,
        Some(JsonValue::Number(n)) if n.as_f64() == Some(0.0) => Field::Absent,
        Some(JsonValue::String(s)) if s.is_empty() => Field::Empty,
        Some(JsonValue::String(s)) => Field::Text(s.clone()),
        Some(_) => Field::NotText,
    }
}

/// Resolves `tablename` from the payload, then validates the operation fields.
pub fn parse_command(
    kind: OperationKind,
    payload: &JsonValue,
    registry: &TableRegistry,
    options: ValidationOptions,
) -> CrmResult<Command> {
    let table = resolve_table(payload, registry)?;
    parse_for_table(kind, table, payload, options)
}

pub fn resolve_table(payload: &JsonValue, registry: &TableRegistry) -> CrmResult<TableName> {
    payload
        .get("tablename")
        .and_then(JsonValue::as_str)
        .and_then(|name| registry.lookup(name))
        .map(|(name, _)| name)
        .ok_or_else(|| CrmError::validation(INVALID_TABLENAME))
}

/// Validates the fields of `kind` for a table the caller already chose.
pub fn parse_for_table(
    kind: OperationKind,
    table: TableName,
    payload: &JsonValue,
    options: ValidationOptions,
) -> CrmResult<Command> {
    let empty = Map::new();
    let obj = payload.as_object().unwrap_or(&empty);

    match kind {
        OperationKind::Add => {
            let fields = validate_new_record(obj)?;
            Ok(Command::Add { table, fields })
        }
        OperationKind::Filter => match field(obj, "filter") {
            Field::Text(filter) => Ok(Command::Filter { table, filter }),
            _ => Err(CrmError::validation(
                "Filter is required and must be a string",
            )),
        },
        OperationKind::Update => {
            let id = require_id(obj)?;
            let patch = validate_patch(obj, options)?;
            Ok(Command::Update { table, id, patch })
        }
        OperationKind::Delete => {
            let id = require_id(obj)?;
            Ok(Command::Delete { table, id })
        }
    }
}

fn validate_new_record(obj: &Map<String, JsonValue>) -> CrmResult<NewRecord> {
    let names = ["FirstName", "LastName", "Email"];
    let values: Vec<Field> = names.iter().map(|n| field(obj, n)).collect();

    let missing: Vec<String> = names
        .iter()
        .zip(&values)
        .filter(|(_, v)| matches!(v, Field::Absent | Field::Empty))
        .map(|(n, _)| n.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CrmError::MissingFields(missing));
    }

    let mut texts = Vec::with_capacity(3);
    for (name, value) in names.iter().zip(values) {
        match value {
            Field::Text(s) => texts.push(s),
            _ => return Err(CrmError::validation(format!("{} must be a string", name))),
        }
    }
    let mut texts = texts.into_iter();
    Ok(NewRecord {
        first_name: texts.next().unwrap_or_default(),
        last_name: texts.next().unwrap_or_default(),
        email: texts.next().unwrap_or_default(),
    })
}

fn require_id(obj: &Map<String, JsonValue>) -> CrmResult<String> {
    match field(obj, "Id") {
        Field::Text(id) => Ok(id),
        Field::Absent | Field::Empty => Err(CrmError::MissingFields(vec!["Id".to_string()])),
        Field::NotText => Err(CrmError::validation("Id must be a string")),
    }
}

fn validate_patch(obj: &Map<String, JsonValue>, options: ValidationOptions) -> CrmResult<RecordPatch> {
    let optional = |name: &str| -> CrmResult<Option<String>> {
        match field(obj, name) {
            Field::Absent => Ok(None),
            Field::Empty if options.clear_on_empty => Ok(Some(String::new())),
            Field::Empty => Ok(None),
            Field::Text(s) => Ok(Some(s)),
            Field::NotText => Err(CrmError::validation(format!("{} must be a string", name))),
        }
    };

    Ok(RecordPatch {
        first_name: optional("FirstName")?,
        last_name: optional("LastName")?,
        email: optional("Email")?,
    })
}
