//! The contact-shaped record stored in every table.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single CRM row. `Id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: NewRecord) -> Self {
        Self {
            id: id.into(),
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
        }
    }

    /// Case-insensitive substring match over FirstName, LastName and Email.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.first_name.to_lowercase().contains(needle)
            || self.last_name.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
    }

    /// Overwrites only the fields present in `patch`.
    pub fn apply(&mut self, patch: &RecordPatch) {
        if let Some(v) = &patch.first_name {
            self.first_name = v.clone();
        }
        if let Some(v) = &patch.last_name {
            self.last_name = v.clone();
        }
        if let Some(v) = &patch.email {
            self.email = v.clone();
        }
    }
}

/// Validated fields for a record that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct NewRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Validated partial update. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john() -> Record {
        Record::new(
            "001",
            NewRecord {
                first_name: "John".into(),
                last_name: "Doe".into(),
                email: "john@example.com".into(),
            },
        )
    }

    #[test]
    fn serializes_with_crm_field_names() {
        let json = serde_json::to_value(john()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Id": "001",
                "FirstName": "John",
                "LastName": "Doe",
                "Email": "john@example.com"
            })
        );
    }

    #[test]
    fn matches_any_text_field() {
        let r = john();
        assert!(r.matches("joh"));
        assert!(r.matches("doe"));
        assert!(r.matches("example.com"));
        assert!(!r.matches("smith"));
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut r = john();
        r.apply(&RecordPatch {
            email: Some("j@x.com".into()),
            ..Default::default()
        });
        assert_eq!(r.email, "j@x.com");
        assert_eq!(r.first_name, "John");
        assert_eq!(r.last_name, "Doe");
    }
}
