use crate::app::{Outcome, Served};
use crate::domain::error::CrmError;
use crate::domain::record::Record;
use crate::transport::http::types::ErrorResponse;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashMap;
use tracing::{error, warn};

/// Response vocabulary for one route family.
#[derive(Debug, Clone, Copy)]
pub struct Wording {
    pub noun: &'static str,
    pub single_key: &'static str,
    pub plural_key: &'static str,
}

/// Multi-table routes and the JSON-RPC endpoint.
pub const RECORD_WORDING: Wording = Wording {
    noun: "Record",
    single_key: "record",
    plural_key: "records",
};

/// Legacy `/…-contact` routes.
pub const CONTACT_WORDING: Wording = Wording {
    noun: "Contact",
    single_key: "contact",
    plural_key: "contacts",
};

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

pub fn crm_error_response(err: &CrmError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if err.is_client_error() {
        warn!("request rejected ({}): {}", status, err);
    } else {
        error!("request failed ({}): {}", status, err);
    }
    error_response(status, err.to_string())
}

/// Builds the request payload from an optional JSON body plus query-string
/// parameters. Body keys win over query keys.
pub fn request_payload(
    query: HashMap<String, String>,
    body: &Bytes,
) -> Result<JsonValue, Response> {
    let mut payload = if body.iter().all(u8::is_ascii_whitespace) {
        JsonValue::Object(Map::new())
    } else {
        serde_json::from_slice::<JsonValue>(body).map_err(|e| {
            error_response(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e))
        })?
    };

    if let Some(obj) = payload.as_object_mut() {
        for (k, v) in query {
            obj.entry(k).or_insert(JsonValue::String(v));
        }
    }
    Ok(payload)
}

fn record_json(record: &Record) -> JsonValue {
    serde_json::to_value(record).unwrap_or(JsonValue::Null)
}

fn served_one(served: Served<Record>) -> JsonValue {
    match served {
        Served::Local(r) => record_json(&r),
        Served::Remote(v) => v,
    }
}

/// Normalizes a remote filter response into a list.
fn remote_list(value: JsonValue) -> Vec<JsonValue> {
    match value {
        JsonValue::Array(items) => items,
        JsonValue::Null => Vec::new(),
        JsonValue::Object(mut obj) => match obj.remove("records") {
            Some(JsonValue::Array(items)) => items,
            Some(other) => {
                obj.insert("records".to_string(), other);
                vec![JsonValue::Object(obj)]
            }
            None => vec![JsonValue::Object(obj)],
        },
        other => vec![other],
    }
}

/// Status and JSON body for a successful outcome.
pub fn outcome_json(outcome: Outcome, wording: Wording) -> (StatusCode, JsonValue) {
    let noun = wording.noun;
    match outcome {
        Outcome::Added(served) => (
            StatusCode::CREATED,
            json!({
                "message": format!("{} added successfully", noun),
                wording.single_key: served_one(served),
            }),
        ),
        Outcome::Filtered(served) => {
            let records: Vec<JsonValue> = match served {
                Served::Local(rs) => rs.iter().map(record_json).collect(),
                Served::Remote(v) => remote_list(v),
            };
            (
                StatusCode::OK,
                json!({
                    "count": records.len(),
                    wording.plural_key: records,
                    "message": format!("{}s retrieved using filter", noun),
                }),
            )
        }
        Outcome::Updated(served) => (
            StatusCode::OK,
            json!({
                "message": format!("{} updated successfully", noun),
                wording.single_key: served_one(served),
            }),
        ),
        Outcome::Deleted(served) => (
            StatusCode::OK,
            json!({
                "message": format!("{} deleted successfully", noun),
                "deleted": served_one(served),
            }),
        ),
    }
}

pub fn outcome_response(outcome: Outcome, wording: Wording) -> Response {
    let (status, body) = outcome_json(outcome, wording);
    (status, Json(body)).into_response()
}
