use crate::app::CrudEngine;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<CrudEngine>,
    /// Base URL advertised in the plugin manifest.
    pub public_base_url: String,
}

impl AppState {
    pub fn new(engine: Arc<CrudEngine>, public_base_url: impl Into<String>) -> Self {
        Self {
            engine,
            public_base_url: public_base_url.into(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct AddRecordRequest {
    pub tablename: String,
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "Email")]
    pub email: String,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct GetRecordsRequest {
    pub tablename: String,
    /// Case-insensitive substring matched against FirstName, LastName and Email.
    pub filter: String,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct UpdateRecordRequest {
    pub tablename: String,
    #[serde(rename = "Id")]
    pub id: String,
    /// Omitted or empty fields are left unchanged.
    #[serde(rename = "FirstName", default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(rename = "LastName", default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(rename = "Email", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct DeleteRecordRequest {
    pub tablename: String,
    #[serde(rename = "Id")]
    pub id: String,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct RecordResponse {
    pub message: String,
    /// The stored record, or the remote CRM's response when delegated.
    #[schema(value_type = Object)]
    pub record: JsonValue,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct RecordsResponse {
    pub count: usize,
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<JsonValue>,
    pub message: String,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct DeletedResponse {
    pub message: String,
    #[schema(value_type = Object)]
    pub deleted: JsonValue,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub tables: Vec<String>,
    pub remote_delegation: bool,
}

/// JSON-RPC 2.0 request accepted on `/mcp`.
#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub method: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub params: Option<JsonValue>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub id: Option<JsonValue>,
}

#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub result: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[schema(value_type = Object)]
    pub id: JsonValue,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const HANDLER_ERROR: i32 = -32000;

impl JsonRpcResponse {
    pub fn success(id: JsonValue, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: JsonValue, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
            id,
        }
    }
}
