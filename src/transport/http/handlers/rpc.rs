//! JSON-RPC ("MCP") dispatch onto the record engine.

use crate::domain::validation::OperationKind;
use crate::transport::http::handlers::common::{outcome_json, RECORD_WORDING};
use crate::transport::http::types::{
    AppState, JsonRpcRequest, JsonRpcResponse, HANDLER_ERROR, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR,
};
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Map, Value as JsonValue};
use std::str::FromStr;
use tracing::{debug, warn};

/// The fixed method table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    AddRecord,
    GetRecords,
    UpdateRecord,
    DeleteRecord,
    ListTables,
}

impl RpcMethod {
    pub fn operation(self) -> Option<OperationKind> {
        match self {
            RpcMethod::AddRecord => Some(OperationKind::Add),
            RpcMethod::GetRecords => Some(OperationKind::Filter),
            RpcMethod::UpdateRecord => Some(OperationKind::Update),
            RpcMethod::DeleteRecord => Some(OperationKind::Delete),
            RpcMethod::ListTables => None,
        }
    }
}

impl FromStr for RpcMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add_record" => Ok(RpcMethod::AddRecord),
            "get_records" => Ok(RpcMethod::GetRecords),
            "update_record" => Ok(RpcMethod::UpdateRecord),
            "delete_record" => Ok(RpcMethod::DeleteRecord),
            "list_tables" => Ok(RpcMethod::ListTables),
            _ => Err(()),
        }
    }
}

#[utoipa::path(
    post,
    path = "/mcp",
    request_body = JsonRpcRequest,
    responses(
        (status = 200, description = "JSON-RPC response (result or error)", body = JsonRpcResponse)
    )
)]
pub async fn rpc_handler(State(state): State<AppState>, body: Bytes) -> Json<JsonRpcResponse> {
    Json(dispatch(&state, &body).await)
}

pub async fn dispatch(state: &AppState, body: &[u8]) -> JsonRpcResponse {
    let raw: JsonValue = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => return JsonRpcResponse::failure(JsonValue::Null, PARSE_ERROR, "Parse error"),
    };
    let id = raw.get("id").cloned().unwrap_or(JsonValue::Null);

    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(_) => return JsonRpcResponse::failure(id, INVALID_REQUEST, "Invalid Request"),
    };
    debug!(method = %request.method, "rpc request received");

    let method = match request.method.parse::<RpcMethod>() {
        Ok(m) => m,
        Err(()) => {
            warn!(method = %request.method, "unknown rpc method");
            return JsonRpcResponse::failure(id, METHOD_NOT_FOUND, "Method not found");
        }
    };

    let params = request
        .params
        .unwrap_or_else(|| JsonValue::Object(Map::new()));

    let Some(kind) = method.operation() else {
        let tables: Vec<&str> = state
            .engine
            .registry()
            .list_tables()
            .iter()
            .map(|t| t.as_str())
            .collect();
        return JsonRpcResponse::success(id, json!({ "tables": tables }));
    };

    match state.engine.handle(kind, &params).await {
        Ok(outcome) => {
            let (_, result) = outcome_json(outcome, RECORD_WORDING);
            JsonRpcResponse::success(id, result)
        }
        Err(e) => {
            warn!(method = %request.method, "rpc handler failed: {}", e);
            JsonRpcResponse::failure(id, HANDLER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CrudEngine;
    use crate::domain::table::{TableName, TableRegistry};
    use crate::transport::http::types::JsonRpcError;
    use std::sync::Arc;

    fn state() -> AppState {
        let engine = CrudEngine::new(TableRegistry::with_tables(&TableName::ALL, true));
        AppState::new(Arc::new(engine), "http://localhost:3000")
    }

    async fn call(state: &AppState, body: JsonValue) -> JsonRpcResponse {
        dispatch(state, body.to_string().as_bytes()).await
    }

    #[tokio::test]
    async fn unknown_method_uses_fixed_error() {
        let resp = call(&state(), json!({ "method": "drop_table", "params": {}, "id": 7 })).await;
        assert_eq!(resp.jsonrpc, "2.0");
        assert_eq!(resp.id, json!(7));
        assert!(resp.result.is_none());
        assert_eq!(
            resp.error,
            Some(JsonRpcError {
                code: -32601,
                message: "Method not found".to_string()
            })
        );
    }

    #[tokio::test]
    async fn handler_failure_is_32000_with_error_text() {
        let resp = call(
            &state(),
            json!({ "method": "get_records", "params": { "tablename": "opportunity", "filter": "x" }, "id": "a" }),
        )
        .await;
        let err = resp.error.expect("error");
        assert_eq!(err.code, -32000);
        assert_eq!(err.message, "Invalid tablename");
        assert_eq!(resp.id, json!("a"));
    }

    #[tokio::test]
    async fn success_wraps_result_and_echoes_id() {
        let st = state();
        let resp = call(
            &st,
            json!({ "method": "get_records", "params": { "tablename": "contact", "filter": "SMITH" }, "id": 1 }),
        )
        .await;
        assert!(resp.error.is_none());
        let result = resp.result.expect("result");
        assert_eq!(result["count"], 1);
        assert_eq!(result["records"][0]["Id"], "002");
        assert_eq!(resp.id, json!(1));

        let resp = call(&st, json!({ "method": "list_tables", "id": 2 })).await;
        assert_eq!(
            resp.result,
            Some(json!({ "tables": ["contact", "account", "lead"] }))
        );
    }

    #[tokio::test]
    async fn malformed_envelopes() {
        let st = state();
        let resp = dispatch(&st, b"not json").await;
        assert_eq!(resp.error.map(|e| e.code), Some(-32700));

        let resp = call(&st, json!({ "params": {}, "id": 3 })).await;
        assert_eq!(resp.error.map(|e| e.code), Some(-32600));
        assert_eq!(resp.id, json!(3));
    }
}
