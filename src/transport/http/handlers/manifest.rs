use crate::transport::http::types::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value as JsonValue};

/// Plugin manifest pointing at the generated OpenAPI document.
#[utoipa::path(
    get,
    path = "/.well-known/ai-plugin.json",
    responses(
        (status = 200, description = "Plugin manifest")
    )
)]
pub async fn plugin_manifest_handler(State(state): State<AppState>) -> Json<JsonValue> {
    let base = state.public_base_url.trim_end_matches('/');
    Json(json!({
        "schema_version": "v1",
        "name_for_human": "CRM Records",
        "name_for_model": "crm_records",
        "description_for_human": "Search, add, update and delete CRM contacts, accounts and leads.",
        "description_for_model": "Manage CRM records. Every call takes a `tablename` (contact, account or lead). \
Use get-records with a `filter` substring to find records before updating or deleting them by `Id`.",
        "auth": { "type": "none" },
        "api": {
            "type": "openapi",
            "url": format!("{}/api-docs/openapi.json", base),
        },
    }))
}
