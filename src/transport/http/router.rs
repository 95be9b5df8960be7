use crate::domain::record::Record;
use crate::domain::table::TableName;
use crate::transport::http::handlers::{health, manifest, records, rpc};
use crate::transport::http::types::{
    AddRecordRequest, DeleteRecordRequest, DeletedResponse, ErrorResponse, GetRecordsRequest,
    HealthResponse, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RecordResponse,
    RecordsResponse, UpdateRecordRequest,
};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        records::add_record_handler,
        records::get_records_handler,
        records::update_record_handler,
        records::delete_record_handler,
        records::add_contact_handler,
        records::get_contacts_handler,
        records::update_contact_handler,
        records::delete_contact_handler,
        rpc::rpc_handler,
        manifest::plugin_manifest_handler
    ),
    components(schemas(
        Record,
        TableName,
        AddRecordRequest,
        GetRecordsRequest,
        UpdateRecordRequest,
        DeleteRecordRequest,
        RecordResponse,
        RecordsResponse,
        DeletedResponse,
        ErrorResponse,
        HealthResponse,
        JsonRpcRequest,
        JsonRpcResponse,
        JsonRpcError
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/add-record", post(records::add_record_handler))
        .route(
            "/get-records",
            post(records::get_records_handler).get(records::get_records_handler),
        )
        .route(
            "/update-record",
            post(records::update_record_handler).put(records::update_record_handler),
        )
        .route(
            "/delete-record",
            post(records::delete_record_handler).delete(records::delete_record_handler),
        )
        .route("/add-contact", post(records::add_contact_handler))
        .route("/get-contacts", post(records::get_contacts_handler))
        .route("/update-contact", post(records::update_contact_handler).put(records::update_contact_handler))
        .route("/delete-contact", post(records::delete_contact_handler).delete(records::delete_contact_handler))
        .route("/mcp", post(rpc::rpc_handler))
        .route(
            "/.well-known/ai-plugin.json",
            get(manifest::plugin_manifest_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
