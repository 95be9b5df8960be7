use crate::domain::table::TableName;
use crate::domain::validation::OperationKind;
use crate::transport::http::handlers::common::{
    crm_error_response, outcome_response, request_payload, Wording, CONTACT_WORDING,
    RECORD_WORDING,
};
use crate::transport::http::types::{
    AddRecordRequest, AppState, DeleteRecordRequest, DeletedResponse, ErrorResponse,
    GetRecordsRequest, RecordResponse, RecordsResponse, UpdateRecordRequest,
};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use tracing::debug;

async fn run(
    state: &AppState,
    kind: OperationKind,
    table: Option<TableName>,
    wording: Wording,
    query: HashMap<String, String>,
    body: Bytes,
) -> Response {
    let payload = match request_payload(query, &body) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    debug!(op = kind.as_str(), payload = %payload, "record request received");

    let result = match table {
        Some(t) => state.engine.handle_for_table(kind, t, &payload).await,
        None => state.engine.handle(kind, &payload).await,
    };
    match result {
        Ok(outcome) => outcome_response(outcome, wording),
        Err(e) => crm_error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/add-record",
    request_body = AddRecordRequest,
    responses(
        (status = 201, description = "Record created", body = RecordResponse),
        (status = 400, description = "Invalid tablename or missing fields", body = ErrorResponse),
        (status = 500, description = "Remote CRM failure", body = ErrorResponse)
    )
)]
pub async fn add_record_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> impl IntoResponse {
    run(&state, OperationKind::Add, None, RECORD_WORDING, query, body).await
}

#[utoipa::path(
    post,
    path = "/get-records",
    request_body = GetRecordsRequest,
    responses(
        (status = 200, description = "Matching records", body = RecordsResponse),
        (status = 400, description = "Invalid tablename or filter", body = ErrorResponse),
        (status = 500, description = "Remote CRM failure", body = ErrorResponse)
    )
)]
pub async fn get_records_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> impl IntoResponse {
    run(&state, OperationKind::Filter, None, RECORD_WORDING, query, body).await
}

#[utoipa::path(
    put,
    path = "/update-record",
    request_body = UpdateRecordRequest,
    responses(
        (status = 200, description = "Record updated", body = RecordResponse),
        (status = 400, description = "Invalid tablename or missing Id", body = ErrorResponse),
        (status = 404, description = "No record with that Id", body = ErrorResponse),
        (status = 500, description = "Remote CRM failure", body = ErrorResponse)
    )
)]
pub async fn update_record_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> impl IntoResponse {
    run(&state, OperationKind::Update, None, RECORD_WORDING, query, body).await
}

#[utoipa::path(
    post,
    path = "/delete-record",
    request_body = DeleteRecordRequest,
    responses(
        (status = 200, description = "Record deleted", body = DeletedResponse),
        (status = 400, description = "Invalid tablename or missing Id", body = ErrorResponse),
        (status = 404, description = "No record with that Id", body = ErrorResponse),
        (status = 500, description = "Remote CRM failure", body = ErrorResponse)
    )
)]
pub async fn delete_record_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> impl IntoResponse {
    run(&state, OperationKind::Delete, None, RECORD_WORDING, query, body).await
}

// Legacy single-table routes, always bound to `contact`.

#[utoipa::path(
    post,
    path = "/add-contact",
    responses(
        (status = 201, description = "Contact created"),
        (status = 400, description = "Missing fields", body = ErrorResponse)
    )
)]
pub async fn add_contact_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> impl IntoResponse {
    let table = Some(TableName::Contact);
    run(&state, OperationKind::Add, table, CONTACT_WORDING, query, body).await
}

#[utoipa::path(
    post,
    path = "/get-contacts",
    responses(
        (status = 200, description = "Matching contacts"),
        (status = 400, description = "Invalid filter", body = ErrorResponse)
    )
)]
pub async fn get_contacts_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> impl IntoResponse {
    let table = Some(TableName::Contact);
    run(&state, OperationKind::Filter, table, CONTACT_WORDING, query, body).await
}

#[utoipa::path(
    put,
    path = "/update-contact",
    responses(
        (status = 200, description = "Contact updated"),
        (status = 400, description = "Missing Id", body = ErrorResponse),
        (status = 404, description = "Contact not found", body = ErrorResponse)
    )
)]
pub async fn update_contact_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> impl IntoResponse {
    let table = Some(TableName::Contact);
    run(&state, OperationKind::Update, table, CONTACT_WORDING, query, body).await
}

#[utoipa::path(
    delete,
    path = "/delete-contact",
    responses(
        (status = 200, description = "Contact deleted"),
        (status = 400, description = "Missing Id", body = ErrorResponse),
        (status = 404, description = "Contact not found", body = ErrorResponse)
    )
)]
pub async fn delete_contact_handler(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> impl IntoResponse {
    let table = Some(TableName::Contact);
    run(&state, OperationKind::Delete, table, CONTACT_WORDING, query, body).await
}
