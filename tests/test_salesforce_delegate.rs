//! Salesforce delegation against a mocked login + Apex endpoint.

mod common;

use crm_record_proxy::infra::config::{SalesforceConfig, DEFAULT_APEX_PATH};
use crm_record_proxy::{
    ApexDelegate, CrudEngine, CrmError, DelegationPolicy, RemoteApi, SalesforceClient, TableName,
    TableRegistry,
};
use mockito::{Matcher, Server, ServerGuard};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn sf_config(server: &ServerGuard) -> SalesforceConfig {
    SalesforceConfig {
        login_url: server.url(),
        client_id: "cid".to_string(),
        client_secret: "csecret".to_string(),
        username: "ops@example.com".to_string(),
        password: "hunter2".to_string(),
        security_token: "TOKEN".to_string(),
        apex_path: DEFAULT_APEX_PATH.to_string(),
        timeout: Duration::from_secs(5),
        token_ttl: Duration::from_secs(3600),
    }
}

fn token_body(server: &ServerGuard, token: &str) -> String {
    json!({
        "access_token": token,
        "instance_url": server.url(),
        "token_type": "Bearer",
    })
    .to_string()
}

#[tokio::test]
async fn test_login_is_cached_across_calls() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/services/oauth2/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "password".into()),
            Matcher::UrlEncoded("username".into(), "ops@example.com".into()),
            // Password and security token are sent concatenated.
            Matcher::UrlEncoded("password".into(), "hunter2TOKEN".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(token_body(&server, "tok-1"))
        .expect(1)
        .create_async()
        .await;
    let apex = server
        .mock("GET", DEFAULT_APEX_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("tablename".into(), "contact".into()),
            Matcher::UrlEncoded("filter".into(), "jan".into()),
        ]))
        .match_header("authorization", "Bearer tok-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"Id":"003A","FirstName":"Jane"}]"#)
        .expect(2)
        .create_async()
        .await;

    let client = SalesforceClient::new(sf_config(&server)).expect("client");
    let query = vec![
        ("tablename".to_string(), "contact".to_string()),
        ("filter".to_string(), "jan".to_string()),
    ];
    for _ in 0..2 {
        let out = client
            .call(Method::GET, "", None, Some(&query))
            .await
            .expect("apex call");
        assert_eq!(out[0]["FirstName"], "Jane");
    }

    login.assert_async().await;
    apex.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_triggers_one_relogin() {
    let mut server = Server::new_async().await;
    let logins = Arc::new(AtomicUsize::new(0));
    let instance_url = server.url();
    let counter = logins.clone();
    let login = server
        .mock("POST", "/services/oauth2/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(move |_| {
            let token = match counter.fetch_add(1, Ordering::SeqCst) {
                0 => "stale",
                _ => "fresh",
            };
            json!({ "access_token": token, "instance_url": instance_url })
                .to_string()
                .into_bytes()
        })
        .expect(2)
        .create_async()
        .await;
    let rejected = server
        .mock("POST", DEFAULT_APEX_PATH)
        .match_header("authorization", "Bearer stale")
        .with_status(401)
        .with_body(r#"[{"message":"Session expired or invalid","errorCode":"INVALID_SESSION_ID"}]"#)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("POST", DEFAULT_APEX_PATH)
        .match_header("authorization", "Bearer fresh")
        .match_body(Matcher::PartialJson(json!({ "tablename": "lead", "LastName": "Lee" })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(r#"{"Id":"00Q1","FirstName":"Ann","LastName":"Lee","Email":"a@l.com"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = SalesforceClient::new(sf_config(&server)).expect("client");
    let body = json!({ "tablename": "lead", "FirstName": "Ann", "LastName": "Lee", "Email": "a@l.com" });
    let out = client
        .call(Method::POST, "", Some(&body), None)
        .await
        .expect("apex call after refresh");
    assert_eq!(out["Id"], "00Q1");
    assert_eq!(logins.load(Ordering::SeqCst), 2);

    login.assert_async().await;
    rejected.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_failed_login_surfaces_description() {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/services/oauth2/token")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"invalid_grant","error_description":"authentication failure"}"#)
        .create_async()
        .await;

    let client = SalesforceClient::new(sf_config(&server)).expect("client");
    let err = client.authenticate().await.unwrap_err();
    assert_eq!(err, CrmError::Remote("authentication failure".to_string()));
}

fn delegated_engine(server: &ServerGuard, policy: &str) -> CrudEngine {
    let client = SalesforceClient::new(sf_config(server)).expect("client");
    let policy = DelegationPolicy::parse(policy).expect("policy");
    CrudEngine::new(TableRegistry::with_tables(&TableName::ALL, true))
        .with_delegate(Arc::new(ApexDelegate::new(Arc::new(client))), policy)
        .with_remote_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_remote_contact_routes_leave_local_table_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/services/oauth2/token")
        .with_status(200)
        .with_body(token_body(&server, "tok"))
        .create_async()
        .await;
    let add = server
        .mock("POST", DEFAULT_APEX_PATH)
        .match_body(Matcher::Json(json!({
            "tablename": "contact",
            "FirstName": "Ann",
            "LastName": "Lee",
            "Email": "a@l.com",
        })))
        .with_status(201)
        .with_body(r#"{"Id":"003XYZ","FirstName":"Ann","LastName":"Lee","Email":"a@l.com"}"#)
        .expect(1)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", DEFAULT_APEX_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("tablename".into(), "contact".into()),
            Matcher::UrlEncoded("Id".into(), "003XYZ".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"success":true}"#)
        .expect(1)
        .create_async()
        .await;

    let app = common::spawn(delegated_engine(&server, "contact=remote")).await;

    let resp = app
        .client
        .post(app.url("/add-contact"))
        .json(&json!({ "FirstName": "Ann", "LastName": "Lee", "Email": "a@l.com" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await?;
    assert_eq!(body["contact"]["Id"], "003XYZ");

    let resp = app
        .client
        .post(app.url("/delete-record"))
        .json(&json!({ "tablename": "contact", "Id": "003XYZ" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["deleted"], json!({ "success": true }));

    // Nothing reached the in-memory contact table.
    let contacts = app.engine.registry().get(TableName::Contact).expect("contact table");
    let ids: Vec<String> = contacts.read().await.records().iter().map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec!["001", "002", "003"]);

    // Accounts stay local under this policy.
    let resp = app
        .client
        .post(app.url("/add-record"))
        .json(&json!({ "tablename": "account", "FirstName": "Acme", "LastName": "Corp", "Email": "ops@acme.io" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let accounts = app.engine.registry().get(TableName::Account).expect("account table");
    assert_eq!(accounts.read().await.len(), 1);

    add.assert_async().await;
    delete.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_upstream_error_is_reported_as_500() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/services/oauth2/token")
        .with_status(200)
        .with_body(token_body(&server, "tok"))
        .create_async()
        .await;
    let _patch = server
        .mock("PATCH", DEFAULT_APEX_PATH)
        .with_status(400)
        .with_body(r#"[{"message":"entity is deleted","errorCode":"ENTITY_IS_DELETED"}]"#)
        .create_async()
        .await;

    let app = common::spawn(delegated_engine(&server, "contact=remote")).await;
    let resp = app
        .client
        .put(app.url("/update-record"))
        .json(&json!({ "tablename": "contact", "Id": "003GONE", "Email": "x@y.z" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await?;
    assert_eq!(body, json!({ "error": "entity is deleted" }));

    // Validation still happens locally, before any remote call.
    let resp = app
        .client
        .put(app.url("/update-record"))
        .json(&json!({ "tablename": "contact", "Email": "x@y.z" }))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_mirror_mode_applies_locally_and_forwards() -> Result<(), Box<dyn std::error::Error>> {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/services/oauth2/token")
        .with_status(200)
        .with_body(token_body(&server, "tok"))
        .create_async()
        .await;
    let patch = server
        .mock("PATCH", DEFAULT_APEX_PATH)
        .match_body(Matcher::Json(json!({ "tablename": "contact", "Id": "001", "Email": "j@x.com" })))
        .with_status(200)
        .with_body(r#"{"Id":"001","Email":"j@x.com","synced":true}"#)
        .expect(1)
        .create_async()
        .await;

    let app = common::spawn(delegated_engine(&server, "contact:update=mirror")).await;
    let body: Value = app
        .client
        .post(app.url("/update-contact"))
        .json(&json!({ "Id": "001", "Email": "j@x.com" }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["contact"]["synced"], true);

    let contacts = app.engine.registry().get(TableName::Contact).expect("contact table");
    let john = contacts
        .read()
        .await
        .records()
        .iter()
        .find(|r| r.id == "001")
        .cloned()
        .expect("john");
    assert_eq!(john.email, "j@x.com");

    patch.assert_async().await;
    Ok(())
}
