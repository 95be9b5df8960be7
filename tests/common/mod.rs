//! Shared helpers: start the router in-process on an ephemeral port.

#![allow(dead_code)]

use crm_record_proxy::transport;
use crm_record_proxy::{CrudEngine, TableName, TableRegistry};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub engine: Arc<CrudEngine>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Engine with all three tables and the seeded demo contacts.
pub fn seeded_engine() -> CrudEngine {
    CrudEngine::new(TableRegistry::with_tables(&TableName::ALL, true))
}

pub async fn spawn(engine: CrudEngine) -> TestServer {
    let engine = Arc::new(engine);
    let app_state = transport::http::AppState::new(engine.clone(), "http://crm.test");
    let router = transport::http::create_router(app_state);

    // Bind to an ephemeral port to avoid conflicts with a running server.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        engine,
        handle,
    }
}
