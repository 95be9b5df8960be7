// src/bin/api_server.rs

use crm_record_proxy::infra::logging;
use crm_record_proxy::transport;
use crm_record_proxy::{AppConfig, CrudEngine};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = AppConfig::from_env()?;
    logging::init(config.log_format)?;

    // --- Engine Initialization ---
    info!(tables = ?config.tables, seed = config.seed_demo_data, "initializing table registry");
    let engine = match CrudEngine::from_config(&config) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            error!("failed to initialize record engine: {:#}", e);
            return Err(e);
        }
    };
    if let Some(sf) = &config.salesforce {
        info!(login_url = %sf.login_url, delegated = config.delegation.needs_remote(), "Salesforce credentials configured");
    }

    let app_state = transport::http::AppState::new(engine, config.public_base_url.clone());

    // --- API Server Initialization ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);
    info!("Swagger UI available at {}/swagger-ui", config.public_base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for shutdown signal: {}", e);
            }
            info!("shutdown signal received, draining connections");
        })
        .await?;

    info!("graceful shutdown complete");
    Ok(())
}
