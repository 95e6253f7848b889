// Server module - assembles the router and runs the HTTP server

use axum::{extract::DefaultBodyLimit, http::HeaderValue, middleware, Router};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::session::session_middleware;
use crate::api;
use crate::api_docs::ApiDoc;
use crate::infrastructure::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let mut allowed = Vec::new();
    for origin in origins {
        match origin.parse::<HeaderValue>() {
            Ok(v) => allowed.push(v),
            Err(e) => tracing::error!("Failed to parse CORS origin '{}': {}", origin, e),
        }
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the full application router
pub fn build_router(state: AppState) -> Router {
    let web = api::web_router().layer(middleware::from_fn_with_state(
        state.sessions.clone(),
        session_middleware,
    ));
    let api = api::api_router().layer(cors_layer(&state.config.cors_allowed_origins));

    Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(web)
        .merge(api::assets_router())
        .nest("/api", api)
        .nest_service("/static", ServeDir::new(&state.config.upload_dir))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Ports tried after the preferred one when it is taken
const PORT_SCAN_RANGE: u16 = 100;

/// Bind the preferred port, or the first free one above it
async fn bind_listener(preferred_port: u16) -> Result<tokio::net::TcpListener, String> {
    let last = preferred_port.saturating_add(PORT_SCAN_RANGE);
    let mut first_error = None;

    for port in preferred_port..=last {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                if port != preferred_port {
                    tracing::warn!(
                        "Port {} is taken, listening on {} instead",
                        preferred_port,
                        port
                    );
                }
                return Ok(listener);
            }
            Err(e) => {
                first_error.get_or_insert_with(|| format!("Failed to bind to {}: {}", addr, e));
            }
        }
    }

    Err(first_error.unwrap_or_else(|| "No port available".to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}

/// Serve the application until Ctrl-C
pub async fn serve(state: AppState) -> Result<(), String> {
    let listener = bind_listener(state.config.port).await?;
    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to read listener address: {}", e))?;
    let app = build_router(state);

    tracing::info!("CoverLens server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("HTTP server error: {}", e))
}
