// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state:
//! - `POST /sms/inbound` -- provider webhook (signature-checked in the handler)
//! - `POST /internal/ai/completion` -- completion callback (bearer auth)
//! - `GET /health` -- unauthenticated status

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use quill_core::{QuillError, SmsGateway, Store};
use quill_flow::ResponseCoordinator;

use crate::auth::{bearer_middleware, AuthConfig};
use crate::handlers;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Webhook signature validation configuration.
#[derive(Clone)]
pub struct SignatureConfig {
    /// Validate `X-Twilio-Signature` on the SMS path. Off only for local
    /// development.
    pub enabled: bool,
    /// Signing key (the SMS provider auth token).
    pub auth_token: Option<String>,
    /// Externally-visible base URL, used to rebuild the signed URL.
    pub public_url: String,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The response coordinator driving the SMS decision chain.
    pub coordinator: Arc<ResponseCoordinator>,
    /// Storage, used directly by the completion callback.
    pub store: Arc<dyn Store>,
    /// Outbound SMS transport for completion delivery.
    pub sms: Arc<dyn SmsGateway>,
    /// Bearer auth for the internal callback.
    pub auth: AuthConfig,
    /// Webhook signature validation settings.
    pub signature: SignatureConfig,
    /// Health state.
    pub health: HealthState,
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the gateway router.
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    // Signature validation happens inside the handler; it needs the raw
    // body, which middleware cannot consume without breaking extraction.
    let sms_routes = Router::new()
        .route("/sms/inbound", post(handlers::post_inbound_sms))
        .with_state(state.clone());

    let internal_routes = Router::new()
        .route(
            "/internal/ai/completion",
            post(handlers::post_completion_callback),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            bearer_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(sms_routes)
        .merge(internal_routes)
        .layer(TraceLayer::new_for_http())
}

/// Start the gateway HTTP server and serve until the process exits.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), QuillError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| QuillError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| QuillError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
    }
}
