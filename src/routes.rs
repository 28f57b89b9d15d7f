//! Route definitions and router setup
//!
//! Configures all API routes and middleware.

mod charities;
mod extract;
mod governance;
mod proposals;
mod treasury;

use crate::config::Settings;
use crate::identity::caller_middleware;
use crate::state::SharedState;
use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::MakeRequestUuid,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    ServiceBuilderExt,
};
use tracing::Level;

/// Create the application router with all routes and middleware
pub fn create_router(state: SharedState, settings: &Settings) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(settings);

    // Build tracing/logging layer
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Build middleware stack
    let stack = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .layer(trace_layer)
        .layer(CompressionLayer::new())
        .layer(cors)
        .propagate_x_request_id();

    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Treasury & donations
        .route("/api/treasury/balance", get(treasury::get_treasury_balance))
        .route("/api/donations", post(treasury::donate))
        .route("/api/donors/{principal}", get(treasury::get_donor))
        .route("/api/audit", get(treasury::get_audit_log))

        // Proposals & voting
        .route(
            "/api/proposals",
            get(proposals::list_all_proposals).post(proposals::create_proposal),
        )
        .route("/api/proposals/active", get(proposals::list_active_proposals))
        .route("/api/proposals/{id}", get(proposals::get_proposal))
        .route("/api/proposals/{id}/vote", post(proposals::vote_on_proposal))
        .route("/api/proposals/{id}/execute", post(proposals::execute_proposal))
        .route("/api/proposals/{id}/cancel", post(proposals::cancel_proposal))

        // Charity projects
        .route(
            "/api/charities",
            get(charities::list_charity_projects).post(charities::register_charity),
        )
        .route("/api/charities/{id}", get(charities::get_charity_project))

        // Governance
        .route(
            "/api/governance",
            get(governance::get_governance_settings).put(governance::update_governance_settings),
        )

        // Apply middleware and state
        .layer(middleware::from_fn(caller_middleware))
        .layer(stack)
        .with_state(state)
}

/// Build CORS layer from settings
fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors
        .allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let principal_header = HeaderName::from_static(crate::identity::PRINCIPAL_HEADER);
    let methods = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];
    let headers = [header::CONTENT_TYPE, header::ACCEPT, principal_header];

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers)
            .max_age(Duration::from_secs(3600))
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
            .max_age(Duration::from_secs(3600))
    }
}

/// Health check endpoint
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "success": true,
        "message": "Server is running fine.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
