//! VeriPact API - Transparent Charity DAO service
//!
//! Serves the treasury, proposal, voting and donation operations over
//! HTTP/JSON. Callers identify themselves with the `x-principal` header.
//!
//! When `STATE_FILE` is set, state is restored from it at startup and
//! written back on graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use veripact::config::Settings;
use veripact::persistence::{load_state, save_state};
use veripact::routes::create_router;
use veripact::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting VeriPact - Transparent Charity DAO...");

    // Load configuration
    let settings = Settings::load()?;
    info!("📋 Configuration loaded successfully");

    // Restore previous state if configured
    let state = match &settings.storage.state_file {
        Some(path) => match load_state(path).await? {
            Some(restored) => Arc::new(AppState::restored(&settings, restored)),
            None => Arc::new(AppState::new(&settings)),
        },
        None => {
            info!("💾 STATE_FILE not set, state will not survive restarts");
            Arc::new(AppState::new(&settings))
        }
    };

    // A restored snapshot keeps its own governance settings
    let governance = state.dao.get_governance_settings().await;
    if governance != settings.governance {
        warn!("⚠️  Governance settings from {:?} take precedence over the environment", settings.storage.state_file);
    }
    info!(
        "⚖️  Governance: quorum {}%, approval {}%, minimum duration {}s",
        governance.quorum_percentage,
        governance.approval_threshold,
        governance.min_proposal_duration
    );

    // Build the router
    let app = create_router(state.clone(), &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📚 API Endpoints:");
    info!("   ─── Treasury ───");
    info!("   GET  /api/treasury/balance        - Current treasury balance (e8s)");
    info!("   POST /api/donations               - Donate to the treasury");
    info!("   GET  /api/donors/{{principal}}      - Donor record");
    info!("   GET  /api/audit                   - Audit trail");
    info!("");
    info!("   ─── Proposals ───");
    info!("   GET  /api/proposals/active        - Proposals open for voting");
    info!("   GET  /api/proposals               - All proposals");
    info!("   POST /api/proposals               - Create funding proposal");
    info!("   POST /api/proposals/{{id}}/vote     - Vote on a proposal");
    info!("   POST /api/proposals/{{id}}/execute  - Execute approved proposal");
    info!("   POST /api/proposals/{{id}}/cancel   - Cancel own proposal");
    info!("");
    info!("   ─── Charities & Governance ───");
    info!("   GET  /api/charities               - List charity projects");
    info!("   POST /api/charities               - Register a charity project");
    info!("   GET  /api/governance              - Governance settings");
    info!("   PUT  /api/governance              - Update governance settings");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(path) = &settings.storage.state_file {
        let snapshot = state.dao.snapshot().await;
        if let Err(e) = save_state(path, &snapshot).await {
            error!("❌ Failed to save state to {}: {}", path.display(), e);
            return Err(e.into());
        }
    }

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,veripact=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
