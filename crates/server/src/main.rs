use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use contact::EmailJsClient;
use directory::{InFlight, SponsorListController};
use storage::{RestSponsorStore, SponsorStore, SqliteSponsorStore};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;
mod session;

use app_state::AppState;
use config::{load_settings, StoreBackend};
use session::SessionVerifier;

const MAX_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    let store = open_store(settings.store_backend()?).await?;

    let sessions = SessionVerifier::new(settings.jwt_secret());
    if !sessions.is_enabled() {
        warn!("SUPABASE_JWT_SECRET is not set; every request is treated as anonymous");
    }

    let state = AppState {
        controller: Arc::new(SponsorListController::new(store)),
        mailer: Arc::new(EmailJsClient::new(settings.emailjs())),
        sessions,
        inflight: InFlight::new(),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "sponsor site listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn open_store(backend: StoreBackend) -> anyhow::Result<Arc<dyn SponsorStore>> {
    match backend {
        StoreBackend::Sqlite { database_url } => {
            let store = SqliteSponsorStore::new(&database_url).await.map_err(|error| {
                error!(
                    %database_url,
                    %error,
                    "failed to open SQLite database; verify parent directory exists and permissions are correct"
                );
                error
            })?;
            info!(%database_url, "using sqlite sponsor store");
            Ok(Arc::new(store))
        }
        StoreBackend::Rest(config) => {
            info!(base_url = %config.base_url, "using hosted sponsor store");
            Ok(Arc::new(RestSponsorStore::new(config)))
        }
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/sponsors",
            get(api::list_sponsors).post(api::add_sponsor),
        )
        .route(
            "/api/sponsors/:id/delete",
            get(api::delete_prompt).post(api::delete_sponsor),
        )
        .route("/api/contact", post(api::contact))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

async fn healthz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.controller.store().health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            warn!(error = %err, "sponsor store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
