mod error;
mod service;

use std::sync::Arc;

use abi::Config;
use axum::{
    routing::{delete, get, post},
    Router,
};
use reservation::{ReservationManager, Rsvp};
use sqlx::postgres::PgPoolOptions;
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use error::ApiError;

/// Router state: the store every handler works against.
#[derive(Clone)]
pub struct RsvpService {
    store: Arc<dyn Rsvp>,
}

impl RsvpService {
    pub fn new(store: Arc<dyn Rsvp>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn Rsvp {
        self.store.as_ref()
    }
}

pub fn router(svc: RsvpService) -> Router {
    Router::new()
        .route("/health", get(service::health))
        .route("/restaurants/search", post(service::search))
        .route("/reservations", post(service::reserve))
        .route("/reservations/group", post(service::reserve_group))
        .route("/reservations/{id}", delete(service::cancel))
        .layer(TraceLayer::new_for_http())
        .with_state(svc)
}

pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db.max_connections)
        .connect(&config.db.url())
        .await?;
    sqlx::migrate!("../migrations").run(&pool).await?;
    info!("Database ready at {}:{}", config.db.host, config.db.port);

    let svc = RsvpService::new(Arc::new(ReservationManager::new(pool)));
    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", config.server.url(false));

    axum::serve(listener, router(svc))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
