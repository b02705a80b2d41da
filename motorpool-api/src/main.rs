use motorpool_api::{app, AppState};
use motorpool_core::{Config, EvidenceStore, MemoryEvidenceStore, ReservationEngine};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "motorpool_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!(
        port = config.server.port,
        fleet_size = config.fleet.vehicle_ids.len(),
        "Starting Motorpool API"
    );

    let evidence: Arc<dyn EvidenceStore> = Arc::new(MemoryEvidenceStore::new());
    let engine = Arc::new(ReservationEngine::from_config(&config, evidence.clone()));

    let state = AppState {
        engine,
        evidence,
        admin_emails: Arc::new(config.auth.admin_emails.clone()),
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
