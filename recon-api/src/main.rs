use recon_api::{app, AppState};
use recon_catalog::ServiceCatalog;
use recon_core::selection::SelectionState;
use recon_core::session::SessionStore;
use recon_mapping::ExportMachine;
use recon_store::{FileSessionStore, MemorySessionStore, WebhookClient};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recon_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = recon_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Recon API on port {}", config.server.port);

    let store: Arc<dyn SessionStore> = match config.session.backend.as_str() {
        "memory" => Arc::new(MemorySessionStore::new()),
        _ => Arc::new(
            FileSessionStore::open(&config.session.file_path)
                .expect("Failed to open session file"),
        ),
    };

    let webhooks = WebhookClient::new(&config.webhooks);

    let app_state = AppState {
        store,
        source: Arc::new(webhooks.clone()),
        sink: Arc::new(webhooks),
        catalog: Arc::new(RwLock::new(ServiceCatalog::new())),
        selections: Arc::new(RwLock::new(SelectionState::new())),
        machine: Arc::new(RwLock::new(ExportMachine::new())),
        submit_delay: Duration::from_millis(config.submit.delay_ms),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
