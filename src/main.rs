use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use slotbook::config::AppConfig;
use slotbook::handlers;
use slotbook::services::notifications::mail_api::HttpMailNotifier;
use slotbook::services::notifications::{LogNotifier, NotificationDispatcher, Notifier};
use slotbook::state::AppState;
use slotbook::storage::DocumentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let notifier: Arc<dyn Notifier> = if config.mail_configured() {
        tracing::info!(api = %config.mail_api_url, "sending notifications through mail API");
        Arc::new(HttpMailNotifier::new(
            config.mail_api_url.clone(),
            config.mail_api_key.clone(),
            config.mail_from.clone(),
        ))
    } else {
        tracing::warn!("MAIL_API_URL/MAIL_API_KEY not set, notifications will only be logged");
        Arc::new(LogNotifier)
    };
    if config.receiver_email.is_empty() {
        tracing::warn!("RECEIVER_EMAIL not set, operator notifications are disabled");
    }

    let notifications = NotificationDispatcher::spawn(
        notifier,
        Duration::from_secs(config.notify_timeout_secs),
    );

    let store = DocumentStore::from_config(&config);
    // Creates the document on first start so a bad path shows up in the log early
    let doc = store.read().await;
    tracing::info!(bookings = doc.bookings.len(), "store loaded");

    let state = Arc::new(AppState {
        store,
        notifications,
        config: config.clone(),
    });

    let app = handlers::api_router(state)
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(
        "starting server on {addr}, serving static files from {}",
        config.public_dir.display()
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
