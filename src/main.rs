use library_lending::{
    adapters::json::{JsonBookRepository, JsonLoanRepository, JsonNotificationRepository},
    api::{handlers::AppState, router::create_router},
    application::library::{ServiceDependencies, reconcile_inventory},
    config::Config,
};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(data_dir = %config.data_dir.display(), "Opening JSON stores");

    // Initialize adapters
    let book_repository = Arc::new(JsonBookRepository::open(config.books_path()).await?);
    let loan_repository = Arc::new(JsonLoanRepository::open(config.loans_path()).await?);
    let notification_repository =
        Arc::new(JsonNotificationRepository::open(config.notifications_path()).await?);

    let service_deps =
        ServiceDependencies::new(book_repository, loan_repository, notification_repository);

    // A crash between the loan and book commits leaves available counts stale
    let corrections = reconcile_inventory(&service_deps).await?;
    if !corrections.is_empty() {
        tracing::warn!(
            corrected = corrections.len(),
            "Inventory was out of sync with loans at startup"
        );
    }

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    let app = create_router(app_state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
