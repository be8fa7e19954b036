use community_api::{AppState, config::Config, routes::router};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env().expect("invalid configuration");

    if config.payment_secret_key.is_none() {
        info!("PAYMENT_SECRET_KEY not set, /checkout will answer 500");
    }

    let state = AppState::new(&config);
    let app = router(state, Duration::from_secs(config.request_timeout_secs));

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind");

    info!("Server running on http://{}", config.bind_addr);
    info!("API Endpoints:");
    info!("  GET    /health                  - Health check");
    info!("  POST   /auth/signup             - Create account");
    info!("  POST   /auth/login              - Login");
    info!("  GET    /users/me                - Get current user (auth)");
    info!("  GET    /tables/{{table}}/rows     - List rows (auth for bookmarks)");
    info!("  POST   /tables/{{table}}/rows     - Insert row (auth)");
    info!("  DELETE /tables/{{table}}/rows     - Delete own rows (auth)");
    info!("  GET    /tables/{{table}}/count    - Count rows");
    info!("  POST   /activities              - Record activity (auth)");
    info!("  GET    /activities              - Own activity feed (auth)");
    info!("  POST   /checkout                - Create checkout session");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
