use std::env;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use squish::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "squish=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.ensure_scratch_dir()?;

    tracing::info!("Starting Squish file compression service");
    tracing::info!("Max file size: {}MB", config.max_file_size_mb);
    tracing::info!("Scratch directory: {}", config.scratch_dir.display());

    // Determine port from environment (PaaS compatibility)
    let port = env::var("PORT")
        .unwrap_or_else(|_| config.server_port.to_string())
        .parse::<u16>()
        .unwrap_or(config.server_port);

    let addr = format!("{}:{}", config.server_host, port);
    let app = squish::app(config);

    tracing::info!("Server listening on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
