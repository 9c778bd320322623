use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use recipex::api::{AppState, create_router};
use recipex::config::{Config, is_usable_api_key};

/// Recipe discovery API: Spoonacular and TheMealDB search behind one gateway.
#[derive(Parser, Debug)]
#[command(name = "recipex", version)]
struct Cli {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let addr = format!("{}:{}", config.host, config.port);
    info!(
        spoonacular_configured = is_usable_api_key(config.spoonacular_api_key.as_deref()),
        groq_configured = is_usable_api_key(config.groq_api_key.as_deref()),
        "providers.configured"
    );
    let state = AppState::from_config(config);

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(%addr, "server.started");
    axum::serve(listener, app).await?;
    Ok(())
}
