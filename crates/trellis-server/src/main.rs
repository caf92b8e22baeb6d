use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trellis::{mount, Config, ManifestLoader};
use trellis_server::handlers::UserStore;

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("Failed to read .env: {}", e);
        }
    }

    let mut config = Config::load_default()?;
    apply_env_overrides(&mut config)?;

    info!(
        address = %config.address(),
        routes_dir = %config.routing.routes_dir,
        prefix = %config.routing.prefix,
        "Configuration loaded"
    );

    let store = UserStore::with_users(["ada", "grace"]);
    let loader = ManifestLoader::new(trellis_server::registry(store));
    let table = config.discover(&loader)?;

    for entry in &table {
        info!(
            method = %entry.method,
            pattern = %entry.pattern,
            middleware = entry.chain.len(),
            "  route"
        );
    }

    let app = mount(&table).layer(TraceLayer::new_for_http());

    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server running at http://{}", address);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// `TRELLIS_HOST`, `TRELLIS_PORT` and `TRELLIS_ROUTES_DIR` win over trellis.toml
fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Ok(host) = std::env::var("TRELLIS_HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("TRELLIS_PORT") {
        config.server.port = port
            .parse()
            .with_context(|| format!("TRELLIS_PORT is not a valid port: {}", port))?;
    }
    if let Ok(dir) = std::env::var("TRELLIS_ROUTES_DIR") {
        config.routing.routes_dir = dir;
    }
    Ok(())
}
