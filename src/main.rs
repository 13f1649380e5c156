use clap::Parser;
use m3u_relay::{config::Settings, create_app, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (optional, defaults apply when missing)
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Listening port (overrides config)
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut settings = Settings::load(&args.config)?;
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    info!("Configuration loaded from {}: {:?}", args.config, settings);
    info!(
        "Aggregating {} playlist source(s), serving front-end from {}",
        settings.sources.urls.len(),
        settings.server.public_dir.display()
    );

    let app = create_app(AppState::from_settings(&settings)?);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
