use anyhow::{Context, Result};
use captions_notes::{create_router, AppState, Config};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "captions-notes", version, about = "Live lecture captions and notes")]
struct Args {
    /// Config file path (extension optional)
    #[arg(long, short, default_value = "config/captions-notes")]
    config: String,

    /// Verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Max sessions: {}", cfg.sessions.max_concurrent);
    info!("Session TTL: {} minutes", cfg.sessions.session_minutes);
    info!("Transcriber: {} ({})", cfg.transcriber.url, cfg.transcriber.model);
    info!("Notes: {} ({})", cfg.notes.url, cfg.notes.model);
    info!("CORS origins: {:?}", cfg.service.cors_origins);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let state = AppState::from_config(cfg)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutdown complete");
    Ok(())
}

fn init_tracing(verbosity: u8) {
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("captions_notes={},tower_http={}", level, level))
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
