//! `bustrack` binary: read the environment, install logging, serve.

use std::process::ExitCode;

use bustrack::config::{Config, LogFormat};
use bustrack::Server;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing `.env` is fine; the process environment still applies.
    let dotenv = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Logging is configured from this same config, so stderr it is.
            eprintln!("bustrack: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);
    info!(
        port = config.port,
        base_url = %config.base_url,
        allowed_origins = ?config.allowed_origins,
        "starting bustrack"
    );
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("ignoring unreadable .env: {e}"),
    }

    let server = match Server::bind(&config.bind_addr()).await {
        Ok(server) => server,
        Err(e) => {
            error!("failed to bind {}: {e}", config.bind_addr());
            return ExitCode::FAILURE;
        }
    };

    match server.serve(bustrack::app(&config)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
