//! HTTP server for the dealerdesk CRM backend.
//!
//! ```bash
//! dealerdesk-server serve --bind 127.0.0.1:5000
//! dealerdesk-server --db-url sqlite://crm.db?mode=rwc migrate
//! ```
//!
//! Mail delivery is configured with the `MAILER_*` variables, everything else
//! with the variables listed on [`config::ServerConfig`].

mod config;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use dealerdesk::{DealerDeskBuilder, DealerDeskBuilderError};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ConfigError, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "dealerdesk-server")]
#[command(version, about = "Dealership CRM backend", long_about = None)]
struct Cli {
    /// Database URL, overrides DATABASE_URL
    #[arg(long, global = true)]
    db_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply migrations and serve the HTTP API
    Serve {
        /// Address to listen on, overrides BIND_ADDR
        #[arg(long)]
        bind: Option<String>,
    },
    /// Apply pending migrations and exit
    Migrate,
    /// Print the version and exit
    Version,
}

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] DealerDeskBuilderError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                tracing::warn!("Failed to register signal handlers, falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        println!("dealerdesk-server {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_tracing();

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = cli.db_url {
        config.database_url = url;
    }

    match cli.command {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            serve(config).await
        }
        Command::Migrate => migrate(config).await,
        Command::Version => Ok(()),
    }
}

async fn migrate(config: ServerConfig) -> Result<(), ServerError> {
    let desk = DealerDeskBuilder::new()
        .with_sqlite(&config.database_url)
        .await?
        .apply_migrations(true)
        .build()
        .await?;
    drop(desk);

    tracing::info!(database_url = %config.database_url, "Migrations applied");
    Ok(())
}

async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let desk = DealerDeskBuilder::new()
        .with_sqlite(&config.database_url)
        .await?
        .with_mailer_from_env()?
        .with_notification_config(config.notification_config())
        .with_otp_config(config.otp_config()?)
        .apply_migrations(true)
        .build()
        .await?;
    let desk = Arc::new(desk);

    if config.receivers.is_empty() {
        tracing::warn!("NOTIFY_RECEIVERS is empty, success notices will not be sent");
    }
    if config.error_recipients.is_empty() {
        tracing::warn!("NOTIFY_ERROR_RECIPIENTS is empty, failure notices will not be sent");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = desk.start_otp_cleanup(config.otp_sweep_interval, shutdown_rx);

    let app = dealerdesk_axum::routes(desk.clone()).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind_addr.clone(),
            source,
        })?;
    tracing::info!(addr = %config.bind_addr, "dealerdesk-server listening");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(ServerError::Serve);

    tracing::info!("Shutting down");
    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Passcode cleanup task did not stop cleanly");
    }

    result
}
