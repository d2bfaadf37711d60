//! portal-info server binary

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portal_info::api::create_router_from_settings;
use portal_info::config::{AppConfig, ConfigError, LogFormat, LoggingSection};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A local .env never overrides variables already set in the environment
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;

    let logging = config.logging();
    init_tracing(logging.as_ref().unwrap_or(&LoggingSection::default()));
    if let Err(err) = &logging {
        tracing::warn!(error = %err, "Invalid logging configuration; using defaults");
    }

    let settings = config
        .validate()
        .inspect_err(|err| {
            if let ConfigError::Missing(keys) = err {
                for key in keys {
                    tracing::error!(%key, "Missing required configuration");
                }
            }
        })
        .context("refusing to start with incomplete configuration")?;

    tracing::info!(
        version = %settings.release.version,
        installer = settings.installer.mode(),
        mandatory = settings.release.mandatory,
        "Portal release configured"
    );

    let addr = settings.server.addr();
    let router = create_router_from_settings(settings);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    tracing::info!(%addr, "Listening for HTTP traffic");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingSection) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("portal_info=info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match logging.format {
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
