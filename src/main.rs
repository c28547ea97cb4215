use slack_mod_logger::audit::AuditWriter;
use slack_mod_logger::config::load_settings;
use slack_mod_logger::error::{ModLoggerError, Result};
use slack_mod_logger::metadata::MetadataCache;
use slack_mod_logger::slack::{SlackClient, SlackEventSource};
use slack_mod_logger::{ControlStatus, ModLogger};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    init_tracing();

    tracing::info!("Starting Slack moderation logger");

    let settings = load_settings()?;
    tracing::debug!(
        log_path = ?settings.audit.log_path,
        retention_secs = settings.cache.retention_secs,
        sweep_interval_secs = settings.cache.sweep_interval_secs,
        "Configuration loaded"
    );

    let writer = Arc::new(AuditWriter::open(&settings.audit.log_path).await?);

    let slack_client = Arc::new(SlackClient::new(settings.slack.clone())?);
    let metadata = Arc::new(MetadataCache::with_ttl(
        slack_client.clone(),
        settings.cache.metadata_ttl(),
    ));
    let source = SlackEventSource::new(slack_client, metadata);

    let logger = ModLogger::new(
        source,
        writer,
        settings.cache.clone(),
        settings.audit.event_queue_capacity,
    );

    let status = logger.start().await;
    tracing::info!(status = %status, "Start requested");
    if let ControlStatus::StartFailed(reason) = status {
        return Err(ModLoggerError::Activation(reason));
    }

    let signal_name = wait_for_shutdown().await;
    tracing::info!(signal = %signal_name, "Received shutdown signal");

    let status = logger.stop().await;
    tracing::info!(status = %status, "Stop requested");

    Ok(())
}

/// Human-readable output by default, one JSON object per line with LOG_FORMAT=json
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("slack_mod_logger=info,audit=info,slack_morphism=warn")
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);

    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Wait for SIGINT, SIGTERM or SIGQUIT (Ctrl+C only on Windows)
async fn wait_for_shutdown() -> String {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to setup SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("Failed to setup SIGTERM handler");
        let mut sigquit = signal(SignalKind::quit()).expect("Failed to setup SIGQUIT handler");

        tokio::select! {
            _ = sigint.recv() => "SIGINT (Ctrl+C)".to_string(),
            _ = sigterm.recv() => "SIGTERM".to_string(),
            _ = sigquit.recv() => "SIGQUIT".to_string(),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        "Ctrl+C".to_string()
    }
}
