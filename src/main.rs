use std::sync::Arc;

use eventwatch::constants::LOG_FILE_NAME;
use eventwatch::init_sled_db;
use eventwatch::Error;
use eventwatch::EventWatchConfig;
use eventwatch::KubeEventSource;
use eventwatch::KubeTypeConfig;
use eventwatch::LoggingConfig;
use eventwatch::NamespaceRegistry;
use eventwatch::ReconnectPolicy;
use eventwatch::Result;
use eventwatch::SledEventSink;
use eventwatch::SledNamespaceRegistry;
use eventwatch::StorageError;
use eventwatch::WatchManager;
use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let settings = EventWatchConfig::new()?.validate()?;

    // Initializing Logs
    let _guard = init_observability(&settings.logging)?;
    info!("starting with {:?}", settings);

    // Initializing Shutdown Signal
    let (graceful_tx, graceful_rx) = watch::channel(());

    if let Some(port) = settings.monitoring.metrics_port() {
        tokio::spawn(eventwatch::start_server(port, graceful_rx.clone()));
    }

    // Durable state
    let db = Arc::new(
        init_sled_db(&settings.storage.db_root_dir, settings.storage.cache_capacity_bytes)
            .map_err(StorageError::IoError)?,
    );
    let namespaces = Arc::new(SledNamespaceRegistry::new(db.clone())?);
    let sink = Arc::new(SledEventSink::new(db.clone())?);

    // Upstream
    let source = Arc::new(KubeEventSource::connect(&settings.kube).await?);
    warn_unknown_seed_namespaces(&source, &settings.watch.seed_namespaces).await;

    let manager = WatchManager::<KubeTypeConfig>::new(
        namespaces.clone(),
        sink.clone(),
        source,
        ReconnectPolicy::from(&settings.watch),
    );

    for namespace in &settings.watch.seed_namespaces {
        if let Err(e) = namespaces.add(namespace).await {
            error!(namespace = %namespace, "failed to persist seed namespace: {:?}", e);
        }
    }
    let started = manager.start().await?;
    info!("{} namespaces watched. Waiting for CTRL+C signal...", started);

    // Listen on Shutdown Signal
    let mut shutdown_rx = graceful_rx.clone();
    tokio::spawn(async {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });
    let _ = shutdown_rx.changed().await;

    manager.stop().await;
    if let Err(e) = namespaces.flush().and(sink.flush()) {
        error!("failed to flush storage on shutdown: {:?}", e);
    }

    println!("Exiting program.");
    Ok(())
}

async fn warn_unknown_seed_namespaces(
    source: &KubeEventSource,
    seeds: &[String],
) {
    if seeds.is_empty() {
        return;
    }

    match source.cluster_namespaces().await {
        Ok(existing) => {
            for seed in seeds.iter().filter(|s| !existing.contains(*s)) {
                warn!(namespace = %seed, "seed namespace does not exist in the cluster yet");
            }
        }
        Err(e) => warn!("could not list cluster namespaces: {:?}", e),
    }
}

async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt()).map_err(StorageError::IoError)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(StorageError::IoError)?;
    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT detected.");
        },
        _ = sigterm.recv() => {
            info!("SIGTERM detected.");
        },
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
        },
    }

    graceful_tx.send(()).map_err(|e| {
        error!("Failed to send shutdown signal: {}", e);
        Error::Fatal(format!("Failed to send shutdown signal: {}", e))
    })?;

    info!("Shutdown signal sent");
    Ok(())
}

/// Logs to `log_dir/eventwatch.log` when a directory is configured,
/// otherwise to stdout.
pub fn init_observability(config: &LoggingConfig) -> Result<WorkerGuard> {
    let (non_blocking, guard) = match &config.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir).map_err(|e| StorageError::PathError {
                path: log_dir.clone(),
                source: e,
            })?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, LOG_FILE_NAME))
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(base_subscriber).init();

    Ok(guard)
}
