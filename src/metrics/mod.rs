//! Process-level counters exported in Prometheus text format.
use lazy_static::lazy_static;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;
use tokio::sync::watch;
use tracing::error;
use tracing::info;
use warp::Filter;
use warp::Rejection;
use warp::Reply;


lazy_static! {
    pub static ref EVENTS_FORWARDED: IntCounterVec = IntCounterVec::new(
        Opts::new("events_forwarded", "Events saved to the event sink"),
        &["namespace"]
    )
    .expect("metric can not be created");

    pub static ref EVENTS_DROPPED: IntCounterVec = IntCounterVec::new(
        Opts::new("events_dropped", "Upstream items that never reached the event sink"),
        &["namespace", "reason"]
    )
    .expect("metric can not be created");

    pub static ref WATCH_RECONNECTS: IntCounterVec = IntCounterVec::new(
        Opts::new("watch_reconnects", "Successful re-subscriptions after the upstream closed a stream"),
        &["namespace"]
    )
    .expect("metric can not be created");

    pub static ref ACTIVE_WATCHES: IntGauge =
        IntGauge::new("active_watches", "Namespaces with a running watch")
            .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

pub(crate) const DROP_REASON_SINK_ERROR: &str = "sink_error";
pub(crate) const DROP_REASON_MALFORMED: &str = "malformed";
pub(crate) const DROP_REASON_STREAM_ERROR: &str = "stream_error";

pub(crate) fn register_custom_metrics(registry: &Registry) {
    registry
        .register(Box::new(EVENTS_FORWARDED.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(EVENTS_DROPPED.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(WATCH_RECONNECTS.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(ACTIVE_WATCHES.clone()))
        .expect("collector can be registered");
}

/// Serves `GET /metrics` on `port` until `shutdown_signal` fires.
pub async fn start_server(
    port: u16,
    mut shutdown_signal: watch::Receiver<()>,
) {
    register_custom_metrics(&REGISTRY);

    let metrics_route = warp::path!("metrics")
        .map(|| REGISTRY.clone())
        .and_then(metrics_handler);

    info!("metrics server listening on 0.0.0.0:{}", port);
    let (_, server) =
        warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
            let _ = shutdown_signal.changed().await;
        });
    server.await;
}

async fn metrics_handler(registry: Registry) -> Result<impl Reply, Rejection> {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        error!("could not encode custom metrics: {}", e);
    };
    let body = match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            error!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    };
    Ok(body)
}
