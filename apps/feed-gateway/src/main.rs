//! Feed Gateway Binary
//!
//! Starts the market data ingestion gateway against the simulated feed.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin feed-gateway
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `FEED_BROKER_ID`: Broker id for the feed login
//! - `FEED_USER_ID`: User id for the feed login
//! - `FEED_PASSWORD`: Password for the feed login
//!
//! ## Optional
//! - `FEED_INSTRUMENTS`: Comma-separated instrument interest list
//! - `FEED_GATEWAY_HEALTH_PORT`: Health check HTTP port (default: 8083)
//! - `FEED_GATEWAY_STATIC_CAPACITY`: Static record channel capacity (default: 1000)
//! - `FEED_GATEWAY_DEPTH_CAPACITY`: Depth record channel capacity (default: 10000)
//! - `FEED_GATEWAY_TICK_INTERVAL_MS`: Sim feed tick cadence (default: 500)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: true)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4318>)
//! - `OTEL_SERVICE_NAME`: Service name (default: tickstream-feed-gateway)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use feed_gateway::infrastructure::{metrics, telemetry};
use feed_gateway::{
    FeedEvent, GatewayConfig, GatewayStatus, HealthServer, HealthServerState, InMemoryDirectory,
    InstrumentDirectory, MarketSession, RecordHub, SharedRecordHub, SimFeed, SimFeedConfig,
    init_metrics,
};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Initialize telemetry (OpenTelemetry + tracing)
    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting feed gateway");

    // Initialize Prometheus metrics
    let _metrics_handle = init_metrics();

    let config = GatewayConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    // Instrument directory seeded with the configured universe
    let directory = Arc::new(InMemoryDirectory::from_symbols(
        config.instruments.iter().cloned(),
    ));

    // Record hub for downstream distribution
    let hub: SharedRecordHub = Arc::new(RecordHub::new(config.channel));

    // Shared session view for the health endpoint
    let status = Arc::new(GatewayStatus::new());

    // Health server
    let health_state = Arc::new(HealthServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        Arc::clone(&status),
        Arc::clone(&hub),
    ));
    let health_server = HealthServer::new(
        config.server.health_port,
        health_state,
        shutdown_token.clone(),
    );
    tokio::spawn(async move {
        if let Err(e) = health_server.run().await {
            tracing::error!(error = %e, "Health server error");
        }
    });

    // Demo downstream consumers: log records as they arrive
    spawn_static_consumer(&hub);
    spawn_depth_consumer(&hub);

    // Simulated feed and the session it drives
    let feed = SimFeed::new(SimFeedConfig {
        trading_day: Utc::now().format("%Y%m%d").to_string(),
        base_price: config.sim.base_price,
    });
    let mut session = MarketSession::new(
        Arc::clone(&directory),
        feed.clone(),
        Arc::clone(&hub),
        config.credentials.clone(),
    );
    session.configure_interest(config.instruments.clone());

    let interested = session.interest().interested_count() as u64;
    status.set_interested_instruments(interested);
    metrics::set_interested_instruments(interested as f64);

    feed.connect();

    let event_loop = tokio::spawn(run_event_loop(
        session,
        feed,
        directory,
        Arc::clone(&status),
        config.sim.tick_interval,
        shutdown_token.clone(),
    ));

    tracing::info!("Feed gateway ready");

    await_shutdown(shutdown_token).await;
    let _ = event_loop.await;

    tracing::info!("Feed gateway stopped");
    Ok(())
}

/// Drive the single-threaded session event loop.
///
/// Protocol events (connect, login, acks) drain back-to-back; tick
/// synthesis is paced at the configured interval.
async fn run_event_loop(
    mut session: MarketSession<Arc<InMemoryDirectory>, SimFeed, SharedRecordHub>,
    feed: SimFeed,
    directory: Arc<InMemoryDirectory>,
    status: Arc<GatewayStatus>,
    tick_interval: Duration,
    cancel: CancellationToken,
) {
    while !cancel.is_cancelled() {
        let pace = match feed.poll() {
            Some(event) => {
                let is_tick = matches!(event, FeedEvent::Tick(_));
                observe_event(&event, &directory, &status);

                if is_tick {
                    let started = Instant::now();
                    session.handle(event);
                    metrics::record_dispatch_duration(started.elapsed());
                } else {
                    session.handle(event);
                }

                status.set_state(session.state());
                status.set_trading_day(session.trading_day().map(ToString::to_string));
                is_tick
            }
            None => true,
        };

        if pace {
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(tick_interval) => {}
            }
        }
    }

    tracing::info!("Event loop stopped");
}

/// Record event-level metrics before the session consumes the event.
fn observe_event(event: &FeedEvent, directory: &Arc<InMemoryDirectory>, status: &GatewayStatus) {
    match event {
        FeedEvent::Tick(tick) => {
            status.increment_ticks();
            metrics::record_tick_received();
            if directory.resolve(&tick.symbol).is_none() {
                metrics::record_unknown_instrument();
            }
        }
        FeedEvent::LoginRejected { .. } => metrics::record_protocol_error("login"),
        FeedEvent::FeedError { .. } => metrics::record_protocol_error("feed"),
        FeedEvent::SubscribeAck { status: ack, .. } if !ack.is_ok() => {
            metrics::record_protocol_error("subscribe");
        }
        FeedEvent::UnsubscribeAck { status: ack, .. } if !ack.is_ok() => {
            metrics::record_protocol_error("unsubscribe");
        }
        _ => {}
    }
}

/// Log static records as a demo downstream consumer.
fn spawn_static_consumer(hub: &SharedRecordHub) {
    let mut rx = hub.static_rx();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(record) => tracing::info!(
                    instrument = record.instrument,
                    prev_close = record.prev_close,
                    upper_limit = record.upper_limit,
                    lower_limit = record.lower_limit,
                    "Static record"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Static consumer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Log depth records as a demo downstream consumer.
fn spawn_depth_consumer(hub: &SharedRecordHub) {
    let mut rx = hub.depth_rx();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(record) => tracing::debug!(
                    instrument = record.instrument,
                    last = record.last,
                    volume = record.volume,
                    turnover = record.turnover,
                    "Depth record"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Depth consumer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &GatewayConfig) {
    tracing::info!(
        instruments = config.instruments.len(),
        health_port = config.server.health_port,
        static_capacity = config.channel.static_capacity,
        depth_capacity = config.channel.depth_capacity,
        tick_interval_ms = config.sim.tick_interval.as_millis() as u64,
        "Configuration loaded"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
