use std::sync::Arc;

use anyhow::Context;

use priceforge_core::{Clock, SystemClock};
use priceforge_infra::{CompactionWorker, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = EngineConfig::from_env();
    priceforge_observability::init(config.log_format);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let prices = priceforge_api::app::services::build_services(&config, clock);

    let compaction = match config.compaction_interval {
        Some(interval) => Some(
            CompactionWorker::spawn("price-compaction", prices.clone(), interval)
                .context("failed to spawn compaction worker")?,
        ),
        None => {
            tracing::info!("background compaction disabled");
            None
        }
    };

    let app = priceforge_api::app::build_app(prices);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        policy = ?config.normal_price_policy,
        "listening on {}",
        listener.local_addr()?
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    if let Some(worker) = compaction {
        worker.shutdown();
    }
    served.context("server error")
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
