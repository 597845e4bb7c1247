use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_relay::config::{AppConfig, StoreBackend};
use order_relay::domain::order::{
    CreateOrder, CreateOrderRequest, OrderOrchestrator, OrderPublisher, OrderStatus,
    UpdateOrderStatus, UpdateOrderStatusRequest,
};
use order_relay::messaging::RedpandaPublisher;
use order_relay::metrics::{self, Metrics};
use order_relay::persistence::{InMemoryOrderStore, ScyllaOrderStore};
use order_relay::ports::OrderStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter, e.g. RUST_LOG=debug
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_relay=debug")),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "Starting order relay");

    // === 1. Metrics ===
    let metrics = Arc::new(Metrics::new()?);
    let metrics_registry = Arc::new(metrics.registry().clone());
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(error = %e, "Could not start metrics runtime");
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, metrics_port).await {
                tracing::error!(error = %e, "Metrics server error");
            }
        });
    });

    // === 2. Order store ===
    let store: Arc<dyn OrderStore> = match config.store_backend {
        StoreBackend::Scylla => Arc::new(
            ScyllaOrderStore::connect(&config.scylla_nodes, &config.scylla_keyspace).await?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory order store; orders are lost on exit");
            Arc::new(InMemoryOrderStore::new())
        }
    };

    // === 3. Broker ===
    let publisher = Arc::new(
        RedpandaPublisher::new(&config.kafka_brokers, config.publish_retry.clone())?
            .with_metrics(metrics.clone()),
    );

    // === 4. Use cases, wired explicitly ===
    let orchestrator = OrderOrchestrator::new(
        CreateOrder::new(store.clone()),
        UpdateOrderStatus::new(store.clone()),
        OrderPublisher::new(publisher),
    )
    .with_metrics(metrics);

    // === 5. Demonstrate an order lifecycle ===
    let order = match orchestrator
        .create_and_publish(CreateOrderRequest::new(
            uuid::Uuid::new_v4().to_string(),
            OrderStatus::Pending,
        ))
        .await
    {
        Ok(order) => order,
        Err(e) => {
            tracing::error!(stage = %e.stage(), error = %e, "Create failed");
            return Err(e.into());
        }
    };
    tracing::info!(order_id = %order.id(), "Order created and published");

    for next in [OrderStatus::Accepted, OrderStatus::Finished] {
        let request = UpdateOrderStatusRequest::new(order.id().to_string(), next);
        match orchestrator.update_and_publish(request).await {
            Ok(updated) => tracing::info!(
                order_id = %updated.id(),
                status = %updated.current_status(),
                history_len = updated.status_history().len(),
                "Order status updated and published"
            ),
            Err(e) if e.is_persisted() => tracing::warn!(
                order_id = %order.id(),
                error = %e,
                "Status saved but not announced"
            ),
            Err(e) => {
                tracing::error!(order_id = %order.id(), error = %e, "Status update failed");
                return Err(e.into());
            }
        }
    }

    tracing::info!(
        port = metrics_port,
        "Demo complete; serving /metrics and /health until Ctrl+C"
    );
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");
    Ok(())
}
