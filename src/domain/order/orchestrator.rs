use std::sync::Arc;
use std::time::Instant;

use crate::metrics::Metrics;

use super::aggregate::Order;
use super::commands::{CreateOrderRequest, UpdateOrderStatusRequest};
use super::create_order::CreateOrder;
use super::errors::{OrderResult, PipelineError};
use super::publisher::OrderPublisher;
use super::update_status::UpdateOrderStatus;

// ============================================================================
// Order Orchestrator
// ============================================================================
//
// Persist, then publish:
//
//   START -> PERSISTED -> PUBLISHED
//   START -> FAILED_PERSIST
//   PERSISTED -> FAILED_PUBLISH
//
// Publish is only attempted once the store write has succeeded. A publish
// failure does not undo the write: the caller gets a `Publish` stage error
// for an order that is already durable.
//
// ============================================================================

pub struct OrderOrchestrator {
    create_order: CreateOrder,
    update_status: UpdateOrderStatus,
    publisher: OrderPublisher,
    metrics: Option<Arc<Metrics>>,
}

impl OrderOrchestrator {
    pub fn new(
        create_order: CreateOrder,
        update_status: UpdateOrderStatus,
        publisher: OrderPublisher,
    ) -> Self {
        Self {
            create_order,
            update_status,
            publisher,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn create_and_publish(
        &self,
        request: CreateOrderRequest,
    ) -> Result<Order, PipelineError> {
        let persisted = self.create_order.execute(request).await;
        self.publish_persisted("create", persisted).await
    }

    pub async fn update_and_publish(
        &self,
        request: UpdateOrderStatusRequest,
    ) -> Result<Order, PipelineError> {
        let persisted = self.update_status.execute(request).await;
        self.publish_persisted("update_status", persisted).await
    }

    async fn publish_persisted(
        &self,
        operation: &'static str,
        persisted: OrderResult<Order>,
    ) -> Result<Order, PipelineError> {
        let order = match persisted {
            Ok(order) => order,
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_persist_failure(operation, e.code());
                }
                tracing::warn!(
                    operation,
                    kind = %e.kind(),
                    code = e.code(),
                    "Order not persisted, skipping publish"
                );
                return Err(PipelineError::persist(e));
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_persisted(operation);
        }

        let started = Instant::now();
        let published = self.publisher.publish(&order).await;
        let elapsed = started.elapsed().as_secs_f64();

        match published {
            Ok(()) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_published(elapsed);
                }
                Ok(order)
            }
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    let code = e
                        .detail("originalCode")
                        .and_then(|v| v.as_str())
                        .unwrap_or(e.code());
                    metrics.record_publish_failure(code, elapsed);
                }
                tracing::warn!(
                    operation,
                    order_id = %order.id(),
                    "Order persisted but not published"
                );
                Err(PipelineError::publish(e))
            }
        }
    }
}
