use std::sync::Arc;

use crate::ports::OrderStore;

use super::aggregate::Order;
use super::commands::CreateOrderRequest;
use super::errors::{OrderError, OrderResult};

/// Validates a create request, builds the order and writes it once.
///
/// Publishing is left to the orchestrator.
pub struct CreateOrder {
    store: Arc<dyn OrderStore>,
}

impl CreateOrder {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, request: CreateOrderRequest) -> OrderResult<Order> {
        let CreateOrderRequest { client_id, status } = request;

        if client_id.trim().is_empty() {
            tracing::info!(client_id = %client_id, "Rejected order with empty client id");
            return Err(OrderError::invalid_input(
                "INVALID_CLIENT_ID",
                "the clientId is required and must be a non-empty string",
            )
            .with_detail("clientId", client_id));
        }

        let order = Order::new(client_id, status);

        if let Err(e) = self.store.store(&order).await {
            tracing::error!(
                order_id = %order.id(),
                code = e.code(),
                error = %e,
                "Failed to store order"
            );
            return Err(OrderError::persistence(e.code(), "failed to store order")
                .with_detail("orderId", order.id().to_string())
                .with_detail("originalError", e.to_string()));
        }

        tracing::info!(
            order_id = %order.id(),
            client_id = %order.client_id(),
            status = %order.current_status(),
            "Order created"
        );

        Ok(order)
    }
}
