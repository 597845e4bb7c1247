use std::sync::Arc;

use crate::ports::{OrderStore, StoreError};

use super::aggregate::Order;
use super::commands::UpdateOrderStatusRequest;
use super::errors::{OrderError, OrderResult};

/// Loads an order, appends the requested status and writes it back.
///
/// No transition graph is enforced: any status may follow any other distinct
/// status. Two concurrent updates of the same id are not coordinated; the
/// store's last write wins.
pub struct UpdateOrderStatus {
    store: Arc<dyn OrderStore>,
}

impl UpdateOrderStatus {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, request: UpdateOrderStatusRequest) -> OrderResult<Order> {
        let UpdateOrderStatusRequest { order_id, new_status } = request;

        tracing::info!(order_id = %order_id, new_status = %new_status, "Updating order status");

        let mut order = match self.store.get_by_id(&order_id).await {
            Ok(order) => order,
            Err(e) => {
                tracing::error!(
                    order_id = %order_id,
                    code = e.code(),
                    error = %e,
                    "Failed to load order"
                );
                return Err(load_error(&order_id, e));
            }
        };

        if let Err(e) = order.change_status(new_status) {
            tracing::info!(
                order_id = %order_id,
                status = %new_status,
                "Rejected no-op status change"
            );
            return Err(e);
        }

        // On failure the mutated `order` is dropped; the store still holds the
        // previous state.
        if let Err(e) = self.store.update(&order).await {
            tracing::error!(
                order_id = %order_id,
                code = e.code(),
                error = %e,
                "Failed to save new status"
            );
            return Err(OrderError::persistence(e.code(), "failed to update order")
                .with_detail("orderId", order_id)
                .with_detail("originalError", e.to_string()));
        }

        tracing::info!(
            order_id = %order_id,
            new_status = %new_status,
            history_len = order.status_history().len(),
            "Order status updated"
        );

        Ok(order)
    }
}

fn load_error(order_id: &str, error: StoreError) -> OrderError {
    match error {
        StoreError::NotFound { .. } => OrderError::not_found(error.code(), "order not found")
            .with_detail("orderId", order_id),
        other => OrderError::persistence(other.code(), "failed to load order")
            .with_detail("orderId", order_id)
            .with_detail("originalError", other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{ErrorKind, OrderStatus};
    use crate::persistence::InMemoryOrderStore;
    use crate::testing::ScriptedStore;

    async fn seeded(status: OrderStatus) -> (Arc<InMemoryOrderStore>, Order) {
        let store = Arc::new(InMemoryOrderStore::new());
        let order = Order::new("c1", status);
        store.store(&order).await.unwrap();
        (store, order)
    }

    #[tokio::test]
    async fn test_update_appends_history() {
        let (store, order) = seeded(OrderStatus::Pending).await;
        let update = UpdateOrderStatus::new(store.clone());

        let updated = update
            .execute(UpdateOrderStatusRequest::new(order.id().to_string(), OrderStatus::Accepted))
            .await
            .unwrap();

        assert_eq!(updated.status_history().len(), order.status_history().len() + 1);
        assert_eq!(updated.current_status(), OrderStatus::Accepted);
        assert!(updated.updated_at().is_some());
        assert_eq!(updated.id(), order.id());
        assert_eq!(updated.created_at(), order.created_at());

        let stored = store.get_by_id(&order.id().to_string()).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_same_status_rejected_without_write() {
        let store = Arc::new(ScriptedStore::new());
        let order = Order::new("c1", OrderStatus::Accepted);
        store.seed(order.clone()).await;
        let update = UpdateOrderStatus::new(store.clone());

        let err = update
            .execute(UpdateOrderStatusRequest::new(order.id().to_string(), OrderStatus::Accepted))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidStatusChange);
        assert_eq!(err.code(), "INVALID_STATUS_CHANGE");
        assert_eq!(store.update_calls(), 0);

        let stored = store.get_by_id(&order.id().to_string()).await.unwrap();
        assert_eq!(stored.status_history().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = Arc::new(InMemoryOrderStore::new());
        let update = UpdateOrderStatus::new(store);

        let err = update
            .execute(UpdateOrderStatusRequest::new("ghost", OrderStatus::Accepted))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.detail("orderId").and_then(|v| v.as_str()), Some("ghost"));
    }

    #[tokio::test]
    async fn test_read_failure_is_persistence_failure() {
        let store = Arc::new(
            ScriptedStore::new().fail_get(StoreError::ReadFailed("timeout".into())),
        );
        let update = UpdateOrderStatus::new(store);

        let err = update
            .execute(UpdateOrderStatusRequest::new("any", OrderStatus::Accepted))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(err.code(), "GET_ORDER_FAILED");
    }

    #[tokio::test]
    async fn test_update_failure_keeps_previous_state() {
        let store = Arc::new(
            ScriptedStore::new().fail_update(StoreError::UpdateFailed("conflict".into())),
        );
        let order = Order::new("c1", OrderStatus::Pending);
        store.seed(order.clone()).await;
        let update = UpdateOrderStatus::new(store.clone());

        let err = update
            .execute(UpdateOrderStatusRequest::new(order.id().to_string(), OrderStatus::Finished))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert_eq!(err.code(), "UPDATE_FAILED");
        assert_eq!(store.update_calls(), 1);

        let stored = store.get_by_id(&order.id().to_string()).await.unwrap();
        assert_eq!(stored.current_status(), OrderStatus::Pending);
    }
}
