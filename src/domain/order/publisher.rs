use std::sync::Arc;

use crate::ports::MessagePublisher;

use super::aggregate::Order;
use super::errors::{OrderError, OrderResult};

/// Channel every order change is announced on.
pub const ORDERS_CHANNEL: &str = "orders";

/// Hands an order to the message publisher and turns transport failures into
/// `PublicationFailure`. Retrying is the publisher's business.
pub struct OrderPublisher {
    publisher: Arc<dyn MessagePublisher>,
    channel: String,
}

impl OrderPublisher {
    pub fn new(publisher: Arc<dyn MessagePublisher>) -> Self {
        Self {
            publisher,
            channel: ORDERS_CHANNEL.to_string(),
        }
    }

    pub async fn publish(&self, order: &Order) -> OrderResult<()> {
        tracing::info!(order_id = %order.id(), channel = %self.channel, "Publishing order");

        if let Err(e) = self.publisher.publish(&self.channel, order).await {
            tracing::error!(
                order_id = %order.id(),
                channel = %self.channel,
                code = e.code(),
                error = %e,
                "Failed to publish order"
            );
            return Err(OrderError::publication(
                "the system failed to finalize the order publication process",
            )
            .with_detail("orderId", order.id().to_string())
            .with_detail("originalCode", e.code())
            .with_detail("originalError", e.to_string()));
        }

        tracing::info!(order_id = %order.id(), channel = %self.channel, "Order published");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{ErrorKind, OrderStatus};
    use crate::ports::PublishError;
    use crate::testing::RecordingPublisher;

    #[tokio::test]
    async fn test_publishes_whole_order_to_orders_channel() {
        let transport = Arc::new(RecordingPublisher::new());
        let publisher = OrderPublisher::new(transport.clone());
        let order = Order::new("c1", OrderStatus::Pending);

        publisher.publish(&order).await.unwrap();

        let sent = transport.published().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "orders");
        assert_eq!(sent[0].1, order);
    }

    #[tokio::test]
    async fn test_broker_failure_becomes_publication_failure() {
        let transport = Arc::new(
            RecordingPublisher::new().fail_with(PublishError::BrokerFailure("nack".into())),
        );
        let publisher = OrderPublisher::new(transport.clone());
        let order = Order::new("c1", OrderStatus::Pending);

        let err = publisher.publish(&order).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PublicationFailure);
        assert_eq!(err.code(), "PUBLICATION_FAILURE");
        assert_eq!(
            err.detail("originalCode").and_then(|v| v.as_str()),
            Some("BROKER_FAILURE")
        );
        assert_eq!(
            err.detail("orderId").and_then(|v| v.as_str()),
            Some(order.id().to_string().as_str())
        );
        // No retry at this layer.
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_connection_failure_code_is_kept() {
        let transport = Arc::new(
            RecordingPublisher::new()
                .fail_with(PublishError::ConnectionFailed("no route to broker".into())),
        );
        let publisher = OrderPublisher::new(transport);

        let err = publisher
            .publish(&Order::new("c1", OrderStatus::Accepted))
            .await
            .unwrap_err();

        assert_eq!(
            err.detail("originalCode").and_then(|v| v.as_str()),
            Some("BROKER_CONNECTION_FAILED")
        );
    }
}
