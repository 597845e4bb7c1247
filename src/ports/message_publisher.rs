use async_trait::async_trait;

use crate::domain::order::Order;
use crate::utils::IsTransient;

/// Failures reported by a message publisher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    #[error("broker failure: {0}")]
    BrokerFailure(String),

    #[error("broker connection failed: {0}")]
    ConnectionFailed(String),
}

impl PublishError {
    pub const fn code(&self) -> &'static str {
        match self {
            PublishError::BrokerFailure(_) => "BROKER_FAILURE",
            PublishError::ConnectionFailed(_) => "BROKER_CONNECTION_FAILED",
        }
    }
}

impl IsTransient for PublishError {
    fn is_transient(&self) -> bool {
        // An open circuit or a dead producer will not heal within one publish call.
        matches!(self, PublishError::BrokerFailure(_))
    }
}

/// Delivery of a serialized order to a named channel.
///
/// The wire format and any reconnect/retry policy belong to the implementation;
/// callers see a single awaited `publish`.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, channel: &str, payload: &Order) -> Result<(), PublishError>;
}
