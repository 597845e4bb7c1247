use async_trait::async_trait;

use crate::domain::order::Order;

/// Failures reported by an order store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("order not found: {id}")]
    NotFound { id: String },

    #[error("failed to store order: {0}")]
    StoreFailed(String),

    #[error("failed to update order: {0}")]
    UpdateFailed(String),

    #[error("failed to read order: {0}")]
    ReadFailed(String),
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        StoreError::NotFound { id: id.into() }
    }

    /// Machine-readable code carried into `OrderError`.
    pub const fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound { .. } => "NOT_FOUND",
            StoreError::StoreFailed(_) => "STORE_FAILED",
            StoreError::UpdateFailed(_) => "UPDATE_FAILED",
            StoreError::ReadFailed(_) => "GET_ORDER_FAILED",
        }
    }
}

/// Durable keyed storage for orders.
///
/// Concurrent writers to the same id are not coordinated here; the last
/// successful `update` wins.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Create a new record.
    async fn store(&self, order: &Order) -> Result<(), StoreError>;

    /// Overwrite an existing record keyed by id.
    async fn update(&self, order: &Order) -> Result<(), StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Order, StoreError>;
}
