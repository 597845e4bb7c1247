use serde::{Deserialize, Serialize};

use super::value_objects::OrderStatus;

// ============================================================================
// Order Requests - user intent handed to the use cases
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub client_id: String,
    pub status: OrderStatus,
}

impl CreateOrderRequest {
    pub fn new(client_id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            client_id: client_id.into(),
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub order_id: String,
    pub new_status: OrderStatus,
}

impl UpdateOrderStatusRequest {
    pub fn new(order_id: impl Into<String>, new_status: OrderStatus) -> Self {
        Self {
            order_id: order_id.into(),
            new_status,
        }
    }
}
