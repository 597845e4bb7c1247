use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{OrderError, OrderResult};
use super::value_objects::{OrderId, OrderStatus, StatusChange};

// ============================================================================
// Order Aggregate
// ============================================================================
//
// Invariants:
// - status_history is never empty once constructed
// - current_status is always the status of the last history entry
// - history is append-only; id and created_at never change
// - every timestamp is whole milliseconds, so a stored order reads back equal
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OrderRecord", into = "OrderRecord")]
pub struct Order {
    id: OrderId,
    client_id: String,
    status_history: Vec<StatusChange>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Build a brand new order with a single history entry.
    pub fn new(client_id: impl Into<String>, status: OrderStatus) -> Self {
        let now = timestamp_now();
        Self {
            id: OrderId::new(),
            client_id: client_id.into(),
            status_history: vec![StatusChange::new(status, now)],
            created_at: now,
            updated_at: None,
        }
    }

    /// Rebuild an order from persisted parts.
    pub fn restore(
        id: OrderId,
        client_id: String,
        status_history: Vec<StatusChange>,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> OrderResult<Self> {
        if status_history.is_empty() {
            return Err(OrderError::invalid_input(
                "EMPTY_STATUS_HISTORY",
                "an order must have at least one status history entry",
            )
            .with_detail("orderId", id.to_string()));
        }

        Ok(Self {
            id,
            client_id,
            status_history,
            created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn status_history(&self) -> &[StatusChange] {
        &self.status_history
    }

    pub fn current_status(&self) -> OrderStatus {
        // Non-empty by construction.
        self.status_history[self.status_history.len() - 1].status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Append a status transition. Any distinct status is allowed; a no-op
    /// transition is rejected and leaves the order untouched.
    pub fn change_status(&mut self, new_status: OrderStatus) -> OrderResult<()> {
        let current = self.current_status();
        if current == new_status {
            return Err(OrderError::invalid_status_change(format!(
                "order is already {}",
                current
            ))
            .with_detail("orderId", self.id.to_string())
            .with_detail("status", current.as_str()));
        }

        let now = timestamp_now();
        self.status_history.push(StatusChange::new(new_status, now));
        self.updated_at = Some(now);
        Ok(())
    }
}

/// Millisecond precision, the finest a stored timestamp column keeps.
fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

// ============================================================================
// Wire / storage shape
// ============================================================================

#[derive(Serialize, Deserialize)]
struct OrderRecord {
    id: OrderId,
    client_id: String,
    status_history: Vec<StatusChange>,
    // Derived; written for consumers, ignored on read.
    #[serde(default, skip_deserializing)]
    current_status: Option<OrderStatus>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRecord> for Order {
    type Error = OrderError;

    fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
        Order::restore(
            record.id,
            record.client_id,
            record.status_history,
            record.created_at,
            record.updated_at,
        )
    }
}

impl From<Order> for OrderRecord {
    fn from(order: Order) -> Self {
        let current_status = Some(order.current_status());
        OrderRecord {
            id: order.id,
            client_id: order.client_id,
            status_history: order.status_history,
            current_status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
