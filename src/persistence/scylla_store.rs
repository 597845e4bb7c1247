use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;

use crate::domain::order::{Order, OrderId, StatusChange};
use crate::ports::{OrderStore, StoreError};

// ============================================================================
// ScyllaDB Order Store
// ============================================================================
//
// One row per order. The status timeline is kept as a JSON array in a text
// column so its order is exactly what the aggregate produced.
//
// `update` checks for the row first and then overwrites it. The two steps are
// not atomic; concurrent updates of one id resolve as last-write-wins.
//
// ============================================================================

type OrderRow = (String, String, String, DateTime<Utc>, Option<DateTime<Utc>>);

pub struct ScyllaOrderStore {
    session: Arc<Session>,
}

impl ScyllaOrderStore {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Connect to the cluster and make sure keyspace and table exist.
    pub async fn connect(nodes: &[String], keyspace: &str) -> anyhow::Result<Self> {
        tracing::info!(nodes = ?nodes, keyspace, "Connecting to ScyllaDB");

        let session: Session = SessionBuilder::new().known_nodes(nodes).build().await?;

        session
            .query_unpaged(
                format!(
                    "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = \
                     {{'class': 'SimpleStrategy', 'replication_factor': 1}}",
                    keyspace
                ),
                &[],
            )
            .await?;

        session.use_keyspace(keyspace, false).await?;

        session
            .query_unpaged(
                "CREATE TABLE IF NOT EXISTS orders (
                    id text PRIMARY KEY,
                    client_id text,
                    status_history text,
                    created_at timestamp,
                    updated_at timestamp
                )",
                &[],
            )
            .await?;

        tracing::info!(keyspace, "ScyllaDB order schema ready");
        Ok(Self::new(Arc::new(session)))
    }

    async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let result = self
            .session
            .query_unpaged("SELECT id FROM orders WHERE id = ?", (id.to_string(),))
            .await
            .map_err(read_failed)?;

        let rows = result.into_rows_result().map_err(read_failed)?;

        rows.maybe_first_row::<(String,)>()
            .map(|row| row.is_some())
            .map_err(read_failed)
    }
}

#[async_trait]
impl OrderStore for ScyllaOrderStore {
    async fn store(&self, order: &Order) -> Result<(), StoreError> {
        let history = encode_history(order.status_history())
            .map_err(|e| StoreError::StoreFailed(e.to_string()))?;

        self.session
            .query_unpaged(
                "INSERT INTO orders (id, client_id, status_history, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?)",
                (
                    order.id().to_string(),
                    order.client_id().to_string(),
                    history,
                    order.created_at(),
                    order.updated_at(),
                ),
            )
            .await
            .map_err(|e| StoreError::StoreFailed(e.to_string()))?;

        tracing::debug!(order_id = %order.id(), "Inserted order row");
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), StoreError> {
        let id = order.id().to_string();

        if !self
            .exists(&id)
            .await
            .map_err(|e| StoreError::UpdateFailed(e.to_string()))?
        {
            return Err(StoreError::not_found(id));
        }

        let history = encode_history(order.status_history())
            .map_err(|e| StoreError::UpdateFailed(e.to_string()))?;

        self.session
            .query_unpaged(
                "UPDATE orders SET status_history = ?, updated_at = ? WHERE id = ?",
                (history, order.updated_at(), id.clone()),
            )
            .await
            .map_err(|e| StoreError::UpdateFailed(e.to_string()))?;

        tracing::debug!(order_id = %id, "Updated order row");
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Order, StoreError> {
        let result = self
            .session
            .query_unpaged(
                "SELECT id, client_id, status_history, created_at, updated_at
                 FROM orders WHERE id = ?",
                (id.to_string(),),
            )
            .await
            .map_err(read_failed)?;

        let rows = result.into_rows_result().map_err(read_failed)?;

        match rows.maybe_first_row::<OrderRow>() {
            Ok(Some(row)) => decode_row(row),
            Ok(None) => Err(StoreError::not_found(id)),
            Err(e) => Err(read_failed(e)),
        }
    }
}

/// Any read that did not produce a usable row set. Never reported as `NotFound`.
fn read_failed(e: impl std::fmt::Display) -> StoreError {
    StoreError::ReadFailed(e.to_string())
}

fn encode_history(history: &[StatusChange]) -> serde_json::Result<String> {
    serde_json::to_string(history)
}

fn decode_row(row: OrderRow) -> Result<Order, StoreError> {
    let (id, client_id, history_json, created_at, updated_at) = row;

    let order_id: OrderId = id
        .parse()
        .map_err(|e| StoreError::ReadFailed(format!("invalid order id {:?}: {}", id, e)))?;
    let history: Vec<StatusChange> = serde_json::from_str(&history_json)
        .map_err(|e| StoreError::ReadFailed(format!("invalid status history: {}", e)))?;

    Order::restore(order_id, client_id, history, created_at, updated_at)
        .map_err(read_failed)
}

// ============================================================================
// Unit Tests
// ============================================================================
//
// Row mapping only; queries need a live cluster.
//
// ============================================================================
