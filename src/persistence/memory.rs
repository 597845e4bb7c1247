use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::order::Order;
use crate::ports::{OrderStore, StoreError};

/// Order store kept in process memory.
///
/// Used by tests and as the `memory` backend for local runs; nothing survives
/// a restart.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.orders.read().await.contains_key(id)
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn store(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let key = order.id().to_string();
        if orders.contains_key(&key) {
            return Err(StoreError::StoreFailed(format!("order {} already exists", key)));
        }
        orders.insert(key, order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id().to_string()) {
            Some(slot) => {
                *slot = order.clone();
                Ok(())
            }
            None => Err(StoreError::not_found(order.id().to_string())),
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Order, StoreError> {
        self.orders
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }
}
