// ============================================================================
// Test doubles for the order ports
// ============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::order::Order;
use crate::persistence::InMemoryOrderStore;
use crate::ports::{MessagePublisher, OrderStore, PublishError, StoreError};

/// In-memory store whose individual operations can be told to fail.
/// Counts every call, failed or not.
#[derive(Default)]
pub struct ScriptedStore {
    inner: InMemoryOrderStore,
    store_error: Option<StoreError>,
    update_error: Option<StoreError>,
    get_error: Option<StoreError>,
    store_calls: AtomicUsize,
    update_calls: AtomicUsize,
    get_calls: AtomicUsize,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_store(mut self, error: StoreError) -> Self {
        self.store_error = Some(error);
        self
    }

    pub fn fail_update(mut self, error: StoreError) -> Self {
        self.update_error = Some(error);
        self
    }

    pub fn fail_get(mut self, error: StoreError) -> Self {
        self.get_error = Some(error);
        self
    }

    /// Put an order in place without going through (or counting) `store`.
    pub async fn seed(&self, order: Order) {
        self.inner
            .store(&order)
            .await
            .expect("seeded order ids are unique");
    }

    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderStore for ScriptedStore {
    async fn store(&self, order: &Order) -> Result<(), StoreError> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        match &self.store_error {
            Some(e) => Err(e.clone()),
            None => self.inner.store(order).await,
        }
    }

    async fn update(&self, order: &Order) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        match &self.update_error {
            Some(e) => Err(e.clone()),
            None => self.inner.update(order).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Order, StoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        match &self.get_error {
            Some(e) => Err(e.clone()),
            None => self.inner.get_by_id(id).await,
        }
    }
}

/// Publisher that remembers what it was asked to send.
#[derive(Default)]
pub struct RecordingPublisher {
    fail_with: Option<PublishError>,
    published: Mutex<Vec<(String, Order)>>,
    calls: AtomicUsize,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(mut self, error: PublishError) -> Self {
        self.fail_with = Some(error);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Successfully published (channel, order) pairs in send order.
    pub async fn published(&self) -> Vec<(String, Order)> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl MessagePublisher for RecordingPublisher {
    async fn publish(&self, channel: &str, payload: &Order) -> Result<(), PublishError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }
        self.published
            .lock()
            .await
            .push((channel.to_string(), payload.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;

    #[tokio::test]
    async fn test_scripted_store_counts_failed_calls() {
        let store = ScriptedStore::new().fail_get(StoreError::ReadFailed("x".into()));

        assert!(store.get_by_id("a").await.is_err());
        assert!(store.get_by_id("b").await.is_err());
        assert_eq!(store.get_calls(), 2);
        assert_eq!(store.store_calls(), 0);
    }

    #[tokio::test]
    async fn test_recording_publisher_skips_failed_sends() {
        let publisher =
            RecordingPublisher::new().fail_with(PublishError::BrokerFailure("x".into()));
        let order = Order::new("c1", OrderStatus::Pending);

        assert!(publisher.publish("orders", &order).await.is_err());
        assert_eq!(publisher.calls(), 1);
        assert!(publisher.published().await.is_empty());
    }
}
