use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
};

use crate::domain::order::Order;
use crate::metrics::Metrics;
use crate::ports::{MessagePublisher, PublishError};
use crate::utils::{
    retry_on_transient, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, RetryConfig,
};

// ============================================================================
// Redpanda (Kafka API) Order Publisher
// ============================================================================
//
// Orders go out as JSON keyed by order id, so every change of one order lands
// on the same partition. Transient send errors are retried here with bounded
// backoff; a tripped circuit breaker fails fast with ConnectionFailed.
//
// ============================================================================

pub struct RedpandaPublisher {
    producer: FutureProducer,
    circuit_breaker: CircuitBreaker,
    retry: RetryConfig,
    send_timeout: Duration,
    metrics: Option<Arc<Metrics>>,
}

impl RedpandaPublisher {
    pub fn new(brokers: &str, retry: RetryConfig) -> Result<Self, PublishError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| PublishError::ConnectionFailed(e.to_string()))?;

        tracing::info!(brokers, max_attempts = retry.max_attempts, "Redpanda producer created");

        Ok(Self {
            producer,
            circuit_breaker: CircuitBreaker::new(CircuitBreakerConfig {
                failure_threshold: 5,
                open_timeout: Duration::from_secs(30),
                success_threshold: 3,
            }),
            retry,
            send_timeout: Duration::from_secs(5),
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

#[async_trait]
impl MessagePublisher for RedpandaPublisher {
    async fn publish(&self, channel: &str, payload: &Order) -> Result<(), PublishError> {
        let key_owned = payload.id().to_string();
        let body_owned = serde_json::to_string(payload)
            .map_err(|e| PublishError::BrokerFailure(format!("serialization failed: {}", e)))?;

        let producer = &self.producer;
        let key = key_owned.as_str();
        let body = body_owned.as_str();
        let timeout = self.send_timeout;

        let result = deliver(
            &self.retry,
            &self.circuit_breaker,
            self.metrics.as_deref(),
            move |_attempt| async move {
                let record = FutureRecord::to(channel).key(key).payload(body);
                producer
                    .send(record, Timeout::After(timeout))
                    .await
                    .map(|_| ())
                    .map_err(|(e, _)| PublishError::BrokerFailure(e.to_string()))
            },
        )
        .await;

        if result.is_ok() {
            tracing::debug!(topic = %channel, key = %key, "Published to Redpanda");
        }
        result
    }
}

/// Send through the circuit breaker, retrying transient failures.
pub(crate) async fn deliver<F, Fut>(
    retry: &RetryConfig,
    breaker: &CircuitBreaker,
    metrics: Option<&Metrics>,
    mut send: F,
) -> Result<(), PublishError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<(), PublishError>>,
{
    let outcome = retry_on_transient(retry.clone(), move |attempt| {
        let send_fut = send(attempt);
        // Polled only when the breaker lets the send through.
        let guarded = async move {
            if attempt > 1 {
                if let Some(metrics) = metrics {
                    metrics.record_retry_attempt();
                }
            }
            send_fut.await
        };
        async move {
            breaker.call(guarded).await.map_err(|e| match e {
                CircuitBreakerError::CircuitOpen => {
                    PublishError::ConnectionFailed("circuit breaker open for Redpanda".into())
                }
                CircuitBreakerError::OperationFailed(e) => e,
            })
        }
    })
    .await;

    if let Some(metrics) = metrics {
        metrics.update_circuit_state(breaker.state().as_gauge());
    }

    outcome.into_result()
}
