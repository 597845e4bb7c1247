// Private module declaration
mod server;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for the order pipeline
// ============================================================================
//
// - Persistence outcomes per operation (create / update_status)
// - Publication outcomes and latency
// - Publisher retries and circuit breaker state
//
// Scraped via /metrics on the metrics server.
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub orders_persisted: IntCounterVec,
    pub orders_persist_failed: IntCounterVec,

    pub orders_published: IntCounter,
    pub orders_publish_failed: IntCounterVec,
    pub publish_duration: Histogram,

    pub publish_retry_attempts: IntCounter,
    pub publisher_circuit_state: IntGauge,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let orders_persisted = IntCounterVec::new(
            Opts::new("orders_persisted_total", "Orders successfully written to the store"),
            &["operation"],
        )?;
        registry.register(Box::new(orders_persisted.clone()))?;

        let orders_persist_failed = IntCounterVec::new(
            Opts::new(
                "orders_persist_failed_total",
                "Order operations that failed before publication",
            ),
            &["operation", "code"],
        )?;
        registry.register(Box::new(orders_persist_failed.clone()))?;

        let orders_published = IntCounter::new(
            "orders_published_total",
            "Orders successfully handed to the message broker",
        )?;
        registry.register(Box::new(orders_published.clone()))?;

        let orders_publish_failed = IntCounterVec::new(
            Opts::new(
                "orders_publish_failed_total",
                "Persisted orders that could not be published",
            ),
            &["code"],
        )?;
        registry.register(Box::new(orders_publish_failed.clone()))?;

        let publish_duration = Histogram::with_opts(
            HistogramOpts::new("order_publish_duration_seconds", "Order publication latency")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(publish_duration.clone()))?;

        let publish_retry_attempts = IntCounter::new(
            "publish_retry_attempts_total",
            "Broker sends retried after a transient failure",
        )?;
        registry.register(Box::new(publish_retry_attempts.clone()))?;

        let publisher_circuit_state = IntGauge::new(
            "publisher_circuit_state",
            "Publisher circuit breaker state (0=Closed, 1=Open, 2=HalfOpen)",
        )?;
        registry.register(Box::new(publisher_circuit_state.clone()))?;

        Ok(Self {
            registry,
            orders_persisted,
            orders_persist_failed,
            orders_published,
            orders_publish_failed,
            publish_duration,
            publish_retry_attempts,
            publisher_circuit_state,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_persisted(&self, operation: &str) {
        self.orders_persisted.with_label_values(&[operation]).inc();
    }

    pub fn record_persist_failure(&self, operation: &str, code: &str) {
        self.orders_persist_failed
            .with_label_values(&[operation, code])
            .inc();
    }

    pub fn record_published(&self, duration_secs: f64) {
        self.orders_published.inc();
        self.publish_duration.observe(duration_secs);
    }

    pub fn record_publish_failure(&self, code: &str, duration_secs: f64) {
        self.orders_publish_failed.with_label_values(&[code]).inc();
        self.publish_duration.observe(duration_secs);
    }

    pub fn record_retry_attempt(&self) {
        self.publish_retry_attempts.inc();
    }

    pub fn update_circuit_state(&self, gauge: i64) {
        self.publisher_circuit_state.set(gauge);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        metrics.record_published(0.01);
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_persistence_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.record_persisted("create");
        metrics.record_persisted("create");
        metrics.record_persist_failure("update_status", "NOT_FOUND");

        let gathered = metrics.registry().gather();
        let persisted = gathered
            .iter()
            .find(|m| m.name() == "orders_persisted_total")
            .unwrap();
        assert_eq!(persisted.metric[0].counter.value, Some(2.0));

        assert_eq!(
            metrics
                .orders_persist_failed
                .with_label_values(&["update_status", "NOT_FOUND"])
                .get(),
            1
        );
    }

    #[test]
    fn test_record_publication_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.record_published(0.02);
        metrics.record_publish_failure("BROKER_FAILURE", 0.5);

        assert_eq!(metrics.orders_published.get(), 1);
        assert_eq!(
            metrics
                .orders_publish_failed
                .with_label_values(&["BROKER_FAILURE"])
                .get(),
            1
        );
        assert_eq!(metrics.publish_duration.get_sample_count(), 2);
    }

    #[test]
    fn test_circuit_state_gauge() {
        let metrics = Metrics::new().unwrap();
        metrics.update_circuit_state(1);
        metrics.record_retry_attempt();

        let gathered = metrics.registry().gather();
        let state = gathered
            .iter()
            .find(|m| m.name() == "publisher_circuit_state")
            .unwrap();
        assert_eq!(state.metric[0].gauge.value, Some(1.0));
        assert_eq!(metrics.publish_retry_attempts.get(), 1);
    }
}
