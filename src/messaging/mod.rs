// ============================================================================
// Messaging - MessagePublisher adapters
// ============================================================================

mod redpanda;

pub use redpanda::RedpandaPublisher;
