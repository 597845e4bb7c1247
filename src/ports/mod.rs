// ============================================================================
// Ports - collaborators the order use cases depend on
// ============================================================================
//
// The use cases only see these traits. Concrete adapters live in
// `persistence` (stores) and `messaging` (publishers).
//
// ============================================================================

pub mod message_publisher;
pub mod order_store;

pub use message_publisher::{MessagePublisher, PublishError};
pub use order_store::{OrderStore, StoreError};
