// ============================================================================
// Persistence - OrderStore adapters
// ============================================================================

mod memory;
mod scylla_store;

pub use memory::InMemoryOrderStore;
pub use scylla_store::ScyllaOrderStore;
