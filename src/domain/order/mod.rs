// ============================================================================
// Order Domain
// ============================================================================
//
// - Value objects (OrderId, OrderStatus, StatusChange)
// - Aggregate (Order and its status timeline)
// - Requests (CreateOrderRequest, UpdateOrderStatusRequest)
// - Errors (OrderError, PipelineError)
// - Use cases (CreateOrder, UpdateOrderStatus, OrderPublisher)
// - Orchestrator (persist, then publish)
//
// ============================================================================

pub mod value_objects;
pub mod aggregate;
pub mod commands;
pub mod errors;
pub mod create_order;
pub mod update_status;
pub mod publisher;
pub mod orchestrator;

pub use value_objects::*;
pub use aggregate::*;
pub use commands::*;
pub use errors::*;
pub use create_order::*;
pub use update_status::*;
pub use publisher::*;
pub use orchestrator::*;
