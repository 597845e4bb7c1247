// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Pure order logic and the use cases built on it. I/O happens only through
// the traits in `crate::ports`.
//
// ============================================================================

pub mod order;
