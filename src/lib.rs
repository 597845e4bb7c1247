//! Order lifecycle service: create orders, change their status, persist every
//! change and then announce it on the `orders` channel.
//!
//! Persistence and publication are two awaited steps. A failed write is never
//! published; a failed publication leaves the write in place and is reported
//! as its own error stage.

pub mod config;
pub mod domain;
pub mod messaging;
pub mod metrics;
pub mod persistence;
pub mod ports;
pub mod utils;

#[cfg(test)]
mod testing;
