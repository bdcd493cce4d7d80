//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Handlers take the caller-owned `DeviceState` by `&mut`, so mutations for
//! one device are serialized by ownership rather than locks.

pub mod handlers;

pub use handlers::*;
