//! Application layer - Services orchestrating the payment lifecycle
//!
//! This module contains application services that coordinate domain logic,
//! storage, and outbound delivery.

pub mod services;

pub use services::*;
