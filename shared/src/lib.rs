//! Shared types and models for the Retail Sales Tracker
//!
//! This crate contains the domain vocabulary shared between the backend and
//! any other component of the system: enums for sale/user state, pagination
//! and date-range types, and pure validation helpers that need no I/O.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
