//! Database models for the Retail Sales Tracker
//!
//! Re-exports models from the shared crate; row types that exist only to
//! back SQL queries live next to the services that run them.

pub use shared::models::*;
