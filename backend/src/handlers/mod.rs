//! HTTP request handlers
//!
//! Thin translation layer: extract inputs, call the service, map the result
//! to a status code. No business logic lives here.

pub mod auth;
pub mod product;
pub mod report;
pub mod sale;
pub mod store;
pub mod upload;
