//! Domain models for the Retail Sales Tracker

pub mod sale;
pub mod user;

pub use sale::*;
pub use user::*;
