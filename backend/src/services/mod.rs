//! Business logic services
//!
//! Each service owns one slice of the domain and talks to Postgres through
//! a cloned pool handle. Handlers construct services per request.

pub mod auth;
pub mod import;
pub mod product;
pub mod report;
pub mod sale;
pub mod store;

pub use auth::AuthService;
pub use import::ImportService;
pub use product::ProductService;
pub use report::ReportService;
pub use sale::SaleService;
pub use store::StoreService;
