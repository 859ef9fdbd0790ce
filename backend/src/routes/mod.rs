//! API route definitions
//!
//! Everything under `/api` except login sits behind the bearer-token
//! middleware. Static aggregation paths are registered before `/:id` so
//! `/sales/stats` never parses as a sale id.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handlers;
use crate::middleware::auth_middleware;
use crate::AppState;

/// All API routes nested under /api
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/stores", store_routes())
        .nest("/sales", sale_routes())
        .nest("/uploads", upload_routes())
}

fn auth_routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/register", post(handlers::auth::register))
        .route(
            "/profile",
            get(handlers::auth::get_profile).put(handlers::auth::update_profile),
        )
        .route_layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/login", post(handlers::auth::login))
        .merge(protected)
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::product::create_product).get(handlers::product::list_products),
        )
        .route("/search", get(handlers::product::search_products))
        .route("/categories", get(handlers::product::list_categories))
        .route("/departments", get(handlers::product::list_departments))
        .route("/subcategories", get(handlers::product::list_subcategories))
        .route("/code/:item_code", get(handlers::product::get_by_item_code))
        .route("/bulk-update", post(handlers::product::bulk_update))
        .route(
            "/:id",
            get(handlers::product::get_product)
                .put(handlers::product::update_product)
                .delete(handlers::product::delete_product),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

fn store_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::store::create_store).get(handlers::store::list_stores),
        )
        .route(
            "/:id",
            get(handlers::store::get_store)
                .put(handlers::store::update_store)
                .delete(handlers::store::delete_store),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

fn sale_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::sale::create_sale).get(handlers::sale::list_sales),
        )
        .route("/stats", get(handlers::report::stats))
        .route("/daily", get(handlers::report::daily))
        .route("/monthly", get(handlers::report::monthly))
        .route("/by-product", get(handlers::report::by_product))
        .route("/by-salesperson", get(handlers::report::by_salesperson))
        .route("/:id", get(handlers::sale::get_sale))
        .route("/:id/receipt", get(handlers::sale::get_receipt))
        .route("/:id/cancel", post(handlers::sale::cancel_sale))
        .route("/:id/refund", post(handlers::sale::refund_sale))
        .route("/:id/status", put(handlers::sale::update_status))
        .route_layer(middleware::from_fn(auth_middleware))
}

fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/csv", post(handlers::upload::import_csv))
        .route_layer(middleware::from_fn(auth_middleware))
}
