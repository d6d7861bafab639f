//! HTTP surface: application state and router

pub mod handlers;

use axum::Router;
use axum::routing::{get, post, put};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cache::{CatalogCache, Clock};
use crate::config::AppConfig;
use crate::services::{CartService, CatalogService, InventoryService, OrderService, UserService};
use crate::store::StoreAdapter;
use handlers::*;

/// Shared application state: one instance of each service, built once per
/// process and handed to the router (no ambient singletons)
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub inventory: Arc<InventoryService>,
    pub carts: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub users: Arc<UserService>,
}

impl AppState {
    pub fn new(store: Arc<dyn StoreAdapter>, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let cache = Arc::new(CatalogCache::new(config.cache_ttl(), clock));
        let carts = Arc::new(CartService::new(store.clone()));
        Self {
            catalog: Arc::new(CatalogService::new(
                store.clone(),
                cache,
                config.fetch_timeout(),
            )),
            inventory: Arc::new(InventoryService::new(store.clone())),
            orders: Arc::new(OrderService::new(store.clone(), carts.clone())),
            carts,
            users: Arc::new(UserService::new(store)),
        }
    }
}

/// Build the full `/api` router with CORS and request tracing
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/initial-data", get(initial_data))
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            "/api/categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/api/categories/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/api/inventory", get(list_inventory).post(upsert_inventory))
        .route(
            "/api/inventory/{product_id}",
            get(get_inventory)
                .put(update_inventory)
                .delete(delete_inventory),
        )
        .route("/api/orders", get(list_orders).post(place_order))
        .route("/api/orders/{id}/status", put(update_order_status))
        .route("/api/cart/{cart_id}", get(get_cart).delete(clear_cart))
        .route("/api/cart/{cart_id}/add", post(add_cart_item))
        .route(
            "/api/cart/{cart_id}/items/{product_id}",
            put(set_cart_item_quantity).delete(remove_cart_item),
        )
        .route("/api/users", post(create_user))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
