//! HTTP handlers for the storefront API
//!
//! Thin adapters between axum extractors and the service layer; all error
//! rendering goes through `ApiError`'s `IntoResponse`.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::{Map, Value};

use super::AppState;
use crate::error::ApiError;
use crate::models::{
    AddCartItemRequest, CartLine, CartView, Category, CreateCategoryRequest, CreateProductRequest,
    InitialData, InventoryRecord, Order, PlaceOrderRequest, Product, SetQuantityRequest,
    UpdateStatusRequest, UpsertInventoryRequest,
};

/// Body for delete/clear acknowledgements
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    fn deleted() -> Json<Self> {
        Json(Self { message: "Deleted" })
    }

    fn cleared() -> Json<Self> {
        Json(Self { message: "Cleared" })
    }
}

// ---- initial data ----------------------------------------------------------

pub async fn initial_data(State(state): State<AppState>) -> Result<Json<InitialData>, ApiError> {
    Ok(Json(state.catalog.initial_data().await?))
}

// ---- products --------------------------------------------------------------

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.catalog.list_products().await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.get_product(&id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.catalog.create_product(req).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.catalog.update_product(&id, patch).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog.delete_product(&id).await?;
    Ok(MessageResponse::deleted())
}

// ---- categories ------------------------------------------------------------

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.catalog.list_categories().await?))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.catalog.get_category(&id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.catalog.create_category(req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.catalog.update_category(&id, patch).await?))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog.delete_category(&id).await?;
    Ok(MessageResponse::deleted())
}

// ---- inventory -------------------------------------------------------------

pub async fn list_inventory(
    State(state): State<AppState>,
) -> Result<Json<Vec<InventoryRecord>>, ApiError> {
    Ok(Json(state.inventory.list().await?))
}

pub async fn get_inventory(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<InventoryRecord>, ApiError> {
    Ok(Json(state.inventory.get(&product_id).await?))
}

pub async fn upsert_inventory(
    State(state): State<AppState>,
    Json(req): Json<UpsertInventoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.inventory.upsert(req).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_inventory(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<Json<InventoryRecord>, ApiError> {
    Ok(Json(state.inventory.update(&product_id, patch).await?))
}

pub async fn delete_inventory(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.inventory.delete(&product_id).await?;
    Ok(MessageResponse::deleted())
}

// ---- orders ----------------------------------------------------------------

pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.list_orders().await?))
}

pub async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.orders.place_order(req).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.orders.update_status(&id, req).await?))
}

// ---- cart ------------------------------------------------------------------

pub async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Result<Json<CartView>, ApiError> {
    Ok(Json(state.carts.get_cart(&cart_id).await?))
}

pub async fn add_cart_item(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
    Json(req): Json<AddCartItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let line = state.carts.add_item(&cart_id, req).await?;
    Ok((StatusCode::CREATED, Json(line)))
}

pub async fn set_cart_item_quantity(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(String, String)>,
    Json(req): Json<SetQuantityRequest>,
) -> Result<Json<CartLine>, ApiError> {
    Ok(Json(
        state
            .carts
            .set_item_quantity(&cart_id, &product_id, req)
            .await?,
    ))
}

pub async fn remove_cart_item(
    State(state): State<AppState>,
    Path((cart_id, product_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.carts.remove_item(&cart_id, &product_id).await?;
    Ok(MessageResponse::deleted())
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.carts.clear_cart(&cart_id).await?;
    Ok(MessageResponse::cleared())
}

// ---- users -----------------------------------------------------------------

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.create_user(body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
