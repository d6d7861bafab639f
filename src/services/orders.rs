//! Order conversion: snapshot a cart into an immutable order
//!
//! Placing an order reads the cart, persists the snapshot, then clears the
//! cart. Those are separate store calls with no transaction around them; a
//! concurrent `add_item` landing between the snapshot and the clear is lost.
//! The adapter contract offers no conditional write, so the race is accepted
//! and documented rather than hidden.

use chrono::Utc;
use serde_json::{Map, json};
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{Order, PlaceOrderRequest, UpdateStatusRequest};
use crate::services::cart::CartService;
use crate::store::StoreAdapter;

pub struct OrderService {
    store: Arc<dyn StoreAdapter>,
    carts: Arc<CartService>,
}

impl OrderService {
    pub fn new(store: Arc<dyn StoreAdapter>, carts: Arc<CartService>) -> Self {
        Self { store, carts }
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let snapshot = self.store.get("orders").await?;
        snapshot
            .as_ref()
            .and_then(|v| v.as_object())
            .map(|map| {
                map.iter()
                    .map(|(id, record)| Order::from_record(id, record).map_err(ApiError::from))
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    /// Convert a cart into an order: snapshot lines, compute the total,
    /// persist with status `pending`, then clear the source cart
    pub async fn place_order(&self, req: PlaceOrderRequest) -> Result<Order, ApiError> {
        let (Some(cart_id), Some(customer_name), Some(table)) = (
            req.cart_id.filter(|s| !s.is_empty()),
            req.customer_name.filter(|s| !s.is_empty()),
            req.table.filter(|s| !s.is_empty()),
        ) else {
            return Err(ApiError::validation(
                "cartId, customerName and table are required",
            ));
        };

        let cart = self.carts.get_cart(&cart_id).await?;
        if cart.items.is_empty() {
            return Err(ApiError::EmptyCart);
        }

        let mut order = Order {
            id: String::new(),
            customer_name,
            table,
            restaurant_id: req.restaurant_id.unwrap_or_else(|| "default".to_string()),
            items: cart.items,
            total: cart.total,
            status: "pending".to_string(),
            created_at: Utc::now().timestamp_millis(),
        };

        let id = self.store.push("orders", serde_json::to_value(&order)?).await?;
        self.carts.clear_cart(&cart_id).await?;
        debug!(order = %id, cart = %cart_id, total = order.total, "order placed, cart cleared");

        order.id = id;
        Ok(order)
    }

    /// Merge a new status into a stored order; any string is accepted
    pub async fn update_status(
        &self,
        order_id: &str,
        req: UpdateStatusRequest,
    ) -> Result<Order, ApiError> {
        let Some(status) = req.status.filter(|s| !s.is_empty()) else {
            return Err(ApiError::validation("status is required"));
        };

        let path = format!("orders/{order_id}");
        if self.store.get(&path).await?.is_none() {
            return Err(ApiError::not_found("order", order_id));
        }

        let mut patch = Map::new();
        patch.insert("status".to_string(), json!(status));
        self.store.update(&path, patch).await?;

        let record = self
            .store
            .get(&path)
            .await?
            .ok_or_else(|| ApiError::not_found("order", order_id))?;
        Ok(Order::from_record(order_id, &record)?)
    }
}
