//! Cart aggregation: per-cart line items and priced totals
//!
//! Lines live at `carts/{cartId}/items/{productId}`. Prices are snapshotted
//! onto the line when the item is added, not re-read from the catalog.
//! There is no per-cart locking: two concurrent `add_item` calls on the same
//! line are a read-modify-write race and can lose an increment.

use serde_json::{Map, json};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{AddCartItemRequest, CartLine, CartView, SetQuantityRequest, round2};
use crate::store::StoreAdapter;

pub(crate) fn items_path(cart_id: &str) -> String {
    format!("carts/{cart_id}/items")
}

pub struct CartService {
    store: Arc<dyn StoreAdapter>,
}

impl CartService {
    pub fn new(store: Arc<dyn StoreAdapter>) -> Self {
        Self { store }
    }

    /// Cart lines plus the aggregated total
    ///
    /// A missing cart is an empty cart, not an error.
    pub async fn get_cart(&self, cart_id: &str) -> Result<CartView, ApiError> {
        let snapshot = self.store.get(&items_path(cart_id)).await?;
        let items: Vec<CartLine> = snapshot
            .as_ref()
            .and_then(|v| v.as_object())
            .map(|map| {
                map.iter()
                    .map(|(product_id, record)| CartLine::from_record(product_id, record))
                    .collect()
            })
            .unwrap_or_default();
        let total = round2(
            items
                .iter()
                .map(|line| line.price * line.quantity as f64)
                .sum(),
        );
        Ok(CartView { items, total })
    }

    /// Upsert a line, incrementing quantity; price is last-write-wins
    pub async fn add_item(
        &self,
        cart_id: &str,
        req: AddCartItemRequest,
    ) -> Result<CartLine, ApiError> {
        let (Some(product_id), Some(name)) = (
            req.product_id.filter(|s| !s.is_empty()),
            req.name.filter(|s| !s.is_empty()),
        ) else {
            return Err(ApiError::validation("productId and name are required"));
        };

        let line_path = format!("{}/{}", items_path(cart_id), product_id);
        let existing_quantity = self
            .store
            .get(&line_path)
            .await?
            .as_ref()
            .and_then(|v| v.get("quantity"))
            .and_then(serde_json::Value::as_i64)
            .unwrap_or(0);

        let line = CartLine {
            product_id,
            name,
            price: req.price.unwrap_or(0.0),
            quantity: existing_quantity + req.quantity.filter(|q| *q != 0).unwrap_or(1),
            image_url: req.image_url.filter(|s| !s.is_empty()),
            category_name: req.category_name.filter(|s| !s.is_empty()),
        };
        self.store
            .set(&line_path, serde_json::to_value(&line)?)
            .await?;
        Ok(line)
    }

    /// Absolute-set a line's quantity
    ///
    /// A resulting quantity of zero (or below) leaves the line in place with
    /// that quantity; lines are only dropped by an explicit remove.
    pub async fn set_item_quantity(
        &self,
        cart_id: &str,
        product_id: &str,
        req: SetQuantityRequest,
    ) -> Result<CartLine, ApiError> {
        let Some(quantity) = req.quantity else {
            return Err(ApiError::validation("quantity is required"));
        };

        let line_path = format!("{}/{}", items_path(cart_id), product_id);
        if self.store.get(&line_path).await?.is_none() {
            return Err(ApiError::not_found("cart item", product_id));
        }

        let mut patch = Map::new();
        patch.insert("quantity".to_string(), json!(quantity));
        self.store.update(&line_path, patch).await?;

        let record = self
            .store
            .get(&line_path)
            .await?
            .ok_or_else(|| ApiError::not_found("cart item", product_id))?;
        Ok(CartLine::from_record(product_id, &record))
    }

    /// Idempotent line removal
    pub async fn remove_item(&self, cart_id: &str, product_id: &str) -> Result<(), ApiError> {
        self.store
            .remove(&format!("{}/{}", items_path(cart_id), product_id))
            .await?;
        Ok(())
    }

    /// Remove every line in the cart
    pub async fn clear_cart(&self, cart_id: &str) -> Result<(), ApiError> {
        self.store.remove(&items_path(cart_id)).await?;
        Ok(())
    }
}
