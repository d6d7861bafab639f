//! Wire and data model for the storefront API
//!
//! Stored product records are heterogeneous: older rows carry the legacy
//! `dish_Name` / `dish_Price` / `dish_Id` keys. The model normalizes every
//! record into one canonical output shape and mirrors the legacy keys on
//! output when the record still carries them, so clients mid-transition keep
//! working.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A catalog product in its canonical output shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub product_id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    // Legacy keys, mirrored only when present in the stored record
    #[serde(rename = "dish_Name", skip_serializing_if = "Option::is_none")]
    pub dish_name: Option<String>,
    #[serde(rename = "dish_Price", skip_serializing_if = "Option::is_none")]
    pub dish_price: Option<f64>,
    #[serde(rename = "dish_Id", skip_serializing_if = "Option::is_none")]
    pub dish_id: Option<String>,
}

impl Product {
    /// Normalize a stored record into the canonical shape
    ///
    /// Canonical keys win; legacy keys are the fallback; the record id is
    /// the fallback for `productId`.
    pub fn from_record(id: impl Into<String>, record: &Value) -> Self {
        let id = id.into();
        let str_field = |key: &str| {
            record
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let name = str_field("name")
            .or_else(|| str_field("dish_Name"))
            .unwrap_or_default();
        let price = record
            .get("price")
            .and_then(Value::as_f64)
            .or_else(|| record.get("dish_Price").and_then(Value::as_f64))
            .unwrap_or(0.0);
        let product_id = str_field("productId")
            .or_else(|| str_field("dish_Id"))
            .unwrap_or_else(|| id.clone());

        Self {
            name,
            price,
            product_id,
            image_url: str_field("imageUrl").unwrap_or_default(),
            seller_id: str_field("sellerId"),
            seller_name: str_field("sellerName"),
            category_id: str_field("categoryId"),
            category_name: str_field("categoryName"),
            dish_name: str_field("dish_Name"),
            dish_price: record.get("dish_Price").and_then(Value::as_f64),
            dish_id: str_field("dish_Id"),
            id,
        }
    }
}

/// Create-product input; required fields may arrive under legacy aliases
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub product_id: Option<String>,
    pub image_url: Option<String>,
    pub seller_id: Option<String>,
    pub seller_name: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    #[serde(rename = "dish_Name")]
    pub dish_name: Option<String>,
    #[serde(rename = "dish_Price")]
    pub dish_price: Option<f64>,
    #[serde(rename = "dish_Id")]
    pub dish_id: Option<String>,
}

/// A product category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Category {
    pub fn from_record(id: impl Into<String>, record: &Value) -> Self {
        Self {
            id: id.into(),
            name: record
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            description: record
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Stock record, keyed by product id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub product_id: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
}

impl InventoryRecord {
    pub fn from_record(product_id: impl Into<String>, record: &Value) -> Self {
        Self {
            product_id: product_id.into(),
            stock: coerce_stock(record.get("stock")),
            seller_id: record
                .get("sellerId")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// Upsert-inventory input; `stock` accepts numbers or numeric strings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertInventoryRequest {
    pub product_id: Option<String>,
    pub stock: Option<Value>,
    pub seller_id: Option<String>,
}

/// Coerce a loosely typed stock value into a non-negative integer
pub fn coerce_stock(value: Option<&Value>) -> i64 {
    let n = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(|f| f as i64).unwrap_or(0),
        _ => 0,
    };
    n.max(0)
}

/// One product's quantity and snapshotted price within a cart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

impl CartLine {
    pub fn from_record(product_id: impl Into<String>, record: &Value) -> Self {
        let product_id = product_id.into();
        Self {
            product_id: record
                .get("productId")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(product_id),
            name: record
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            price: record.get("price").and_then(Value::as_f64).unwrap_or(0.0),
            quantity: record
                .get("quantity")
                .and_then(Value::as_i64)
                .or_else(|| record.get("quantity").and_then(Value::as_f64).map(|f| f as i64))
                .unwrap_or(0),
            image_url: record
                .get("imageUrl")
                .and_then(Value::as_str)
                .map(str::to_string),
            category_name: record
                .get("categoryName")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// Add-to-cart input
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub image_url: Option<String>,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: Option<i64>,
}

/// A cart with its aggregated total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total: f64,
}

/// An order, immutable once created except for its status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub customer_name: String,
    pub table: String,
    pub restaurant_id: String,
    pub items: Vec<CartLine>,
    pub total: f64,
    pub status: String,
    pub created_at: i64,
}

impl Order {
    pub fn from_record(id: impl Into<String>, record: &Value) -> Result<Self, serde_json::Error> {
        let mut order: Order = serde_json::from_value(record.clone())?;
        order.id = id.into();
        Ok(order)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub cart_id: Option<String>,
    pub customer_name: Option<String>,
    pub table: Option<String>,
    pub restaurant_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// Combined payload for the initial catalog load
///
/// The degraded path (store unreachable, cache still warm) carries whatever
/// collections were cached plus an `error` describing the failure.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Round a monetary amount to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_normalizes_legacy_keys() {
        let record = json!({
            "dish_Name": "Old Phone",
            "dish_Price": 99.5,
            "dish_Id": "legacy-1"
        });
        let product = Product::from_record("k1", &record);

        assert_eq!(product.name, "Old Phone");
        assert_eq!(product.price, 99.5);
        assert_eq!(product.product_id, "legacy-1");

        // Legacy keys are mirrored on output
        let wire = serde_json::to_value(&product).unwrap();
        assert_eq!(wire["dish_Name"], "Old Phone");
        assert_eq!(wire["dish_Price"], 99.5);
        assert_eq!(wire["name"], "Old Phone");
    }

    #[test]
    fn test_product_canonical_keys_win_over_legacy() {
        let record = json!({
            "name": "New Phone",
            "price": 10.0,
            "dish_Name": "Old Phone",
            "dish_Price": 99.5
        });
        let product = Product::from_record("k1", &record);
        assert_eq!(product.name, "New Phone");
        assert_eq!(product.price, 10.0);
    }

    #[test]
    fn test_product_falls_back_to_record_id() {
        let product = Product::from_record("k1", &json!({"name": "X", "price": 1.0}));
        assert_eq!(product.product_id, "k1");

        // Legacy keys absent from the record stay off the wire
        let wire = serde_json::to_value(&product).unwrap();
        assert!(wire.get("dish_Name").is_none());
        assert!(wire.get("sellerId").is_none());
    }

    #[test]
    fn test_create_product_request_accepts_aliases() {
        let req: CreateProductRequest = serde_json::from_value(json!({
            "dish_Name": "Old Phone",
            "dish_Price": 3.5,
            "categoryId": "mobiles"
        }))
        .unwrap();
        assert_eq!(req.dish_name.as_deref(), Some("Old Phone"));
        assert_eq!(req.dish_price, Some(3.5));
        assert!(req.name.is_none());
    }

    #[test]
    fn test_coerce_stock() {
        assert_eq!(coerce_stock(Some(&json!(7))), 7);
        assert_eq!(coerce_stock(Some(&json!(7.9))), 7);
        assert_eq!(coerce_stock(Some(&json!("12"))), 12);
        assert_eq!(coerce_stock(Some(&json!("garbage"))), 0);
        assert_eq!(coerce_stock(Some(&json!(-3))), 0);
        assert_eq!(coerce_stock(None), 0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(25.0), 25.0);
        assert_eq!(round2(0.1 + 0.2), 0.3);
        assert_eq!(round2(19.999), 20.0);
    }

    #[test]
    fn test_order_record_roundtrip() {
        let order = Order {
            id: String::new(),
            customer_name: "Ada".to_string(),
            table: "7".to_string(),
            restaurant_id: "default".to_string(),
            items: vec![],
            total: 25.0,
            status: "pending".to_string(),
            created_at: 1_700_000_000_000,
        };
        let record = serde_json::to_value(&order).unwrap();
        // An empty id never hits the store
        assert!(record.get("id").is_none());

        let restored = Order::from_record("o1", &record).unwrap();
        assert_eq!(restored.id, "o1");
        assert_eq!(restored.customer_name, "Ada");
        assert_eq!(restored.status, "pending");
    }
}
