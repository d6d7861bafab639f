//! Inventory: stock-per-product CRUD
//!
//! Always reads live; inventory is never cached. Records share their key
//! with the owning product, which is what makes the catalog's cascade delete
//! a single extra `remove`.

use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{InventoryRecord, UpsertInventoryRequest, coerce_stock};
use crate::store::StoreAdapter;

pub struct InventoryService {
    store: Arc<dyn StoreAdapter>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn StoreAdapter>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<InventoryRecord>, ApiError> {
        let snapshot = self.store.get("inventory").await?;
        Ok(snapshot
            .as_ref()
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .map(|(product_id, record)| InventoryRecord::from_record(product_id, record))
                    .collect()
            })
            .unwrap_or_default())
    }

    pub async fn get(&self, product_id: &str) -> Result<InventoryRecord, ApiError> {
        let record = self
            .store
            .get(&format!("inventory/{product_id}"))
            .await?
            .ok_or_else(|| ApiError::not_found("inventory record", product_id))?;
        Ok(InventoryRecord::from_record(product_id, &record))
    }

    /// Full overwrite keyed by product id; stock is coerced to a
    /// non-negative integer and defaults to zero
    pub async fn upsert(&self, req: UpsertInventoryRequest) -> Result<InventoryRecord, ApiError> {
        let Some(product_id) = req.product_id.filter(|s| !s.is_empty()) else {
            return Err(ApiError::validation("productId is required"));
        };

        let stock = coerce_stock(req.stock.as_ref());
        let mut record = Map::new();
        record.insert("stock".to_string(), json!(stock));
        if let Some(seller_id) = req.seller_id.filter(|s| !s.is_empty()) {
            record.insert("sellerId".to_string(), json!(seller_id));
        }
        let record = Value::Object(record);
        self.store
            .set(&format!("inventory/{product_id}"), record.clone())
            .await?;
        Ok(InventoryRecord::from_record(product_id, &record))
    }

    pub async fn update(
        &self,
        product_id: &str,
        patch: Map<String, Value>,
    ) -> Result<InventoryRecord, ApiError> {
        let path = format!("inventory/{product_id}");
        if self.store.get(&path).await?.is_none() {
            return Err(ApiError::not_found("inventory record", product_id));
        }
        self.store.update(&path, patch).await?;
        let record = self
            .store
            .get(&path)
            .await?
            .ok_or_else(|| ApiError::not_found("inventory record", product_id))?;
        Ok(InventoryRecord::from_record(product_id, &record))
    }

    pub async fn delete(&self, product_id: &str) -> Result<(), ApiError> {
        self.store
            .remove(&format!("inventory/{product_id}"))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn service() -> InventoryService {
        InventoryService::new(Arc::new(InMemoryStore::new()))
    }

    fn upsert_req(product_id: &str, stock: Value) -> UpsertInventoryRequest {
        UpsertInventoryRequest {
            product_id: Some(product_id.to_string()),
            stock: Some(stock),
            seller_id: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_requires_product_id() {
        let service = service();
        let err = service
            .upsert(UpsertInventoryRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upsert_coerces_stock() {
        let service = service();

        let record = service.upsert(upsert_req("p1", json!("15"))).await.unwrap();
        assert_eq!(record.stock, 15);

        let record = service.upsert(upsert_req("p1", json!(-4))).await.unwrap();
        assert_eq!(record.stock, 0);

        let record = service
            .upsert(UpsertInventoryRequest {
                product_id: Some("p2".to_string()),
                stock: None,
                seller_id: None,
            })
            .await
            .unwrap();
        assert_eq!(record.stock, 0);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_whole_record() {
        let service = service();
        service
            .upsert(UpsertInventoryRequest {
                product_id: Some("p1".to_string()),
                stock: Some(json!(5)),
                seller_id: Some("s1".to_string()),
            })
            .await
            .unwrap();

        // Re-upsert without a seller: the seller is gone, not merged
        let record = service.upsert(upsert_req("p1", json!(8))).await.unwrap();
        assert_eq!(record.stock, 8);
        assert!(record.seller_id.is_none());

        let fetched = service.get("p1").await.unwrap();
        assert!(fetched.seller_id.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let service = service();
        let err = service.get("missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_merges_and_checks_existence() {
        let service = service();
        service
            .upsert(UpsertInventoryRequest {
                product_id: Some("p1".to_string()),
                stock: Some(json!(5)),
                seller_id: Some("s1".to_string()),
            })
            .await
            .unwrap();

        let mut patch = Map::new();
        patch.insert("stock".to_string(), json!(9));
        let record = service.update("p1", patch).await.unwrap();
        assert_eq!(record.stock, 9);
        assert_eq!(record.seller_id.as_deref(), Some("s1"));

        let err = service.update("missing", Map::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let service = service();
        service.upsert(upsert_req("p1", json!(5))).await.unwrap();

        service.delete("p1").await.unwrap();
        service.delete("p1").await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }
}
