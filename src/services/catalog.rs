//! Catalog service: products and categories through the read-through cache
//!
//! Collection reads go cache-first; on a miss the store is fetched under a
//! bounded timeout and the cache repopulated. When the fetch fails, the last
//! cached value is served even if expired (serve-stale-on-error); the read
//! only fails when nothing was ever cached. Every mutation, on products and
//! categories alike, invalidates the matching cache slot so the next read
//! goes live.

use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::CatalogCache;
use crate::error::ApiError;
use crate::models::{Category, CreateCategoryRequest, CreateProductRequest, InitialData, Product};
use crate::store::StoreAdapter;

/// Categories written at startup when absent; existing entries are never
/// overwritten
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("mobiles", "Mobiles"),
    ("laptops", "Laptops"),
    ("watches", "Watches"),
];

pub struct CatalogService {
    store: Arc<dyn StoreAdapter>,
    cache: Arc<CatalogCache>,
    fetch_timeout: Duration,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn StoreAdapter>,
        cache: Arc<CatalogCache>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            fetch_timeout,
        }
    }

    /// Fetch a collection snapshot under the bounded timeout
    ///
    /// `tokio::time::timeout` drops the store future when it loses the race,
    /// so a timed-out fetch can never come back later and repopulate the
    /// cache behind the caller.
    async fn fetch(&self, path: &str) -> Result<Option<Value>, ApiError> {
        match timeout(self.fetch_timeout, self.store.get(path)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ApiError::UpstreamTimeout(self.fetch_timeout)),
        }
    }

    // ---- products ----------------------------------------------------------

    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(products) = self.cache.fresh_products() {
            return Ok(products);
        }
        match self.fetch("products").await {
            Ok(snapshot) => {
                let products = products_from_snapshot(snapshot.as_ref());
                self.cache.store_products(products.clone());
                Ok(products)
            }
            Err(err) => match self.cache.stale_products() {
                Some(products) => {
                    warn!(error = %err, "serving expired product cache after fetch failure");
                    Ok(products)
                }
                None => Err(err),
            },
        }
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, ApiError> {
        let record = self
            .store
            .get(&format!("products/{id}"))
            .await?
            .ok_or_else(|| ApiError::not_found("product", id))?;
        Ok(Product::from_record(id, &record))
    }

    pub async fn create_product(&self, req: CreateProductRequest) -> Result<Product, ApiError> {
        // Legacy aliases fill in for missing canonical fields; a zero price
        // counts as missing, as it always has
        let name = non_empty(req.name).or_else(|| non_empty(req.dish_name));
        let price = req.price.filter(|p| *p != 0.0).or(req.dish_price);
        let category_id = non_empty(req.category_id);
        let (Some(name), Some(price), Some(category_id)) = (name, price, category_id) else {
            return Err(ApiError::validation("name, price and categoryId are required"));
        };

        let product_id = non_empty(req.product_id)
            .or_else(|| non_empty(req.dish_id))
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut record = Map::new();
        record.insert("name".to_string(), json!(name));
        record.insert("price".to_string(), json!(price));
        record.insert("productId".to_string(), json!(product_id));
        record.insert(
            "imageUrl".to_string(),
            json!(req.image_url.unwrap_or_default()),
        );
        if let Some(seller_id) = non_empty(req.seller_id) {
            record.insert("sellerId".to_string(), json!(seller_id));
        }
        if let Some(seller_name) = non_empty(req.seller_name) {
            record.insert("sellerName".to_string(), json!(seller_name));
        }
        record.insert("categoryId".to_string(), json!(category_id));
        if let Some(category_name) = non_empty(req.category_name) {
            record.insert("categoryName".to_string(), json!(category_name));
        }

        let record = Value::Object(record);
        let id = self.store.push("products", record.clone()).await?;
        self.cache.invalidate_products();
        debug!(%id, "product created");
        Ok(Product::from_record(id, &record))
    }

    /// Partial merge: only supplied fields overwrite
    pub async fn update_product(
        &self,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Product, ApiError> {
        let path = format!("products/{id}");
        if self.store.get(&path).await?.is_none() {
            return Err(ApiError::not_found("product", id));
        }
        self.store.update(&path, patch).await?;
        self.cache.invalidate_products();
        let record = self
            .store
            .get(&path)
            .await?
            .ok_or_else(|| ApiError::not_found("product", id))?;
        Ok(Product::from_record(id, &record))
    }

    /// Delete a product and cascade its inventory record
    ///
    /// Two plain store calls; a failure in the inventory step surfaces as
    /// `Cascade` with the product already gone.
    pub async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        self.store.remove(&format!("products/{id}")).await?;
        self.store
            .remove(&format!("inventory/{id}"))
            .await
            .map_err(|source| ApiError::Cascade {
                entity: "product",
                id: id.to_string(),
                step: "inventory",
                source,
            })?;
        self.cache.invalidate_products();
        debug!(%id, "product deleted, inventory cascaded");
        Ok(())
    }

    // ---- categories --------------------------------------------------------

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(categories) = self.cache.fresh_categories() {
            return Ok(categories);
        }
        match self.fetch("categories").await {
            Ok(snapshot) => {
                let categories = categories_from_snapshot(snapshot.as_ref());
                self.cache.store_categories(categories.clone());
                Ok(categories)
            }
            Err(err) => match self.cache.stale_categories() {
                Some(categories) => {
                    warn!(error = %err, "serving expired category cache after fetch failure");
                    Ok(categories)
                }
                None => Err(err),
            },
        }
    }

    pub async fn get_category(&self, id: &str) -> Result<Category, ApiError> {
        let record = self
            .store
            .get(&format!("categories/{id}"))
            .await?
            .ok_or_else(|| ApiError::not_found("category", id))?;
        Ok(Category::from_record(id, &record))
    }

    pub async fn create_category(&self, req: CreateCategoryRequest) -> Result<Category, ApiError> {
        let Some(name) = non_empty(req.name) else {
            return Err(ApiError::validation("name is required"));
        };
        let record = json!({
            "name": name,
            "description": req.description.unwrap_or_default(),
        });
        let id = self.store.push("categories", record.clone()).await?;
        self.cache.invalidate_categories();
        Ok(Category::from_record(id, &record))
    }

    pub async fn update_category(
        &self,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<Category, ApiError> {
        let path = format!("categories/{id}");
        if self.store.get(&path).await?.is_none() {
            return Err(ApiError::not_found("category", id));
        }
        self.store.update(&path, patch).await?;
        self.cache.invalidate_categories();
        let record = self
            .store
            .get(&path)
            .await?
            .ok_or_else(|| ApiError::not_found("category", id))?;
        Ok(Category::from_record(id, &record))
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        self.store.remove(&format!("categories/{id}")).await?;
        self.cache.invalidate_categories();
        Ok(())
    }

    /// Idempotent startup seeding of the default categories
    pub async fn seed_default_categories(&self) -> Result<(), ApiError> {
        let existing = self.store.get("categories").await?;
        let existing = existing.as_ref().and_then(Value::as_object);
        for (id, name) in DEFAULT_CATEGORIES {
            if existing.is_none_or(|map| !map.contains_key(*id)) {
                self.store
                    .set(
                        &format!("categories/{id}"),
                        json!({"name": name, "description": ""}),
                    )
                    .await?;
                debug!(category = id, "seeded default category");
            }
        }
        Ok(())
    }

    // ---- combined initial load ---------------------------------------------

    /// Serve both collections, cache-first, fetching both concurrently under
    /// one shared timeout on a miss. On failure, degrade to whatever cached
    /// values exist rather than failing the whole load.
    pub async fn initial_data(&self) -> Result<InitialData, ApiError> {
        if let (Some(products), Some(categories)) =
            (self.cache.fresh_products(), self.cache.fresh_categories())
        {
            return Ok(InitialData {
                products: Some(products),
                categories: Some(categories),
                cached: true,
                fetch_time: None,
                error: None,
            });
        }

        let started = std::time::Instant::now();
        let fetched = timeout(self.fetch_timeout, async {
            let (products, categories) = futures::future::join(
                self.store.get("products"),
                self.store.get("categories"),
            )
            .await;
            Ok::<_, ApiError>((products?, categories?))
        })
        .await
        .map_err(|_| ApiError::UpstreamTimeout(self.fetch_timeout))
        .and_then(|inner| inner);

        match fetched {
            Ok((products_snap, categories_snap)) => {
                let products = products_from_snapshot(products_snap.as_ref());
                let categories = categories_from_snapshot(categories_snap.as_ref());
                self.cache.store_products(products.clone());
                self.cache.store_categories(categories.clone());
                Ok(InitialData {
                    products: Some(products),
                    categories: Some(categories),
                    cached: false,
                    fetch_time: Some(started.elapsed().as_millis() as u64),
                    error: None,
                })
            }
            Err(err) => {
                let products = self.cache.stale_products();
                let categories = self.cache.stale_categories();
                if products.is_none() && categories.is_none() {
                    return Err(err);
                }
                warn!(error = %err, "serving partial cached initial data after fetch failure");
                Ok(InitialData {
                    products,
                    categories,
                    cached: true,
                    fetch_time: None,
                    error: Some(err.to_string()),
                })
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn products_from_snapshot(snapshot: Option<&Value>) -> Vec<Product> {
    snapshot
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(id, record)| Product::from_record(id, record))
                .collect()
        })
        .unwrap_or_default()
}

fn categories_from_snapshot(snapshot: Option<&Value>) -> Vec<Category> {
    snapshot
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(id, record)| Category::from_record(id, record))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::test_clock::ManualClock;
    use crate::store::InMemoryStore;

    fn service() -> (CatalogService, Arc<InMemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new());
        let cache = Arc::new(CatalogCache::new(Duration::from_secs(30), clock.clone()));
        let service = CatalogService::new(store.clone(), cache, Duration::from_secs(5));
        (service, store, clock)
    }

    fn product_req(name: &str, price: f64, category: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: Some(name.to_string()),
            price: Some(price),
            category_id: Some(category.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_name_price_and_category() {
        let (service, _, _) = service();

        let missing_category = CreateProductRequest {
            name: Some("Phone".to_string()),
            price: Some(10.0),
            ..Default::default()
        };
        let err = service.create_product(missing_category).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = service
            .create_product(CreateProductRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_accepts_legacy_aliases() {
        let (service, _, _) = service();
        let req = CreateProductRequest {
            dish_name: Some("Old Phone".to_string()),
            dish_price: Some(42.0),
            category_id: Some("mobiles".to_string()),
            ..Default::default()
        };
        let product = service.create_product(req).await.unwrap();
        assert_eq!(product.name, "Old Phone");
        assert_eq!(product.price, 42.0);
        assert!(!product.id.is_empty());
        assert!(!product.product_id.is_empty());
    }

    #[tokio::test]
    async fn test_reads_within_ttl_hit_cache_not_store() {
        let (service, store, _) = service();
        service
            .create_product(product_req("Phone", 10.0, "mobiles"))
            .await
            .unwrap();

        let first = service.list_products().await.unwrap();
        let reads_after_first = store.read_count();

        let second = service.list_products().await.unwrap();
        assert_eq!(store.read_count(), reads_after_first);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_expired_cache_with_store_failure_serves_stale() {
        let (service, store, clock) = service();
        service
            .create_product(product_req("Phone", 10.0, "mobiles"))
            .await
            .unwrap();
        let warm = service.list_products().await.unwrap();
        assert_eq!(warm.len(), 1);

        clock.advance(Duration::from_secs(31));
        store.set_offline(true);

        let stale = service.list_products().await.unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].name, "Phone");
    }

    #[tokio::test]
    async fn test_store_failure_with_empty_cache_fails() {
        let (service, store, _) = service();
        store.set_offline(true);
        let err = service.list_products().await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_mutation_invalidates_product_cache() {
        let (service, store, _) = service();
        let created = service
            .create_product(product_req("Phone", 10.0, "mobiles"))
            .await
            .unwrap();
        let _ = service.list_products().await.unwrap();

        let mut patch = Map::new();
        patch.insert("price".to_string(), json!(12.0));
        service.update_product(&created.id, patch).await.unwrap();

        let reads_before = store.read_count();
        let listed = service.list_products().await.unwrap();
        assert!(store.read_count() > reads_before, "read must go live");
        assert_eq!(listed[0].price, 12.0);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let (service, _, _) = service();
        let err = service
            .update_product("missing", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_cascades_inventory() {
        let (service, store, _) = service();
        let created = service
            .create_product(product_req("Phone", 10.0, "mobiles"))
            .await
            .unwrap();
        store
            .set(&format!("inventory/{}", created.id), json!({"stock": 5}))
            .await
            .unwrap();

        service.delete_product(&created.id).await.unwrap();

        assert!(
            store
                .get(&format!("products/{}", created.id))
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            store
                .get(&format!("inventory/{}", created.id))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_category_seed_is_idempotent() {
        let (service, store, _) = service();
        service.seed_default_categories().await.unwrap();

        // Rename one default, then seed again: it must not be overwritten
        let mut patch = Map::new();
        patch.insert("name".to_string(), json!("Phones & Tablets"));
        store.update("categories/mobiles", patch).await.unwrap();

        service.seed_default_categories().await.unwrap();

        let categories = service.list_categories().await.unwrap();
        assert_eq!(categories.len(), 3);
        let mobiles = categories.iter().find(|c| c.id == "mobiles").unwrap();
        assert_eq!(mobiles.name, "Phones & Tablets");
    }

    #[tokio::test]
    async fn test_category_update_invalidates_cache() {
        // Regression: the original only invalidated categories on create,
        // so a rename could serve stale for a full TTL
        let (service, _, _) = service();
        service.seed_default_categories().await.unwrap();
        let _ = service.list_categories().await.unwrap();

        let mut patch = Map::new();
        patch.insert("name".to_string(), json!("Wearables"));
        service.update_category("watches", patch).await.unwrap();

        let categories = service.list_categories().await.unwrap();
        let watches = categories.iter().find(|c| c.id == "watches").unwrap();
        assert_eq!(watches.name, "Wearables");
    }

    #[tokio::test]
    async fn test_category_delete_invalidates_cache() {
        let (service, _, _) = service();
        service.seed_default_categories().await.unwrap();
        let _ = service.list_categories().await.unwrap();

        service.delete_category("watches").await.unwrap();

        let categories = service.list_categories().await.unwrap();
        assert_eq!(categories.len(), 2);
        assert!(categories.iter().all(|c| c.id != "watches"));
    }

    #[tokio::test]
    async fn test_initial_data_cold_then_cached() {
        let (service, _, _) = service();
        service.seed_default_categories().await.unwrap();
        service
            .create_product(product_req("Phone", 10.0, "mobiles"))
            .await
            .unwrap();

        let cold = service.initial_data().await.unwrap();
        assert!(!cold.cached);
        assert!(cold.fetch_time.is_some());
        assert_eq!(cold.products.as_ref().unwrap().len(), 1);
        assert_eq!(cold.categories.as_ref().unwrap().len(), 3);

        let warm = service.initial_data().await.unwrap();
        assert!(warm.cached);
        assert!(warm.error.is_none());
    }

    #[tokio::test]
    async fn test_initial_data_degrades_to_cached_on_failure() {
        let (service, store, clock) = service();
        service.seed_default_categories().await.unwrap();
        let _ = service.initial_data().await.unwrap();

        clock.advance(Duration::from_secs(31));
        store.set_offline(true);

        let degraded = service.initial_data().await.unwrap();
        assert!(degraded.cached);
        assert!(degraded.error.is_some());
        assert_eq!(degraded.categories.as_ref().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_initial_data_fails_with_nothing_cached() {
        let (service, store, _) = service();
        store.set_offline(true);
        assert!(service.initial_data().await.is_err());
    }
}
