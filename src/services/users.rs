//! User registration pass-through
//!
//! Identity itself lives with the external provider; this service only
//! records the registration payload. Beyond the two required fields the body
//! is stored as-is.

use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::error::ApiError;
use crate::store::StoreAdapter;

pub struct UserService {
    store: Arc<dyn StoreAdapter>,
}

impl UserService {
    pub fn new(store: Arc<dyn StoreAdapter>) -> Self {
        Self { store }
    }

    pub async fn create_user(&self, mut body: Map<String, Value>) -> Result<Value, ApiError> {
        let present = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty())
        };
        if !present("userName") || !present("email") {
            return Err(ApiError::validation("userName and email are required"));
        }

        let id = self
            .store
            .push("users", Value::Object(body.clone()))
            .await?;
        body.insert("id".to_string(), json!(id));
        Ok(Value::Object(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_user_requires_user_name_and_email() {
        let service = service();

        let body = json!({"userName": "ada"});
        let err = service
            .create_user(body.as_object().unwrap().clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_user_keeps_extra_fields_and_assigns_id() {
        let service = service();

        let body = json!({"userName": "ada", "email": "ada@example.com", "role": "seller"});
        let user = service
            .create_user(body.as_object().unwrap().clone())
            .await
            .unwrap();

        assert!(user["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert_eq!(user["role"], "seller");
        assert_eq!(user["email"], "ada@example.com");
    }
}
