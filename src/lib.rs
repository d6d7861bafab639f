//! # Storefront API
//!
//! A small e-commerce backend: product/category catalog, per-product
//! inventory, cart aggregation and cart-to-order conversion, served over a
//! JSON HTTP API and backed by an external hierarchical key-value store.
//!
//! The structurally interesting part is the read path: collection reads go
//! through a TTL cache that refetches on expiry and degrades to the last
//! known value when the backend is unreachable (serve-stale-on-error), while
//! every catalog mutation invalidates the matching cache slot.
//!
//! ## Architecture
//!
//! - [`store::StoreAdapter`]: the seam to the external store; the crate
//!   ships [`store::InMemoryStore`] as the default backend
//! - [`cache::CatalogCache`]: TTL slots for the catalog collections, with an
//!   injected clock for deterministic tests
//! - [`services`]: catalog, inventory, cart aggregation, order conversion,
//!   user registration
//! - [`http`]: axum router and handlers for the `/api` surface

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{ApiError, ErrorResponse};
pub use http::{AppState, router};
