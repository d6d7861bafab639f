//! Service layer: the business operations behind the HTTP surface

pub mod cart;
pub mod catalog;
pub mod inventory;
pub mod orders;
pub mod users;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use inventory::InventoryService;
pub use orders::OrderService;
pub use users::UserService;
