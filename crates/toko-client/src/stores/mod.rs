//! # Domain Stores
//!
//! One store per concern. Each owns a single entity collection plus
//! request lifecycle flags (`is_loading`, `error`), talks to the API
//! through the injected transport, and patches its local copy from server
//! responses.

pub mod admin;
pub mod audit;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod storage;
pub mod transactions;
pub mod users;

pub use admin::AdminStore;
pub use audit::AuditStore;
pub use auth::AuthStore;
pub use cart::CartStore;
pub use categories::CategoriesStore;
pub use orders::OrdersStore;
pub use products::ProductsStore;
pub use storage::StorageStore;
pub use transactions::TransactionsStore;
pub use users::UsersStore;
