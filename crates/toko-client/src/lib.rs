//! # toko-client: State Management for the Toko Storefront
//!
//! The browser-facing half of the Toko e-commerce platform, as a typed
//! Rust SDK: every piece of business logic of consequence (pricing, stock
//! authority, persistence, access-control enforcement) lives in the
//! remote API; this crate is the reactive state layer in front of it.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Toko (client container, one per app)                           │
//! │                                                                 │
//! │  stores/   auth  cart  orders  products  categories  users      │
//! │            transactions  audit  storage  admin                  │
//! │                                                                 │
//! │  checkout  validate-stock → submit → clear-cart orchestration   │
//! │  guards    role allowlists per admin route                      │
//! │  notify    broadcast channel the UI subscribes to               │
//! │  session   (user, token) persistence between runs               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use toko_api::ClientConfig;
//! use toko_client::Toko;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::load_or_default(None);
//! let toko = Toko::new(&config)?;
//! toko.initialize().await;
//!
//! toko.cart.add_to_cart(7, 1).await?;
//! let order = toko.checkout.place_order(None).await?;
//! println!("order {} placed", order.id);
//! # Ok(())
//! # }
//! ```

pub mod checkout;
pub mod client;
pub mod guards;
pub mod notify;
pub mod session;
pub mod stores;

#[cfg(test)]
pub(crate) mod testing;

pub use checkout::{Checkout, CheckoutError};
pub use client::Toko;
pub use guards::{Access, Guard};
pub use notify::{Level, Notification, Notifier, UiEvent};
pub use session::{Session, SessionCache, SessionError};
pub use stores::*;
