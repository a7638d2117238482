//! # toko-core: Pure Domain Types for the Toko Client
//!
//! This crate is the foundation of the Toko client SDK. It contains the
//! domain model as plain data types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Toko Client SDK                             │
//! │                                                                 │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                 toko-client (Stores)                      │  │
//! │  │   auth, cart, orders, products, admin back-office         │  │
//! │  └────────────────────────────┬──────────────────────────────┘  │
//! │                               │                                 │
//! │  ┌────────────────────────────▼──────────────────────────────┐  │
//! │  │                 toko-api (Transport)                      │  │
//! │  │   HTTP client, error taxonomy, envelopes, retry           │  │
//! │  └────────────────────────────┬──────────────────────────────┘  │
//! │                               │                                 │
//! │  ┌────────────────────────────▼──────────────────────────────┐  │
//! │  │            ★ toko-core (THIS CRATE) ★                     │  │
//! │  │                                                           │  │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌────────────┐   │  │
//! │  │   │  types   │ │  money   │ │ filters  │ │ validation │   │  │
//! │  │   │ User     │ │ Money    │ │ queries  │ │ form rules │   │  │
//! │  │   │ CartItem │ │ (IDR)    │ │          │ │            │   │  │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └────────────┘   │  │
//! │  │                                                           │  │
//! │  │   NO I/O • NO NETWORK • PURE DATA AND FUNCTIONS           │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (User, Product, CartItem, Transaction, ...)
//! - [`money`] - Integer rupiah amounts with IDR display formatting
//! - [`filters`] - List filters and their query-string encoding
//! - [`validation`] - Form validation rules
//! - [`error`] - Domain error types

pub mod error;
pub mod filters;
pub mod money;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

/// Maximum quantity of a single cart line.
///
/// Mirrors the server-side limit so obviously bad input fails before a
/// round trip. The server remains authoritative.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Default page size used when a filter does not specify one.
pub const DEFAULT_PER_PAGE: u32 = 10;
