//! # Checkout Flow
//!
//! Turns a validated cart into a persisted transaction, then resets cart
//! state. A linear script with short-circuit failure points, not a state
//! machine.
//!
//! ## Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  1. cart empty?          ──► reject (EmptyCart)                 │
//! │  2. validate_stock()     ──► reject when any line is short      │
//! │  3. POST /transactions   ──► reject on failure, cart untouched  │
//! │  4. clear cart + reset stock flag + navigate to confirmation    │
//! │                                                                 │
//! │  Ordering invariants:                                           │
//! │  - stock validation completes and passes BEFORE submission      │
//! │  - the cart is cleared ONLY AFTER submission succeeds           │
//! │                                                                 │
//! │  Failures in steps 1-3 are all pre-commit, so no compensation   │
//! │  is needed; one error message is surfaced and that is all.      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use toko_api::ApiError;
use toko_core::Transaction;

use crate::notify::Notifier;
use crate::stores::cart::CartStore;
use crate::stores::orders::OrdersStore;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Some items in your cart are no longer available")]
    StockShort,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Orchestrates the order-creation flow across the cart and orders
/// stores. Stateless itself; everything lives in the stores.
pub struct Checkout {
    cart: Arc<CartStore>,
    orders: Arc<OrdersStore>,
    notifier: Notifier,
}

impl Checkout {
    pub fn new(cart: Arc<CartStore>, orders: Arc<OrdersStore>, notifier: Notifier) -> Self {
        Checkout {
            cart,
            orders,
            notifier,
        }
    }

    /// Places an order from the current cart.
    ///
    /// On success the cart is cleared (server + local), the stock-issue
    /// flag is reset, and a navigation event to the confirmation view is
    /// emitted. On any failure a single error toast is emitted and the
    /// cart is left exactly as it was.
    pub async fn place_order(&self, notes: Option<String>) -> Result<Transaction, CheckoutError> {
        if self.cart.is_empty().await {
            self.notifier.error("Your cart is empty");
            return Err(CheckoutError::EmptyCart);
        }

        self.cart.validate_stock().await.map_err(|e| {
            self.notifier.error(e.to_string());
            CheckoutError::Api(e)
        })?;

        if self.cart.has_stock_issues().await {
            self.notifier
                .error("Some items in your cart are no longer available");
            return Err(CheckoutError::StockShort);
        }

        let order = self.orders.create_order(notes).await.map_err(|e| {
            self.notifier.error(e.to_string());
            CheckoutError::Api(e)
        })?;

        // The order exists from here on; cart cleanup is best-effort and
        // must never turn a placed order into a reported failure.
        if let Err(e) = self.cart.clear_cart().await {
            warn!(order_id = order.id, "cart clear after order failed: {}", e);
        }
        self.cart.reset_stock_validation().await;

        info!(order_id = order.id, "Checkout complete");
        self.notifier.success("Order created successfully!");
        self.notifier.navigate(format!("/orders/{}", order.id));

        Ok(order)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
