//! # Cart Store
//!
//! Client-side cache of the authenticated user's cart, synchronized with
//! the server on every mutation.
//!
//! ## Mutation Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Every mutation is a two-path contract:                         │
//! │                                                                 │
//! │  success ──► patch exactly the affected line from the           │
//! │              server's authoritative copy (no list refetch)      │
//! │                                                                 │
//! │  failure ──► resync the whole cart with fetch_cart(), then      │
//! │              propagate the original error                       │
//! │                                                                 │
//! │  Consistency over optimism: no partial repair is attempted.     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Concurrent mutations on the same line are not de-duplicated; a race
//! between two rapid quantity updates resolves by last response wins.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use toko_api::{ApiError, ApiResult, Envelope, Transport, TransportExt};
use toko_core::{
    AddToCartRequest, CartItem, CartSummary, Money, StockStatus, StockValidationItem,
    UpdateCartItemRequest,
};

use crate::stores::auth::AuthStore;

#[derive(Default)]
struct CartState {
    items: Vec<CartItem>,
    summary: Option<CartSummary>,
    stock_validation: Vec<StockValidationItem>,
    has_stock_issues: bool,
    is_loading: bool,
    is_initialized: bool,
    error: Option<String>,
}

pub struct CartStore {
    transport: Arc<dyn Transport>,
    auth: Arc<AuthStore>,
    state: RwLock<CartState>,
}

impl CartStore {
    pub fn new(transport: Arc<dyn Transport>, auth: Arc<AuthStore>) -> Arc<Self> {
        Arc::new(CartStore {
            transport,
            auth,
            state: RwLock::new(CartState::default()),
        })
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub async fn items(&self) -> Vec<CartItem> {
        self.state.read().await.items.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.items.is_empty()
    }

    pub async fn has_items(&self) -> bool {
        !self.is_empty().await
    }

    /// Number of lines, from the server-computed summary.
    pub async fn item_count(&self) -> u32 {
        self.state
            .read()
            .await
            .summary
            .as_ref()
            .map(|s| s.item_count)
            .unwrap_or(0)
    }

    /// Server-computed cart total.
    pub async fn total(&self) -> Money {
        self.state
            .read()
            .await
            .summary
            .as_ref()
            .map(|s| s.total)
            .unwrap_or_else(Money::zero)
    }

    /// Cart total in display form, e.g. `"Rp 100.000"`.
    pub async fn formatted_total(&self) -> String {
        self.total().await.format()
    }

    pub async fn item_by_id(&self, item_id: i64) -> Option<CartItem> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|i| i.id == item_id)
            .cloned()
    }

    pub async fn item_by_product_id(&self, product_id: i64) -> Option<CartItem> {
        self.state
            .read()
            .await
            .items
            .iter()
            .find(|i| i.product.id == product_id)
            .cloned()
    }

    pub async fn quantity_in_cart(&self, product_id: i64) -> i64 {
        self.item_by_product_id(product_id)
            .await
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.is_initialized
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn has_stock_issues(&self) -> bool {
        self.state.read().await.has_stock_issues
    }

    pub async fn stock_validation(&self) -> Vec<StockValidationItem> {
        self.state.read().await.stock_validation.clone()
    }

    /// Verdict for one product from the latest validation snapshot.
    /// Products without a snapshot line are considered valid.
    pub async fn stock_status(&self, product_id: i64) -> StockStatus {
        let state = self.state.read().await;
        match state
            .stock_validation
            .iter()
            .find(|v| v.product_id == product_id)
        {
            None => StockStatus::Valid,
            Some(v) if v.available_stock == 0 => StockStatus::Unavailable,
            Some(v) if v.is_short() => StockStatus::Insufficient,
            Some(_) => StockStatus::Valid,
        }
    }

    // =========================================================================
    // Internal
    // =========================================================================

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.is_loading = true;
        state.error = None;
    }

    async fn finish(&self, error: Option<&ApiError>) {
        let mut state = self.state.write().await;
        state.is_loading = false;
        if let Some(e) = error {
            state.error = Some(e.to_string());
        }
    }

    /// Failure path of the mutation contract: resync the whole cart,
    /// then restore the mutation's error message (the resync has its own
    /// begin/finish cycle that would otherwise clear it). Best-effort;
    /// the original mutation error is what propagates.
    async fn resync_after_failure(&self, during: &str, error: &ApiError) {
        warn!(during, "cart mutation failed, resyncing from server");
        if let Err(e) = self.fetch_cart().await {
            warn!("cart resync also failed: {}", e);
        }
        self.state.write().await.error = Some(error.to_string());
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Replaces local cart state wholesale with the server's copy.
    ///
    /// Unauthenticated callers get an emptied local cart and no request.
    /// Sets `is_initialized` on every path.
    pub async fn fetch_cart(&self) -> ApiResult<()> {
        if !self.auth.is_authenticated().await {
            let mut state = self.state.write().await;
            state.items.clear();
            state.summary = None;
            state.is_initialized = true;
            return Ok(());
        }

        self.begin().await;
        let result: ApiResult<Envelope<CartSummary>> =
            self.transport.get_json("/cart", &[]).await;
        self.finish(result.as_ref().err()).await;

        let mut state = self.state.write().await;
        state.is_initialized = true;
        match result {
            Ok(envelope) => {
                state.items = envelope.data.items.clone();
                state.summary = Some(envelope.data);
                Ok(())
            }
            Err(e) => {
                state.items.clear();
                state.summary = None;
                Err(e)
            }
        }
    }

    /// Fetches the cart once; later calls are no-ops.
    pub async fn initialize(&self) -> ApiResult<()> {
        if self.is_initialized().await {
            return Ok(());
        }
        self.fetch_cart().await
    }

    /// Adds a product (or more of it) to the cart.
    ///
    /// The server returns the resulting merged line: an existing line for
    /// the same product is replaced, otherwise the line is appended.
    pub async fn add_to_cart(&self, product_id: i64, quantity: i64) -> ApiResult<CartItem> {
        if !self.auth.is_authenticated().await {
            return Err(ApiError::auth_required());
        }

        debug!(product_id, quantity, "add_to_cart");
        self.begin().await;
        let body = toko_api::transport::to_body(&AddToCartRequest {
            product_id,
            quantity,
        })?;
        let result: ApiResult<Envelope<CartItem>> =
            self.transport.post_json("/cart", Some(body)).await;
        self.finish(result.as_ref().err()).await;

        match result {
            Ok(envelope) => {
                let line = envelope.data;
                let mut state = self.state.write().await;
                match state
                    .items
                    .iter_mut()
                    .find(|i| i.product.id == product_id)
                {
                    Some(existing) => *existing = line.clone(),
                    None => state.items.push(line.clone()),
                }
                Ok(line)
            }
            Err(e) => {
                self.resync_after_failure("add_to_cart", &e).await;
                Err(e)
            }
        }
    }

    /// Changes a line's quantity. `quantity <= 0` removes the line; a
    /// line is never left at zero.
    pub async fn update_quantity(&self, item_id: i64, quantity: i64) -> ApiResult<()> {
        if !self.auth.is_authenticated().await {
            return Err(ApiError::auth_required());
        }

        if quantity <= 0 {
            return self.remove_item(item_id).await;
        }

        debug!(item_id, quantity, "update_quantity");
        self.begin().await;
        let body = toko_api::transport::to_body(&UpdateCartItemRequest { quantity })?;
        let result: ApiResult<Envelope<CartItem>> = self
            .transport
            .put_json(&format!("/cart/{}", item_id), Some(body))
            .await;
        self.finish(result.as_ref().err()).await;

        match result {
            Ok(envelope) => {
                let mut state = self.state.write().await;
                if let Some(existing) = state.items.iter_mut().find(|i| i.id == item_id) {
                    *existing = envelope.data;
                }
                Ok(())
            }
            Err(e) => {
                self.resync_after_failure("update_quantity", &e).await;
                Err(e)
            }
        }
    }

    /// Removes one line.
    pub async fn remove_item(&self, item_id: i64) -> ApiResult<()> {
        if !self.auth.is_authenticated().await {
            return Err(ApiError::auth_required());
        }

        debug!(item_id, "remove_item");
        self.begin().await;
        let result = self.transport.delete(&format!("/cart/{}", item_id)).await;
        self.finish(result.as_ref().err()).await;

        match result {
            Ok(_) => {
                self.state.write().await.items.retain(|i| i.id != item_id);
                Ok(())
            }
            Err(e) => {
                self.resync_after_failure("remove_item", &e).await;
                Err(e)
            }
        }
    }

    /// Empties the cart (server and local).
    pub async fn clear_cart(&self) -> ApiResult<()> {
        if !self.auth.is_authenticated().await {
            return Err(ApiError::auth_required());
        }

        debug!("clear_cart");
        self.begin().await;
        let result = self.transport.delete("/cart").await;
        self.finish(result.as_ref().err()).await;

        match result {
            Ok(_) => {
                let mut state = self.state.write().await;
                state.items.clear();
                state.summary = None;
                info!("Cart cleared");
                Ok(())
            }
            Err(e) => {
                self.resync_after_failure("clear_cart", &e).await;
                Err(e)
            }
        }
    }

    /// Pulls the server-computed per-line stock snapshot and flags the
    /// cart when any line wants more than is available.
    ///
    /// A gate before order creation, not a guarantee: the server
    /// re-validates at submission.
    pub async fn validate_stock(&self) -> ApiResult<Vec<StockValidationItem>> {
        if !self.auth.is_authenticated().await {
            return Err(ApiError::auth_required());
        }

        let result: ApiResult<Envelope<Vec<StockValidationItem>>> =
            self.transport.get_json("/cart/validate-stock", &[]).await;

        match result {
            Ok(envelope) => {
                let snapshot = envelope.data;
                let mut state = self.state.write().await;
                state.has_stock_issues = snapshot.iter().any(|v| v.is_short());
                state.stock_validation = snapshot.clone();
                debug!(
                    lines = snapshot.len(),
                    has_issues = state.has_stock_issues,
                    "stock validated"
                );
                Ok(snapshot)
            }
            Err(e) => {
                self.state.write().await.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Forgets the last stock snapshot (after a successful order).
    pub async fn reset_stock_validation(&self) {
        let mut state = self.state.write().await;
        state.stock_validation.clear();
        state.has_stock_issues = false;
    }

    /// Drops all local cart state (logout). No server call.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        *state = CartState::default();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
