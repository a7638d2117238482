//! # Orders Store
//!
//! The customer's own orders: paginated history, single-order detail, and
//! order creation from the current cart snapshot.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use toko_api::{ApiResult, Envelope, Page, PageMeta, Transport, TransportExt};
use toko_core::filters::OrderFilters;
use toko_core::{
    CreateTransactionRequest, NewTransactionItem, Transaction, TransactionStatus,
};

use crate::stores::cart::CartStore;
use crate::stores::products::ProductsStore;

#[derive(Default)]
struct OrdersState {
    orders: Vec<Transaction>,
    current: Option<Transaction>,
    pagination: PageMeta,
    is_loading: bool,
    is_creating: bool,
    error: Option<String>,
}

pub struct OrdersStore {
    transport: Arc<dyn Transport>,
    cart: Arc<CartStore>,
    products: Arc<ProductsStore>,
    state: RwLock<OrdersState>,
}

impl OrdersStore {
    pub fn new(
        transport: Arc<dyn Transport>,
        cart: Arc<CartStore>,
        products: Arc<ProductsStore>,
    ) -> Arc<Self> {
        Arc::new(OrdersStore {
            transport,
            cart,
            products,
            state: RwLock::new(OrdersState::default()),
        })
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub async fn orders(&self) -> Vec<Transaction> {
        self.state.read().await.orders.clone()
    }

    pub async fn current(&self) -> Option<Transaction> {
        self.state.read().await.current.clone()
    }

    pub async fn pagination(&self) -> PageMeta {
        self.state.read().await.pagination
    }

    pub async fn has_orders(&self) -> bool {
        !self.state.read().await.orders.is_empty()
    }

    pub async fn pending_orders(&self) -> Vec<Transaction> {
        self.state
            .read()
            .await
            .orders
            .iter()
            .filter(|o| o.status == TransactionStatus::Pending)
            .cloned()
            .collect()
    }

    /// Orders that have left the warehouse (shipped or delivered).
    pub async fn completed_orders(&self) -> Vec<Transaction> {
        self.state
            .read()
            .await
            .orders
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    TransactionStatus::Shipped | TransactionStatus::Delivered
                )
            })
            .cloned()
            .collect()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn is_creating(&self) -> bool {
        self.state.read().await.is_creating
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    /// Whether another history page can be loaded.
    pub async fn can_load_more(&self) -> bool {
        self.state.read().await.pagination.has_more()
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Lists the user's orders. The `'all'` status filter is stripped
    /// before the request is built and never reaches the wire.
    pub async fn fetch_orders(&self, filters: &OrderFilters) -> ApiResult<()> {
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
        }

        let query = filters.to_query();
        let result: ApiResult<Envelope<Page<Transaction>>> =
            self.transport.get_json("/my-transactions", &query).await;

        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(envelope) => {
                state.orders = envelope.data.data;
                state.pagination = envelope.data.meta;
                debug!(count = state.orders.len(), "orders fetched");
                Ok(())
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn fetch_order(&self, id: i64) -> ApiResult<Transaction> {
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = None;
        }

        let result: ApiResult<Envelope<Transaction>> = self
            .transport
            .get_json(&format!("/transactions/{}", id), &[])
            .await;

        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(envelope) => {
                state.current = Some(envelope.data.clone());
                Ok(envelope.data)
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Submits the current cart as a new order.
    ///
    /// The payload captures each line's product, quantity, and the price
    /// from the cart snapshot; status defaults to `pending`. The cart
    /// itself is not touched here; the checkout flow clears it only after
    /// this call succeeds.
    pub async fn create_order(&self, notes: Option<String>) -> ApiResult<Transaction> {
        {
            let mut state = self.state.write().await;
            state.is_creating = true;
            state.error = None;
        }

        let items: Vec<NewTransactionItem> = self
            .cart
            .items()
            .await
            .iter()
            .map(|line| NewTransactionItem {
                product_id: line.product.id,
                quantity: line.quantity,
                price: line.product.price,
            })
            .collect();

        let payload = CreateTransactionRequest {
            items,
            notes,
            status: Some(TransactionStatus::Pending),
        };

        let result: ApiResult<Envelope<Transaction>> = match toko_api::transport::to_body(&payload)
        {
            Ok(body) => self.transport.post_json("/transactions", Some(body)).await,
            Err(e) => Err(e),
        };

        let mut state = self.state.write().await;
        state.is_creating = false;
        match result {
            Ok(envelope) => {
                let order = envelope.data;
                info!(order_id = order.id, total = %order.total_amount, "Order created");
                state.orders.insert(0, order.clone());
                state.current = Some(order.clone());
                Ok(order)
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Patches an order's status locally (the admin side already told the
    /// server). A cancellation releases stock, so the affected products
    /// are re-fetched to pick up their restored stock levels.
    pub async fn update_order_status(
        &self,
        order_id: i64,
        status: TransactionStatus,
    ) -> ApiResult<()> {
        let affected_items = {
            let mut state = self.state.write().await;
            let mut items = Vec::new();
            if let Some(order) = state.orders.iter_mut().find(|o| o.id == order_id) {
                order.status = status;
                items = order.items.clone();
            }
            if let Some(current) = state.current.as_mut() {
                if current.id == order_id {
                    current.status = status;
                }
            }
            items
        };

        if status == TransactionStatus::Cancelled {
            for item in affected_items {
                match self.products.fetch_product(item.product_id).await {
                    Ok(product) => {
                        self.products.update_stock(product.id, product.stock).await;
                    }
                    Err(e) => debug!(
                        product_id = item.product_id,
                        "stock refresh after cancel failed: {}", e
                    ),
                }
            }
        }

        Ok(())
    }

    pub async fn clear_current_order(&self) {
        self.state.write().await.current = None;
    }

    pub async fn clear_orders(&self) {
        let mut state = self.state.write().await;
        *state = OrdersState::default();
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// Re-fetches the current page.
    pub async fn refresh_orders(&self) -> ApiResult<()> {
        let (page, per_page) = {
            let state = self.state.read().await;
            (state.pagination.current_page, state.pagination.per_page)
        };
        self.fetch_orders(&OrderFilters {
            page: Some(page),
            per_page: Some(per_page),
            ..OrderFilters::default()
        })
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
