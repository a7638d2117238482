//! # Client Container
//!
//! Wires the whole SDK together: one transport, one store per concern,
//! the guards and the checkout flow. Everything is an explicit,
//! dependency-injected service object; there are no global singletons.

use std::sync::Arc;

use toko_api::{ApiResult, ClientConfig, HttpTransport, RetryPolicy, Transport};

use crate::checkout::Checkout;
use crate::guards::Guard;
use crate::notify::Notifier;
use crate::session::SessionCache;
use crate::stores::{
    AdminStore, AuditStore, AuthStore, CartStore, CategoriesStore, OrdersStore, ProductsStore,
    StorageStore, TransactionsStore, UsersStore,
};

/// The assembled client.
///
/// Construction order follows the dependency graph: transport first, then
/// auth (it owns the token), then the stores that consult auth, then the
/// orchestrators on top.
pub struct Toko {
    /// Retry policy from config, for wrapping flaky operations with
    /// `toko_api::retry_with_policy` at the call site. Nothing retries
    /// implicitly.
    pub retry_policy: RetryPolicy,
    pub notifier: Notifier,
    pub auth: Arc<AuthStore>,
    pub cart: Arc<CartStore>,
    pub products: Arc<ProductsStore>,
    pub orders: Arc<OrdersStore>,
    pub categories: Arc<CategoriesStore>,
    pub users: Arc<UsersStore>,
    pub transactions: Arc<TransactionsStore>,
    pub audit: Arc<AuditStore>,
    pub storage: Arc<StorageStore>,
    pub admin: Arc<AdminStore>,
    pub checkout: Checkout,
    pub guard: Guard,
}

impl Toko {
    /// Builds a client against a live HTTP API.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config)?);
        let mut client = Self::with_transport(transport, SessionCache::new());
        client.retry_policy = config.retry_policy();
        Ok(client)
    }

    /// Builds a client over any transport (tests inject a mock here).
    pub fn with_transport(transport: Arc<dyn Transport>, session: SessionCache) -> Self {
        let notifier = Notifier::new();

        let auth = AuthStore::new(transport.clone(), session);
        let cart = CartStore::new(transport.clone(), auth.clone());
        let products = ProductsStore::new(transport.clone());
        let orders = OrdersStore::new(transport.clone(), cart.clone(), products.clone());
        let categories = CategoriesStore::new(transport.clone());
        let users = UsersStore::new(transport.clone());
        let transactions = TransactionsStore::new(transport.clone());
        let audit = AuditStore::new(transport.clone());
        let storage = StorageStore::new(transport.clone());
        let admin = AdminStore::new(transport);

        let checkout = Checkout::new(cart.clone(), orders.clone(), notifier.clone());
        let guard = Guard::new(auth.clone(), notifier.clone());

        Toko {
            retry_policy: RetryPolicy::default(),
            notifier,
            auth,
            cart,
            products,
            orders,
            categories,
            users,
            transactions,
            audit,
            storage,
            admin,
            checkout,
            guard,
        }
    }

    /// Startup hydration: restores the cached session, then loads the
    /// cart for a signed-in user.
    pub async fn initialize(&self) {
        self.auth.check_auth().await;
        let _ = self.cart.initialize().await;
    }

    /// Signs out and drops per-user state.
    pub async fn sign_out(&self) {
        self.auth.logout().await;
        self.cart.reset().await;
        self.orders.clear_orders().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
