//! # Domain Types
//!
//! Entities and request payloads for the Toko API.
//!
//! ## Identity
//! Every entity carries a server-assigned numeric `id`. The client never
//! mints entity ids; it only echoes them back. Soft-deleted entities keep
//! their row and gain a `deleted_at` timestamp.
//!
//! ## Snapshots
//! Cart lines and transaction lines embed a snapshot of the product at the
//! time the server created them. Prices shown in the cart therefore stay
//! stable even if the catalog price changes afterwards; the server owns
//! the final price at order time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Roles & Users
// =============================================================================

/// User role.
///
/// Role checks are simple set-membership tests against static per-route
/// allowlists; there is no policy engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Moderator,
    Customer,
}

impl Role {
    /// Staff roles may enter the admin back-office at all.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Editor | Role::Moderator)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Moderator => "moderator",
            Role::Customer => "customer",
        };
        f.write_str(s)
    }
}

/// An account on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: Role,
    /// Fine-grained permission names, used by the permission guard.
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

fn default_role() -> Role {
    Role::Customer
}

/// Payload returned by `/login`, `/register` and `/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    /// Omitted from the request when unchanged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    pub stock: i64,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// A product can be shown as purchasable while it has stock and is not
    /// soft-deleted. The server re-checks on every cart mutation.
    pub fn is_available(&self) -> bool {
        self.stock > 0 && self.deleted_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub image_path: String,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Bytes of an image attached to a product create/update request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub category_id: Option<i64>,
    pub images: Vec<ImageUpload>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProductRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    /// When non-empty the update goes out as multipart instead of JSON.
    #[serde(skip)]
    pub images: Vec<ImageUpload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub type UpdateCategoryRequest = CreateCategoryRequest;

// =============================================================================
// Cart
// =============================================================================

/// Product snapshot embedded in a cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: i64,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    #[serde(default)]
    pub image: Option<String>,
}

/// One line in the authenticated user's cart.
///
/// ## Invariants
/// - `quantity >= 1` while the line exists; quantity zero means removal
/// - Lines are unique by `product.id`; the server merges duplicates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub product: CartProduct,
    pub quantity: i64,
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The `GET /cart` payload: lines plus server-computed totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    #[serde(rename = "data")]
    pub items: Vec<CartItem>,
    pub total: Money,
    pub item_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i64,
}

/// Server-computed stock snapshot for one cart line.
///
/// Ephemeral: fetched on demand, never persisted, recomputed each time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockValidationItem {
    pub product_id: i64,
    pub name: String,
    pub available_stock: i64,
    pub cart_quantity: i64,
}

impl StockValidationItem {
    /// True when the cart wants more than the shelf holds.
    pub fn is_short(&self) -> bool {
        self.cart_quantity > self.available_stock
    }
}

/// Per-line stock verdict derived from the latest validation snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    Valid,
    Insufficient,
    Unavailable,
}

// =============================================================================
// Transactions (Orders)
// =============================================================================

/// Order lifecycle status.
///
/// ## Transition Map
/// ```text
/// pending ──► processing ──► shipped ──► delivered ──► completed
///    │            │                          │             │
///    ▼            ▼                          ▼             ▼
/// cancelled   cancelled                  refunded      refunded
/// ```
///
/// The map below is a client-side mirror of the server rules, used only to
/// enable or disable actions in the UI. The server enforces transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
    Refunded,
}

impl TransactionStatus {
    /// Statuses this one may move to.
    pub fn allowed_transitions(&self) -> &'static [TransactionStatus] {
        use TransactionStatus::*;
        match self {
            Pending => &[Processing, Cancelled],
            Processing => &[Shipped, Cancelled],
            Shipped => &[Delivered],
            Delivered => &[Completed, Refunded],
            Completed => &[Refunded],
            Cancelled | Refunded => &[],
        }
    }

    /// Whether `next` is an allowed move from this status.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Checks a transition, returning a typed error for UI messaging.
    pub fn ensure_transition(&self, next: TransactionStatus) -> Result<(), CoreError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidStatusTransition {
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Terminal statuses have no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Processing => "Processing",
            TransactionStatus::Shipped => "Shipped",
            TransactionStatus::Delivered => "Delivered",
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Cancelled => "Cancelled",
            TransactionStatus::Refunded => "Refunded",
        }
    }

    /// One-line description for status badges.
    pub fn description(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "Order is being processed",
            TransactionStatus::Processing => "Order is being prepared",
            TransactionStatus::Shipped => "Order has been shipped",
            TransactionStatus::Delivered => "Order has been delivered",
            TransactionStatus::Completed => "Order has been completed",
            TransactionStatus::Cancelled => "Order has been cancelled",
            TransactionStatus::Refunded => "Order has been refunded",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Processing => "processing",
            TransactionStatus::Shipped => "shipped",
            TransactionStatus::Delivered => "delivered",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::Refunded => "refunded",
        };
        f.write_str(s)
    }
}

/// A persisted order. Created once, server-authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: Money,
    pub status: TransactionStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<TransactionItem>,
    #[serde(default)]
    pub user: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Total quantity across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

/// One line of an order, with the price captured at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub id: i64,
    pub transaction_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price: Money,
    pub total: Money,
    #[serde(default)]
    pub product: Option<Product>,
}

/// Line item of a new order submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransactionItem {
    pub product_id: i64,
    pub quantity: i64,
    /// Price captured from the cart snapshot at submit time.
    pub price: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub items: Vec<NewTransactionItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// New orders default to `pending`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    pub status: TransactionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =============================================================================
// Audit Trail
// =============================================================================

/// What an audit entry recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    Restored,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuditAction::Created => "created",
            AuditAction::Updated => "updated",
            AuditAction::Deleted => "deleted",
            AuditAction::Restored => "restored",
        };
        f.write_str(s)
    }
}

/// One entry of the admin audit trail.
///
/// `old_values`/`new_values` are free-form objects whose shape depends on
/// the audited model, so they stay as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrail {
    pub id: i64,
    pub user_id: i64,
    pub model_type: String,
    pub model_id: i64,
    pub action: AuditAction,
    #[serde(default)]
    pub old_values: Option<Value>,
    #[serde(default)]
    pub new_values: Option<Value>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Storage
// =============================================================================

/// A file managed through the admin storage area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageFile {
    pub id: i64,
    pub filename: String,
    pub path: String,
    pub mime_type: String,
    pub size: u64,
    #[serde(default)]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A file upload request (goes out as multipart form data).
#[derive(Debug, Clone)]
pub struct FileUploadRequest {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub category: Option<String>,
}

// =============================================================================
// Dashboard & Analytics
// =============================================================================

/// Headline counters for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_products: u64,
    pub total_categories: u64,
    pub total_transactions: u64,
    pub total_revenue: Money,
    #[serde(default)]
    pub recent_transactions: Vec<Transaction>,
    #[serde(default)]
    pub low_stock_products: Vec<Product>,
    #[serde(default)]
    pub top_products: Vec<Product>,
}

/// Inclusive date range for analytics queries (`YYYY-MM-DD`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub from: String,
    pub to: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_staff_membership() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Editor.is_staff());
        assert!(Role::Moderator.is_staff());
        assert!(!Role::Customer.is_staff());
    }

    #[test]
    fn test_status_happy_path() {
        use TransactionStatus::*;

        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(Delivered.can_transition_to(Completed));
    }

    #[test]
    fn test_status_side_exits() {
        use TransactionStatus::*;

        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(Delivered.can_transition_to(Refunded));
        assert!(Completed.can_transition_to(Refunded));

        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Refunded));
    }

    #[test]
    fn test_status_no_backwards_moves() {
        use TransactionStatus::*;

        assert!(!Processing.can_transition_to(Pending));
        assert!(!Delivered.can_transition_to(Shipped));
        assert!(Delivered.ensure_transition(Pending).is_err());
    }

    #[test]
    fn test_status_terminals() {
        assert!(TransactionStatus::Cancelled.is_terminal());
        assert!(TransactionStatus::Refunded.is_terminal());
        assert!(!TransactionStatus::Completed.is_terminal());
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&TransactionStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");

        let back: TransactionStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(back, TransactionStatus::Refunded);
    }

    #[test]
    fn test_stock_validation_item_is_short() {
        let item = StockValidationItem {
            product_id: 1,
            name: "Kopi Gayo".to_string(),
            available_stock: 3,
            cart_quantity: 5,
        };
        assert!(item.is_short());

        let ok = StockValidationItem {
            available_stock: 5,
            cart_quantity: 5,
            ..item
        };
        assert!(!ok.is_short());
    }

    #[test]
    fn test_cart_summary_deserializes_wire_shape() {
        let json = serde_json::json!({
            "data": [{
                "id": 11,
                "product": {
                    "id": 7,
                    "name": "Kopi Gayo 250g",
                    "price": "50000.00",
                    "stock": 10,
                    "image": null
                },
                "quantity": 2,
                "total_price": "100000.00",
                "created_at": "2024-05-01T08:00:00Z",
                "updated_at": "2024-05-01T08:00:00Z"
            }],
            "total": "100000.00",
            "item_count": 1
        });

        let summary: CartSummary = serde_json::from_value(json).unwrap();
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.items[0].product.price.rupiah(), 50_000);
        assert_eq!(summary.total.rupiah(), 100_000);
    }

    #[test]
    fn test_user_defaults_lenient_fields() {
        let json = serde_json::json!({
            "id": 1,
            "name": "Siti",
            "email": "siti@example.com",
            "role": "customer",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        });

        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.role, Role::Customer);
        assert!(user.permissions.is_empty());
        assert!(user.deleted_at.is_none());
    }

    #[test]
    fn test_transaction_item_count() {
        let json = serde_json::json!({
            "id": 3,
            "user_id": 1,
            "total_amount": "150000.00",
            "status": "pending",
            "items": [
                {"id": 1, "transaction_id": 3, "product_id": 7, "quantity": 2,
                 "price": "50000.00", "total": "100000.00"},
                {"id": 2, "transaction_id": 3, "product_id": 9, "quantity": 1,
                 "price": "50000.00", "total": "50000.00"}
            ],
            "created_at": "2024-05-01T08:00:00Z",
            "updated_at": "2024-05-01T08:00:00Z"
        });

        let tx: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(tx.item_count(), 3);
    }
}
