//! # List Filters
//!
//! Filter types for every paginated listing, plus their query-string
//! encoding. `to_query` skips unset fields so the request only carries
//! parameters the caller actually chose.

use crate::types::{AuditAction, Role, TransactionStatus};

/// Sort direction shared by all listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Query-string pairs, in insertion order.
pub type Query = Vec<(String, String)>;

fn push(query: &mut Query, key: &str, value: impl ToString) {
    query.push((key.to_string(), value.to_string()));
}

fn push_opt(query: &mut Query, key: &str, value: Option<impl ToString>) {
    if let Some(v) = value {
        push(query, key, v);
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Status filter for the customer order listing.
///
/// `All` exists so UI select boxes have a concrete "no filter" entry; it is
/// stripped before the request is built and never reaches the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TransactionStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSortBy {
    CreatedAt,
    TotalAmount,
}

impl OrderSortBy {
    fn as_str(&self) -> &'static str {
        match self {
            OrderSortBy::CreatedAt => "created_at",
            OrderSortBy::TotalAmount => "total_amount",
        }
    }
}

/// Filters for `GET /my-transactions`.
#[derive(Debug, Clone, Default)]
pub struct OrderFilters {
    pub status: StatusFilter,
    pub sort_by: Option<OrderSortBy>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl OrderFilters {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        if let StatusFilter::Only(status) = self.status {
            push(&mut query, "status", status);
        }
        push_opt(&mut query, "sort_by", self.sort_by.map(|s| s.as_str()));
        push_opt(&mut query, "sort_order", self.sort_order.map(|s| s.as_str()));
        push(&mut query, "page", self.page.unwrap_or(1));
        push(
            &mut query,
            "per_page",
            self.per_page.unwrap_or(crate::DEFAULT_PER_PAGE),
        );
        query
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAvailability {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortBy {
    Name,
    Price,
    CreatedAt,
}

impl ProductSortBy {
    fn as_str(&self) -> &'static str {
        match self {
            ProductSortBy::Name => "name",
            ProductSortBy::Price => "price",
            ProductSortBy::CreatedAt => "created_at",
        }
    }
}

/// Filters for `GET /products` (public catalog and admin list).
#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub status: Option<ProductAvailability>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort: Option<ProductSortBy>,
    pub order: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductFilters {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_opt(&mut query, "search", self.search.as_deref());
        push_opt(&mut query, "category_id", self.category_id);
        push_opt(
            &mut query,
            "status",
            self.status.map(|s| match s {
                ProductAvailability::Available => "available",
                ProductAvailability::Unavailable => "unavailable",
            }),
        );
        push_opt(&mut query, "min_price", self.min_price);
        push_opt(&mut query, "max_price", self.max_price);
        push_opt(&mut query, "sort", self.sort.map(|s| s.as_str()));
        push_opt(&mut query, "order", self.order.map(|s| s.as_str()));
        push_opt(&mut query, "page", self.page);
        push_opt(&mut query, "limit", self.limit);
        query
    }

    /// Merges set fields of `other` into `self` (unset fields keep their
    /// previous value, matching how list screens refine filters).
    pub fn merge(&mut self, other: &ProductFilters) {
        if other.search.is_some() {
            self.search = other.search.clone();
        }
        if other.category_id.is_some() {
            self.category_id = other.category_id;
        }
        if other.status.is_some() {
            self.status = other.status;
        }
        if other.min_price.is_some() {
            self.min_price = other.min_price;
        }
        if other.max_price.is_some() {
            self.max_price = other.max_price;
        }
        if other.sort.is_some() {
            self.sort = other.sort;
        }
        if other.order.is_some() {
            self.order = other.order;
        }
        if other.page.is_some() {
            self.page = other.page;
        }
        if other.limit.is_some() {
            self.limit = other.limit;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryFilters {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl CategoryFilters {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_opt(&mut query, "search", self.search.as_deref());
        push_opt(&mut query, "page", self.page);
        push_opt(&mut query, "per_page", self.per_page);
        query
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct UserFilters {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl UserFilters {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_opt(&mut query, "search", self.search.as_deref());
        push_opt(&mut query, "role", self.role);
        push_opt(&mut query, "page", self.page);
        push_opt(&mut query, "per_page", self.per_page);
        query
    }
}

// =============================================================================
// Admin Transactions
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct TransactionFilters {
    pub status: Option<TransactionStatus>,
    pub sort_by: Option<OrderSortBy>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl TransactionFilters {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_opt(&mut query, "status", self.status);
        push_opt(&mut query, "sort_by", self.sort_by.map(|s| s.as_str()));
        push_opt(&mut query, "sort_order", self.sort_order.map(|s| s.as_str()));
        push_opt(&mut query, "page", self.page);
        push_opt(&mut query, "per_page", self.per_page);
        query
    }
}

// =============================================================================
// Audit Trail
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct AuditTrailFilters {
    pub user_id: Option<i64>,
    pub model_type: Option<String>,
    pub action: Option<AuditAction>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl AuditTrailFilters {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_opt(&mut query, "user_id", self.user_id);
        push_opt(&mut query, "model_type", self.model_type.as_deref());
        push_opt(&mut query, "action", self.action);
        push_opt(&mut query, "date_from", self.date_from.as_deref());
        push_opt(&mut query, "date_to", self.date_to.as_deref());
        push_opt(&mut query, "page", self.page);
        push_opt(&mut query, "per_page", self.per_page);
        query
    }
}

// =============================================================================
// Storage
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct StorageFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub mime_type: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl StorageFilters {
    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        push_opt(&mut query, "search", self.search.as_deref());
        push_opt(&mut query, "category", self.category.as_deref());
        push_opt(&mut query, "mime_type", self.mime_type.as_deref());
        push_opt(&mut query, "page", self.page);
        push_opt(&mut query, "per_page", self.per_page);
        query
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn has_key(query: &Query, key: &str) -> bool {
        query.iter().any(|(k, _)| k == key)
    }

    fn value_of<'a>(query: &'a Query, key: &str) -> Option<&'a str> {
        query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_order_filters_strip_all_status() {
        let filters = OrderFilters {
            status: StatusFilter::All,
            ..OrderFilters::default()
        };
        let query = filters.to_query();

        assert!(!has_key(&query, "status"));
        assert_eq!(value_of(&query, "page"), Some("1"));
        assert_eq!(value_of(&query, "per_page"), Some("10"));
    }

    #[test]
    fn test_order_filters_concrete_status_is_sent() {
        let filters = OrderFilters {
            status: StatusFilter::Only(TransactionStatus::Shipped),
            sort_by: Some(OrderSortBy::TotalAmount),
            sort_order: Some(SortOrder::Desc),
            page: Some(2),
            per_page: Some(25),
        };
        let query = filters.to_query();

        assert_eq!(value_of(&query, "status"), Some("shipped"));
        assert_eq!(value_of(&query, "sort_by"), Some("total_amount"));
        assert_eq!(value_of(&query, "sort_order"), Some("desc"));
        assert_eq!(value_of(&query, "page"), Some("2"));
    }

    #[test]
    fn test_product_filters_skip_unset() {
        let filters = ProductFilters {
            search: Some("kopi".to_string()),
            ..ProductFilters::default()
        };
        let query = filters.to_query();

        assert_eq!(value_of(&query, "search"), Some("kopi"));
        assert!(!has_key(&query, "category_id"));
        assert!(!has_key(&query, "min_price"));
        assert!(!has_key(&query, "page"));
    }

    #[test]
    fn test_product_filters_merge_keeps_unset() {
        let mut filters = ProductFilters {
            search: Some("kopi".to_string()),
            category_id: Some(3),
            ..ProductFilters::default()
        };
        filters.merge(&ProductFilters {
            page: Some(2),
            ..ProductFilters::default()
        });

        assert_eq!(filters.search.as_deref(), Some("kopi"));
        assert_eq!(filters.category_id, Some(3));
        assert_eq!(filters.page, Some(2));
    }

    #[test]
    fn test_user_filters_role() {
        let filters = UserFilters {
            role: Some(Role::Editor),
            ..UserFilters::default()
        };
        assert_eq!(value_of(&filters.to_query(), "role"), Some("editor"));
    }

    #[test]
    fn test_audit_filters_action() {
        let filters = AuditTrailFilters {
            action: Some(AuditAction::Deleted),
            model_type: Some("Product".to_string()),
            ..AuditTrailFilters::default()
        };
        let query = filters.to_query();
        assert_eq!(value_of(&query, "action"), Some("deleted"));
        assert_eq!(value_of(&query, "model_type"), Some("Product"));
    }
}
