//! # Admin Dashboard Store
//!
//! Headline stats plus the analytics panels. Stats have a stable typed
//! shape; the analytics payloads vary by report and stay as raw JSON for
//! the charting layer to interpret.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use toko_api::{ApiError, ApiResult, Envelope, Transport, TransportExt};
use toko_core::{DashboardStats, DateRange};

#[derive(Default)]
struct AdminState {
    dashboard_stats: Option<DashboardStats>,
    sales_analytics: Option<Value>,
    inventory_analytics: Option<Value>,
    user_analytics: Option<Value>,
    is_loading: bool,
    error: Option<String>,
}

pub struct AdminStore {
    transport: Arc<dyn Transport>,
    state: RwLock<AdminState>,
}

impl AdminStore {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(AdminStore {
            transport,
            state: RwLock::new(AdminState::default()),
        })
    }

    pub async fn dashboard_stats(&self) -> Option<DashboardStats> {
        self.state.read().await.dashboard_stats.clone()
    }

    pub async fn has_stats(&self) -> bool {
        self.state.read().await.dashboard_stats.is_some()
    }

    pub async fn sales_analytics(&self) -> Option<Value> {
        self.state.read().await.sales_analytics.clone()
    }

    pub async fn inventory_analytics(&self) -> Option<Value> {
        self.state.read().await.inventory_analytics.clone()
    }

    pub async fn user_analytics(&self) -> Option<Value> {
        self.state.read().await.user_analytics.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

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

    pub async fn fetch_dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.begin().await;
        let result: ApiResult<Envelope<DashboardStats>> =
            self.transport.get_json("/dashboard/stats", &[]).await;
        self.finish(result.as_ref().err()).await;

        let stats = result?.data;
        debug!(
            users = stats.total_users,
            transactions = stats.total_transactions,
            "dashboard stats fetched"
        );
        self.state.write().await.dashboard_stats = Some(stats.clone());
        Ok(stats)
    }

    pub async fn fetch_sales_analytics(&self, range: Option<&DateRange>) -> ApiResult<Value> {
        let query: Vec<(String, String)> = match range {
            Some(range) => vec![
                ("from".to_string(), range.from.clone()),
                ("to".to_string(), range.to.clone()),
            ],
            None => Vec::new(),
        };

        self.begin().await;
        let result: ApiResult<Envelope<Value>> =
            self.transport.get_json("/dashboard/sales", &query).await;
        self.finish(result.as_ref().err()).await;

        let data = result?.data;
        self.state.write().await.sales_analytics = Some(data.clone());
        Ok(data)
    }

    pub async fn fetch_inventory_analytics(&self) -> ApiResult<Value> {
        self.begin().await;
        let result: ApiResult<Envelope<Value>> = self
            .transport
            .get_json("/admin/analytics/inventory", &[])
            .await;
        self.finish(result.as_ref().err()).await;

        let data = result?.data;
        self.state.write().await.inventory_analytics = Some(data.clone());
        Ok(data)
    }

    pub async fn fetch_user_analytics(&self) -> ApiResult<Value> {
        self.begin().await;
        let result: ApiResult<Envelope<Value>> =
            self.transport.get_json("/admin/analytics/users", &[]).await;
        self.finish(result.as_ref().err()).await;

        let data = result?.data;
        self.state.write().await.user_analytics = Some(data.clone());
        Ok(data)
    }

    pub async fn clear_stats(&self) {
        let mut state = self.state.write().await;
        state.dashboard_stats = None;
        state.sales_analytics = None;
        state.inventory_analytics = None;
        state.user_analytics = None;
        state.error = None;
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_dashboard_stats() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/dashboard/stats",
            Ok(json!({"data": {
                "totalUsers": 120,
                "totalProducts": 48,
                "totalCategories": 6,
                "totalTransactions": 310,
                "totalRevenue": "15750000.00",
                "recentTransactions": [],
                "lowStockProducts": [],
                "topProducts": []
            }})),
        );

        let store = AdminStore::new(mock);
        let stats = store.fetch_dashboard_stats().await.unwrap();

        assert_eq!(stats.total_users, 120);
        assert_eq!(stats.total_revenue.rupiah(), 15_750_000);
        assert!(store.has_stats().await);
    }

    #[tokio::test]
    async fn test_sales_analytics_sends_range() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/dashboard/sales",
            Ok(json!({"data": {"series": []}})),
        );

        let store = AdminStore::new(mock.clone());
        store
            .fetch_sales_analytics(Some(&DateRange {
                from: "2024-04-01".to_string(),
                to: "2024-04-30".to_string(),
            }))
            .await
            .unwrap();

        let call = &mock.calls_to("GET", "/dashboard/sales")[0];
        assert!(call
            .query
            .iter()
            .any(|(k, v)| k == "from" && v == "2024-04-01"));
    }

    #[tokio::test]
    async fn test_clear_stats() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/admin/analytics/inventory",
            Ok(json!({"data": {"lowStock": []}})),
        );

        let store = AdminStore::new(mock);
        store.fetch_inventory_analytics().await.unwrap();
        assert!(store.inventory_analytics().await.is_some());

        store.clear_stats().await;
        assert!(store.inventory_analytics().await.is_none());
        assert!(!store.has_stats().await);
    }
}
