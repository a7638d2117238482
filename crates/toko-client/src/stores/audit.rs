//! # Audit Trail Store (admin, read-only)

use std::sync::Arc;

use tokio::sync::RwLock;

use toko_api::{ApiError, ApiResult, Envelope, Page, PageMeta, Transport, TransportExt};
use toko_core::filters::AuditTrailFilters;
use toko_core::AuditTrail;

#[derive(Default)]
struct AuditState {
    entries: Vec<AuditTrail>,
    current: Option<AuditTrail>,
    pagination: PageMeta,
    filters: AuditTrailFilters,
    is_loading: bool,
    error: Option<String>,
}

pub struct AuditStore {
    transport: Arc<dyn Transport>,
    state: RwLock<AuditState>,
}

impl AuditStore {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(AuditStore {
            transport,
            state: RwLock::new(AuditState::default()),
        })
    }

    pub async fn entries(&self) -> Vec<AuditTrail> {
        self.state.read().await.entries.clone()
    }

    pub async fn current(&self) -> Option<AuditTrail> {
        self.state.read().await.current.clone()
    }

    pub async fn pagination(&self) -> PageMeta {
        self.state.read().await.pagination
    }

    pub async fn total_entries(&self) -> u64 {
        self.state.read().await.pagination.total
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

    pub async fn fetch_entries(&self, filters: Option<&AuditTrailFilters>) -> ApiResult<()> {
        self.begin().await;

        let query = {
            let mut state = self.state.write().await;
            if let Some(new_filters) = filters {
                if new_filters.user_id.is_some() {
                    state.filters.user_id = new_filters.user_id;
                }
                if new_filters.model_type.is_some() {
                    state.filters.model_type = new_filters.model_type.clone();
                }
                if new_filters.action.is_some() {
                    state.filters.action = new_filters.action;
                }
                if new_filters.date_from.is_some() {
                    state.filters.date_from = new_filters.date_from.clone();
                }
                if new_filters.date_to.is_some() {
                    state.filters.date_to = new_filters.date_to.clone();
                }
                if new_filters.page.is_some() {
                    state.filters.page = new_filters.page;
                }
                if new_filters.per_page.is_some() {
                    state.filters.per_page = new_filters.per_page;
                }
            }
            state.filters.to_query()
        };

        let result: ApiResult<Envelope<Page<AuditTrail>>> =
            self.transport.get_json("/audit-trails", &query).await;
        self.finish(result.as_ref().err()).await;

        let page = result?.data;
        let mut state = self.state.write().await;
        state.entries = page.data;
        state.pagination = page.meta;
        Ok(())
    }

    pub async fn fetch_entry(&self, id: i64) -> ApiResult<AuditTrail> {
        self.begin().await;
        let result: ApiResult<Envelope<AuditTrail>> = self
            .transport
            .get_json(&format!("/audit-trails/{}", id), &[])
            .await;
        self.finish(result.as_ref().err()).await;

        let entry = result?.data;
        self.state.write().await.current = Some(entry.clone());
        Ok(entry)
    }

    pub async fn clear_filters(&self) {
        self.state.write().await.filters = AuditTrailFilters::default();
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    pub async fn clear_current_entry(&self) {
        self.state.write().await.current = None;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockTransport};
    use serde_json::json;
    use toko_core::AuditAction;

    fn audit_entry_json(id: i64, action: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": 1,
            "model_type": "Product",
            "model_id": 7,
            "action": action,
            "old_values": {"price": "50000.00"},
            "new_values": {"price": "60000.00"},
            "ip_address": "127.0.0.1",
            "user_agent": "Mozilla/5.0",
            "created_at": fixtures::TS,
            "updated_at": fixtures::TS
        })
    }

    #[tokio::test]
    async fn test_fetch_entries_with_filters() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/audit-trails",
            Ok(json!({"data": fixtures::page_json(
                vec![audit_entry_json(1, "updated")],
                1, 1, 1,
            )})),
        );

        let store = AuditStore::new(mock.clone());
        store
            .fetch_entries(Some(&AuditTrailFilters {
                action: Some(AuditAction::Updated),
                model_type: Some("Product".to_string()),
                ..AuditTrailFilters::default()
            }))
            .await
            .unwrap();

        let entries = store.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Updated);
        assert_eq!(entries[0].old_values.as_ref().unwrap()["price"], "50000.00");

        let call = &mock.calls_to("GET", "/audit-trails")[0];
        assert!(call
            .query
            .iter()
            .any(|(k, v)| k == "action" && v == "updated"));
    }

    #[tokio::test]
    async fn test_fetch_entry_sets_current() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/audit-trails/3",
            Ok(json!({"data": audit_entry_json(3, "created")})),
        );

        let store = AuditStore::new(mock);
        let entry = store.fetch_entry(3).await.unwrap();

        assert_eq!(entry.id, 3);
        assert_eq!(store.current().await.unwrap().id, 3);
    }
}
