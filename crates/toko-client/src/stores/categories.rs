//! # Categories Store

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use toko_api::{ApiError, ApiResult, Envelope, Page, PageMeta, Transport, TransportExt};
use toko_core::filters::CategoryFilters;
use toko_core::{Category, CreateCategoryRequest, UpdateCategoryRequest};

#[derive(Default)]
struct CategoriesState {
    categories: Vec<Category>,
    current: Option<Category>,
    pagination: PageMeta,
    filters: CategoryFilters,
    is_loading: bool,
    error: Option<String>,
}

pub struct CategoriesStore {
    transport: Arc<dyn Transport>,
    state: RwLock<CategoriesState>,
}

impl CategoriesStore {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(CategoriesStore {
            transport,
            state: RwLock::new(CategoriesState::default()),
        })
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.categories.clone()
    }

    pub async fn current(&self) -> Option<Category> {
        self.state.read().await.current.clone()
    }

    pub async fn pagination(&self) -> PageMeta {
        self.state.read().await.pagination
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

    async fn patch_entry(&self, category: Category) {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
        {
            *existing = category.clone();
        }
        if state.current.as_ref().map(|c| c.id) == Some(category.id) {
            state.current = Some(category);
        }
    }

    pub async fn fetch_categories(&self, filters: Option<&CategoryFilters>) -> ApiResult<()> {
        self.begin().await;

        let query = {
            let mut state = self.state.write().await;
            if let Some(new_filters) = filters {
                if new_filters.search.is_some() {
                    state.filters.search = new_filters.search.clone();
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

        let result: ApiResult<Envelope<Page<Category>>> =
            self.transport.get_json("/categories", &query).await;
        self.finish(result.as_ref().err()).await;

        let page = result?.data;
        let mut state = self.state.write().await;
        state.categories = page.data;
        state.pagination = page.meta;
        Ok(())
    }

    pub async fn fetch_category(&self, id: i64) -> ApiResult<Category> {
        self.begin().await;
        let result: ApiResult<Envelope<Category>> = self
            .transport
            .get_json(&format!("/categories/{}", id), &[])
            .await;
        self.finish(result.as_ref().err()).await;

        let category = result?.data;
        self.state.write().await.current = Some(category.clone());
        Ok(category)
    }

    pub async fn create_category(&self, request: &CreateCategoryRequest) -> ApiResult<Category> {
        self.begin().await;
        let result: ApiResult<Envelope<Category>> = self
            .transport
            .post_json("/categories", Some(toko_api::transport::to_body(request)?))
            .await;
        self.finish(result.as_ref().err()).await;

        let category = result?.data;
        info!(category_id = category.id, "Category created");
        let mut state = self.state.write().await;
        state.categories.insert(0, category.clone());
        state.pagination.total += 1;
        Ok(category)
    }

    pub async fn update_category(
        &self,
        id: i64,
        request: &UpdateCategoryRequest,
    ) -> ApiResult<Category> {
        self.begin().await;
        let result: ApiResult<Envelope<Category>> = self
            .transport
            .put_json(
                &format!("/categories/{}", id),
                Some(toko_api::transport::to_body(request)?),
            )
            .await;
        self.finish(result.as_ref().err()).await;

        let category = result?.data;
        self.patch_entry(category.clone()).await;
        Ok(category)
    }

    pub async fn delete_category(&self, id: i64) -> ApiResult<()> {
        self.begin().await;
        let result = self.transport.delete(&format!("/categories/{}", id)).await;
        self.finish(result.as_ref().err()).await;
        result?;

        let mut state = self.state.write().await;
        state.categories.retain(|c| c.id != id);
        state.pagination.total = state.pagination.total.saturating_sub(1);
        if state.current.as_ref().map(|c| c.id) == Some(id) {
            state.current = None;
        }
        info!(category_id = id, "Category deleted");
        Ok(())
    }

    pub async fn restore_category(&self, id: i64) -> ApiResult<Category> {
        self.begin().await;
        let result: ApiResult<Envelope<Category>> = self
            .transport
            .post_json(&format!("/categories/{}/restore", id), None)
            .await;
        self.finish(result.as_ref().err()).await;

        let category = result?.data;
        self.patch_entry(category.clone()).await;
        info!(category_id = id, "Category restored");
        Ok(category)
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
    use crate::testing::{fixtures, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_crud_round() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/categories",
            Ok(json!({"data": fixtures::page_json(
                vec![fixtures::category_json(1)],
                1, 1, 1,
            )})),
        );
        mock.on(
            "POST",
            "/categories",
            Ok(json!({"data": fixtures::category_json(2)})),
        );
        mock.on("DELETE", "/categories/1", Ok(json!({"data": null})));

        let store = CategoriesStore::new(mock.clone());
        store.fetch_categories(None).await.unwrap();
        assert_eq!(store.categories().await.len(), 1);

        store
            .create_category(&CreateCategoryRequest {
                name: "Minuman".to_string(),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(store.categories().await.len(), 2);
        assert_eq!(store.categories().await[0].id, 2);

        store.delete_category(1).await.unwrap();
        assert_eq!(store.categories().await.len(), 1);
    }

    #[tokio::test]
    async fn test_restore_patches_entry() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/categories",
            Ok(json!({"data": fixtures::page_json(
                vec![fixtures::category_json(3)],
                1, 1, 1,
            )})),
        );

        let mut restored = fixtures::category_json(3);
        restored["name"] = json!("Makanan Ringan");
        mock.on(
            "POST",
            "/categories/3/restore",
            Ok(json!({"data": restored})),
        );

        let store = CategoriesStore::new(mock);
        store.fetch_categories(None).await.unwrap();
        store.restore_category(3).await.unwrap();

        assert_eq!(store.categories().await[0].name, "Makanan Ringan");
    }
}
