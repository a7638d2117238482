//! # Users Store (admin)

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use toko_api::{ApiError, ApiResult, Envelope, Page, PageMeta, Transport, TransportExt};
use toko_core::filters::UserFilters;
use toko_core::{CreateUserRequest, UpdateUserRequest, User};

#[derive(Default)]
struct UsersState {
    users: Vec<User>,
    current: Option<User>,
    pagination: PageMeta,
    filters: UserFilters,
    is_loading: bool,
    error: Option<String>,
}

pub struct UsersStore {
    transport: Arc<dyn Transport>,
    state: RwLock<UsersState>,
}

impl UsersStore {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(UsersStore {
            transport,
            state: RwLock::new(UsersState::default()),
        })
    }

    pub async fn users(&self) -> Vec<User> {
        self.state.read().await.users.clone()
    }

    pub async fn current(&self) -> Option<User> {
        self.state.read().await.current.clone()
    }

    pub async fn pagination(&self) -> PageMeta {
        self.state.read().await.pagination
    }

    pub async fn total_users(&self) -> u64 {
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

    async fn patch_entry(&self, user: User) {
        let mut state = self.state.write().await;
        if let Some(existing) = state.users.iter_mut().find(|u| u.id == user.id) {
            *existing = user.clone();
        }
        if state.current.as_ref().map(|u| u.id) == Some(user.id) {
            state.current = Some(user);
        }
    }

    /// Lists users; given filters merge into the stored ones.
    pub async fn fetch_users(&self, filters: Option<&UserFilters>) -> ApiResult<()> {
        self.begin().await;

        let query = {
            let mut state = self.state.write().await;
            if let Some(new_filters) = filters {
                if new_filters.search.is_some() {
                    state.filters.search = new_filters.search.clone();
                }
                if new_filters.role.is_some() {
                    state.filters.role = new_filters.role;
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

        let result: ApiResult<Envelope<Page<User>>> =
            self.transport.get_json("/users", &query).await;
        self.finish(result.as_ref().err()).await;

        let page = result?.data;
        let mut state = self.state.write().await;
        state.users = page.data;
        state.pagination = page.meta;
        Ok(())
    }

    pub async fn fetch_user(&self, id: i64) -> ApiResult<User> {
        self.begin().await;
        let result: ApiResult<Envelope<User>> =
            self.transport.get_json(&format!("/users/{}", id), &[]).await;
        self.finish(result.as_ref().err()).await;

        let user = result?.data;
        self.state.write().await.current = Some(user.clone());
        Ok(user)
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> ApiResult<User> {
        self.begin().await;
        let result: ApiResult<Envelope<User>> = self
            .transport
            .post_json("/users", Some(toko_api::transport::to_body(request)?))
            .await;
        self.finish(result.as_ref().err()).await;

        let user = result?.data;
        info!(user_id = user.id, "User created");
        let mut state = self.state.write().await;
        state.users.insert(0, user.clone());
        state.pagination.total += 1;
        Ok(user)
    }

    pub async fn update_user(&self, id: i64, request: &UpdateUserRequest) -> ApiResult<User> {
        self.begin().await;
        let result: ApiResult<Envelope<User>> = self
            .transport
            .put_json(
                &format!("/users/{}", id),
                Some(toko_api::transport::to_body(request)?),
            )
            .await;
        self.finish(result.as_ref().err()).await;

        let user = result?.data;
        self.patch_entry(user.clone()).await;
        Ok(user)
    }

    /// Soft-deletes a user and drops them from the local list.
    pub async fn delete_user(&self, id: i64) -> ApiResult<()> {
        self.begin().await;
        let result = self.transport.delete(&format!("/users/{}", id)).await;
        self.finish(result.as_ref().err()).await;
        result?;

        let mut state = self.state.write().await;
        state.users.retain(|u| u.id != id);
        state.pagination.total = state.pagination.total.saturating_sub(1);
        if state.current.as_ref().map(|u| u.id) == Some(id) {
            state.current = None;
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }

    pub async fn restore_user(&self, id: i64) -> ApiResult<User> {
        self.begin().await;
        let result: ApiResult<Envelope<User>> = self
            .transport
            .post_json(&format!("/users/{}/restore", id), None)
            .await;
        self.finish(result.as_ref().err()).await;

        let user = result?.data;
        self.patch_entry(user.clone()).await;
        info!(user_id = id, "User restored");
        Ok(user)
    }

    pub async fn clear_filters(&self) {
        self.state.write().await.filters = UserFilters::default();
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    pub async fn clear_current_user(&self) {
        self.state.write().await.current = None;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
