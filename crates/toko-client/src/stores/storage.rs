//! # Storage Store (admin)
//!
//! Admin file storage: paginated listing, multipart uploads, soft delete
//! and restore.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use toko_api::transport::{FilePart, MultipartForm};
use toko_api::{ApiError, ApiResult, Envelope, Page, PageMeta, Transport, TransportExt};
use toko_core::filters::StorageFilters;
use toko_core::{FileUploadRequest, StorageFile};

#[derive(Default)]
struct StorageState {
    files: Vec<StorageFile>,
    current: Option<StorageFile>,
    pagination: PageMeta,
    filters: StorageFilters,
    is_loading: bool,
    is_uploading: bool,
    error: Option<String>,
}

pub struct StorageStore {
    transport: Arc<dyn Transport>,
    state: RwLock<StorageState>,
}

impl StorageStore {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(StorageStore {
            transport,
            state: RwLock::new(StorageState::default()),
        })
    }

    pub async fn files(&self) -> Vec<StorageFile> {
        self.state.read().await.files.clone()
    }

    pub async fn current(&self) -> Option<StorageFile> {
        self.state.read().await.current.clone()
    }

    pub async fn pagination(&self) -> PageMeta {
        self.state.read().await.pagination
    }

    pub async fn total_files(&self) -> u64 {
        self.state.read().await.pagination.total
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn is_uploading(&self) -> bool {
        self.state.read().await.is_uploading
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

    pub async fn fetch_files(&self, filters: Option<&StorageFilters>) -> ApiResult<()> {
        self.begin().await;

        let query = {
            let mut state = self.state.write().await;
            if let Some(new_filters) = filters {
                if new_filters.search.is_some() {
                    state.filters.search = new_filters.search.clone();
                }
                if new_filters.category.is_some() {
                    state.filters.category = new_filters.category.clone();
                }
                if new_filters.mime_type.is_some() {
                    state.filters.mime_type = new_filters.mime_type.clone();
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

        let result: ApiResult<Envelope<Page<StorageFile>>> =
            self.transport.get_json("/storage", &query).await;
        self.finish(result.as_ref().err()).await;

        let page = result?.data;
        let mut state = self.state.write().await;
        state.files = page.data;
        state.pagination = page.meta;
        Ok(())
    }

    pub async fn fetch_file(&self, id: i64) -> ApiResult<StorageFile> {
        self.begin().await;
        let result: ApiResult<Envelope<StorageFile>> = self
            .transport
            .get_json(&format!("/storage/{}", id), &[])
            .await;
        self.finish(result.as_ref().err()).await;

        let file = result?.data;
        self.state.write().await.current = Some(file.clone());
        Ok(file)
    }

    /// Uploads a file as multipart form data.
    pub async fn upload_file(&self, request: &FileUploadRequest) -> ApiResult<StorageFile> {
        {
            let mut state = self.state.write().await;
            state.is_uploading = true;
            state.error = None;
        }

        let mut form = MultipartForm::new().file(FilePart {
            name: "file".to_string(),
            filename: request.filename.clone(),
            content_type: request.content_type.clone(),
            bytes: request.bytes.clone(),
        });
        if let Some(category) = &request.category {
            form = form.text("category", category.clone());
        }

        let result: ApiResult<Envelope<StorageFile>> =
            self.transport.post_multipart_json("/storage", form).await;

        let mut state = self.state.write().await;
        state.is_uploading = false;
        match result {
            Ok(envelope) => {
                let file = envelope.data;
                info!(file_id = file.id, filename = %file.filename, "File uploaded");
                state.files.insert(0, file.clone());
                state.pagination.total += 1;
                Ok(file)
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn delete_file(&self, id: i64) -> ApiResult<()> {
        self.begin().await;
        let result = self.transport.delete(&format!("/storage/{}", id)).await;
        self.finish(result.as_ref().err()).await;
        result?;

        let mut state = self.state.write().await;
        state.files.retain(|f| f.id != id);
        state.pagination.total = state.pagination.total.saturating_sub(1);
        if state.current.as_ref().map(|f| f.id) == Some(id) {
            state.current = None;
        }
        info!(file_id = id, "File deleted");
        Ok(())
    }

    pub async fn restore_file(&self, id: i64) -> ApiResult<StorageFile> {
        self.begin().await;
        let result: ApiResult<Envelope<StorageFile>> = self
            .transport
            .post_json(&format!("/storage/{}/restore", id), None)
            .await;
        self.finish(result.as_ref().err()).await;

        let file = result?.data;
        let mut state = self.state.write().await;
        if let Some(existing) = state.files.iter_mut().find(|f| f.id == file.id) {
            *existing = file.clone();
        }
        info!(file_id = id, "File restored");
        Ok(file)
    }

    pub async fn clear_filters(&self) {
        self.state.write().await.filters = StorageFilters::default();
    }

    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
