//! # Products Store
//!
//! Catalog cache used by both the storefront (browsing, filters) and the
//! admin product manager (create/update/soft-delete/restore).
//!
//! List mutations patch the matching local entry from the server response
//! instead of refetching the whole list; entries are keyed by
//! server-assigned id.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use toko_api::transport::{FilePart, MultipartForm};
use toko_api::{ApiError, ApiResult, Envelope, Page, PageMeta, Transport, TransportExt};
use toko_core::filters::ProductFilters;
use toko_core::{CreateProductRequest, Product, UpdateProductRequest};

#[derive(Default)]
struct ProductsState {
    products: Vec<Product>,
    current: Option<Product>,
    pagination: PageMeta,
    filters: ProductFilters,
    is_loading: bool,
    error: Option<String>,
}

pub struct ProductsStore {
    transport: Arc<dyn Transport>,
    state: RwLock<ProductsState>,
}

impl ProductsStore {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(ProductsStore {
            transport,
            state: RwLock::new(ProductsState::default()),
        })
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub async fn products(&self) -> Vec<Product> {
        self.state.read().await.products.clone()
    }

    pub async fn current(&self) -> Option<Product> {
        self.state.read().await.current.clone()
    }

    pub async fn pagination(&self) -> PageMeta {
        self.state.read().await.pagination
    }

    pub async fn has_products(&self) -> bool {
        !self.state.read().await.products.is_empty()
    }

    pub async fn total_products(&self) -> u64 {
        self.state.read().await.pagination.total
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
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

    async fn patch_entry(&self, product: Product) {
        let mut state = self.state.write().await;
        if let Some(existing) = state.products.iter_mut().find(|p| p.id == product.id) {
            *existing = product.clone();
        }
        if state.current.as_ref().map(|p| p.id) == Some(product.id) {
            state.current = Some(product);
        }
    }

    fn multipart_for_create(request: &CreateProductRequest) -> MultipartForm {
        let mut form = MultipartForm::new()
            .text("name", request.name.clone())
            .text("price", request.price.rupiah().to_string())
            .text("stock", request.stock.to_string());
        if let Some(description) = &request.description {
            form = form.text("description", description.clone());
        }
        if let Some(category_id) = request.category_id {
            form = form.text("category_id", category_id.to_string());
        }
        for (index, image) in request.images.iter().enumerate() {
            form = form.file(FilePart {
                name: format!("images[{}]", index),
                filename: image.filename.clone(),
                content_type: image.content_type.clone(),
                bytes: image.bytes.clone(),
            });
        }
        form
    }

    fn multipart_for_update(request: &UpdateProductRequest) -> MultipartForm {
        let mut form = MultipartForm::new();
        if let Some(name) = &request.name {
            form = form.text("name", name.clone());
        }
        if let Some(description) = &request.description {
            form = form.text("description", description.clone());
        }
        if let Some(price) = request.price {
            form = form.text("price", price.rupiah().to_string());
        }
        if let Some(stock) = request.stock {
            form = form.text("stock", stock.to_string());
        }
        if let Some(category_id) = request.category_id {
            form = form.text("category_id", category_id.to_string());
        }
        for (index, image) in request.images.iter().enumerate() {
            form = form.file(FilePart {
                name: format!("images[{}]", index),
                filename: image.filename.clone(),
                content_type: image.content_type.clone(),
                bytes: image.bytes.clone(),
            });
        }
        form
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Lists products. Given filters are merged into the stored ones so a
    /// screen can refine search/category/page independently.
    pub async fn fetch_products(&self, filters: Option<&ProductFilters>) -> ApiResult<()> {
        self.begin().await;

        let query = {
            let mut state = self.state.write().await;
            if let Some(new_filters) = filters {
                state.filters.merge(new_filters);
            }
            state.filters.to_query()
        };

        let result: ApiResult<Envelope<Page<Product>>> =
            self.transport.get_json("/products", &query).await;
        self.finish(result.as_ref().err()).await;

        let page = result?.data;
        let mut state = self.state.write().await;
        state.products = page.data;
        state.pagination = page.meta;
        debug!(count = state.products.len(), "products fetched");
        Ok(())
    }

    pub async fn fetch_product(&self, id: i64) -> ApiResult<Product> {
        self.begin().await;
        let result: ApiResult<Envelope<Product>> = self
            .transport
            .get_json(&format!("/products/{}", id), &[])
            .await;
        self.finish(result.as_ref().err()).await;

        let product = result?.data;
        self.state.write().await.current = Some(product.clone());
        Ok(product)
    }

    /// Creates a product. Always multipart: the payload may carry images.
    pub async fn create_product(&self, request: &CreateProductRequest) -> ApiResult<Product> {
        self.begin().await;
        let result: ApiResult<Envelope<Product>> = self
            .transport
            .post_multipart_json("/products", Self::multipart_for_create(request))
            .await;
        self.finish(result.as_ref().err()).await;

        let product = result?.data;
        info!(product_id = product.id, "Product created");
        let mut state = self.state.write().await;
        state.products.insert(0, product.clone());
        state.pagination.total += 1;
        Ok(product)
    }

    /// Updates a product. Image-carrying updates go out as multipart with
    /// a method override; plain field updates are a JSON PUT.
    pub async fn update_product(
        &self,
        id: i64,
        request: &UpdateProductRequest,
    ) -> ApiResult<Product> {
        self.begin().await;
        let result: ApiResult<Envelope<Product>> = if request.images.is_empty() {
            self.transport
                .put_json(
                    &format!("/products/{}", id),
                    Some(toko_api::transport::to_body(request)?),
                )
                .await
        } else {
            self.transport
                .post_multipart_json(
                    &format!("/products/{}?_method=PUT", id),
                    Self::multipart_for_update(request),
                )
                .await
        };
        self.finish(result.as_ref().err()).await;

        let product = result?.data;
        self.patch_entry(product.clone()).await;
        Ok(product)
    }

    /// Soft-deletes a product and drops it from the local list.
    pub async fn delete_product(&self, id: i64) -> ApiResult<()> {
        self.begin().await;
        let result = self.transport.delete(&format!("/products/{}", id)).await;
        self.finish(result.as_ref().err()).await;
        result?;

        let mut state = self.state.write().await;
        state.products.retain(|p| p.id != id);
        state.pagination.total = state.pagination.total.saturating_sub(1);
        if state.current.as_ref().map(|p| p.id) == Some(id) {
            state.current = None;
        }
        info!(product_id = id, "Product deleted");
        Ok(())
    }

    pub async fn restore_product(&self, id: i64) -> ApiResult<Product> {
        self.begin().await;
        let result: ApiResult<Envelope<Product>> = self
            .transport
            .post_json(&format!("/products/{}/restore", id), None)
            .await;
        self.finish(result.as_ref().err()).await;

        let product = result?.data;
        self.patch_entry(product.clone()).await;
        info!(product_id = id, "Product restored");
        Ok(product)
    }

    /// Patches a product's stock locally (used after order cancellation
    /// refreshes individual products).
    pub async fn update_stock(&self, id: i64, stock: i64) {
        let mut state = self.state.write().await;
        if let Some(product) = state.products.iter_mut().find(|p| p.id == id) {
            product.stock = stock;
        }
        if let Some(current) = state.current.as_mut() {
            if current.id == id {
                current.stock = stock;
            }
        }
    }

    pub async fn set_filters(&self, filters: &ProductFilters) {
        self.state.write().await.filters.merge(filters);
    }

    pub async fn clear_filters(&self) {
        self.state.write().await.filters = ProductFilters::default();
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
    async fn test_fetch_products_fills_list_and_pagination() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/products",
            Ok(json!({"data": fixtures::page_json(
                vec![fixtures::product_json(1, 50_000, 10), fixtures::product_json(2, 25_000, 3)],
                1, 2, 1,
            )})),
        );

        let store = ProductsStore::new(mock.clone());
        store.fetch_products(None).await.unwrap();

        assert_eq!(store.products().await.len(), 2);
        assert_eq!(store.total_products().await, 2);
    }

    #[tokio::test]
    async fn test_fetch_products_merges_filters() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/products",
            Ok(json!({"data": fixtures::page_json(vec![], 1, 0, 1)})),
        );

        let store = ProductsStore::new(mock.clone());
        store
            .fetch_products(Some(&ProductFilters {
                search: Some("kopi".to_string()),
                ..ProductFilters::default()
            }))
            .await
            .unwrap();
        store
            .fetch_products(Some(&ProductFilters {
                page: Some(2),
                ..ProductFilters::default()
            }))
            .await
            .unwrap();

        let calls = mock.calls_to("GET", "/products");
        let last = &calls[1];
        assert!(last.query.iter().any(|(k, v)| k == "search" && v == "kopi"));
        assert!(last.query.iter().any(|(k, v)| k == "page" && v == "2"));
    }

    #[tokio::test]
    async fn test_update_without_images_is_json_put() {
        let mock = MockTransport::new();
        mock.on(
            "PUT",
            "/products/1",
            Ok(json!({"data": fixtures::product_json(1, 60_000, 10)})),
        );

        let store = ProductsStore::new(mock.clone());
        let updated = store
            .update_product(
                1,
                &UpdateProductRequest {
                    price: Some(toko_core::Money::from_rupiah(60_000)),
                    ..UpdateProductRequest::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price.rupiah(), 60_000);
        assert_eq!(mock.calls_to("PUT", "/products/1").len(), 1);
    }

    #[tokio::test]
    async fn test_update_with_images_is_multipart_override() {
        let mock = MockTransport::new();
        mock.on(
            "POST",
            "/products/1?_method=PUT",
            Ok(json!({"data": fixtures::product_json(1, 50_000, 10)})),
        );

        let store = ProductsStore::new(mock.clone());
        store
            .update_product(
                1,
                &UpdateProductRequest {
                    images: vec![toko_core::ImageUpload {
                        filename: "kopi.jpg".to_string(),
                        content_type: "image/jpeg".to_string(),
                        bytes: vec![0xFF, 0xD8],
                    }],
                    ..UpdateProductRequest::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(mock.calls_to("POST", "/products/1?_method=PUT").len(), 1);
        assert!(mock.calls_to("PUT", "/products/1").is_empty());
    }

    #[tokio::test]
    async fn test_create_unshifts_and_bumps_total() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/products",
            Ok(json!({"data": fixtures::page_json(
                vec![fixtures::product_json(1, 50_000, 10)],
                1, 1, 1,
            )})),
        );
        mock.on(
            "POST",
            "/products",
            Ok(json!({"data": fixtures::product_json(2, 75_000, 5)})),
        );

        let store = ProductsStore::new(mock.clone());
        store.fetch_products(None).await.unwrap();
        store
            .create_product(&CreateProductRequest {
                name: "Teh Melati".to_string(),
                price: toko_core::Money::from_rupiah(75_000),
                stock: 5,
                ..CreateProductRequest::default()
            })
            .await
            .unwrap();

        let products = store.products().await;
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, 2, "new product goes to the front");
        assert_eq!(store.total_products().await, 2);
    }

    #[tokio::test]
    async fn test_delete_drops_entry_and_total() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/products",
            Ok(json!({"data": fixtures::page_json(
                vec![fixtures::product_json(1, 50_000, 10)],
                1, 1, 1,
            )})),
        );
        mock.on("DELETE", "/products/1", Ok(json!({"data": null})));

        let store = ProductsStore::new(mock.clone());
        store.fetch_products(None).await.unwrap();
        store.delete_product(1).await.unwrap();

        assert!(store.products().await.is_empty());
        assert_eq!(store.total_products().await, 0);
    }

    #[tokio::test]
    async fn test_update_stock_patches_locally() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/products",
            Ok(json!({"data": fixtures::page_json(
                vec![fixtures::product_json(1, 50_000, 10)],
                1, 1, 1,
            )})),
        );

        let store = ProductsStore::new(mock.clone());
        store.fetch_products(None).await.unwrap();
        store.update_stock(1, 99).await;

        assert_eq!(store.products().await[0].stock, 99);
        assert_eq!(mock.calls().len(), 1, "no extra request for local patch");
    }
}
