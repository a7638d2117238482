//! Test support: an in-memory transport and wire fixtures.
//!
//! Stores are exercised against `MockTransport` exactly as they run
//! against `HttpTransport`; the mock records every call (method, path,
//! query, body) so tests can assert both state changes and wire traffic,
//! including call ordering.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use toko_api::transport::MultipartForm;
use toko_api::{ApiError, ApiResult, ErrorKind, Transport};

/// Installs a test subscriber once so `RUST_LOG=debug cargo test` shows
/// store tracing. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One request the mock saw, in arrival order.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

type RouteKey = (String, String);

pub struct MockTransport {
    token: RwLock<Option<String>>,
    responses: Mutex<HashMap<RouteKey, VecDeque<ApiResult<Value>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(MockTransport {
            token: RwLock::new(None),
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Queues a response for `method path`. Repeated `on` calls for the
    /// same route are served in order; the final one repeats forever.
    pub fn on(&self, method: &str, path: &str, response: ApiResult<Value>) {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back(response);
    }

    /// Every call the mock has seen, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls matching one route, in order.
    pub fn calls_to(&self, method: &str, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }

    /// Position of the first call to `method path`, if any.
    pub fn call_index(&self, method: &str, path: &str) -> Option<usize> {
        self.calls()
            .iter()
            .position(|c| c.method == method && c.path == path)
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    fn record(&self, method: &str, path: &str, query: &[(String, String)], body: Option<Value>) {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            path: path.to_string(),
            query: query.to_vec(),
            body,
        });
    }

    fn take(&self, method: &str, path: &str) -> ApiResult<Value> {
        let key = (method.to_string(), path.to_string());
        let mut map = self.responses.lock().unwrap();
        match map.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue.front().cloned().unwrap(),
            _ => Err(ApiError::new(
                ErrorKind::Unknown,
                0,
                format!("no mock response for {} {}", method, path),
            )),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> ApiResult<Value> {
        self.record("GET", path, query, None);
        self.take("GET", path)
    }

    async fn post(&self, path: &str, body: Option<Value>) -> ApiResult<Value> {
        self.record("POST", path, &[], body);
        self.take("POST", path)
    }

    async fn put(&self, path: &str, body: Option<Value>) -> ApiResult<Value> {
        self.record("PUT", path, &[], body);
        self.take("PUT", path)
    }

    async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.record("DELETE", path, &[], None);
        self.take("DELETE", path)
    }

    async fn post_multipart(&self, path: &str, form: MultipartForm) -> ApiResult<Value> {
        let fields: Value = form
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<serde_json::Map<String, Value>>()
            .into();
        let files: Vec<Value> = form
            .files
            .iter()
            .map(|f| json!({"name": f.name, "filename": f.filename}))
            .collect();
        self.record(
            "POST",
            path,
            &[],
            Some(json!({"multipart": {"fields": fields, "files": files}})),
        );
        self.take("POST", path)
    }

    async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }
}

// =============================================================================
// Wire Fixtures
// =============================================================================

pub mod fixtures {
    use serde_json::{json, Value};

    pub const TS: &str = "2024-05-01T08:00:00Z";

    pub fn user_json(id: i64, role: &str) -> Value {
        json!({
            "id": id,
            "name": "Siti Rahma",
            "email": "siti@example.com",
            "role": role,
            "created_at": TS,
            "updated_at": TS
        })
    }

    pub fn cart_item_json(id: i64, product_id: i64, price: i64, quantity: i64) -> Value {
        json!({
            "id": id,
            "product": {
                "id": product_id,
                "name": format!("Product {}", product_id),
                "price": format!("{}.00", price),
                "stock": 10,
                "image": null
            },
            "quantity": quantity,
            "total_price": format!("{}.00", price * quantity),
            "created_at": TS,
            "updated_at": TS
        })
    }

    pub fn cart_summary_json(items: Vec<Value>, total: i64) -> Value {
        let count = items.len();
        json!({
            "data": items,
            "total": format!("{}.00", total),
            "item_count": count
        })
    }

    pub fn product_json(id: i64, price: i64, stock: i64) -> Value {
        json!({
            "id": id,
            "name": format!("Product {}", id),
            "description": null,
            "price": format!("{}.00", price),
            "stock": stock,
            "category_id": null,
            "created_at": TS,
            "updated_at": TS
        })
    }

    pub fn category_json(id: i64) -> Value {
        json!({
            "id": id,
            "name": format!("Category {}", id),
            "description": null,
            "created_at": TS,
            "updated_at": TS
        })
    }

    pub fn transaction_json(id: i64, status: &str, total: i64) -> Value {
        json!({
            "id": id,
            "user_id": 1,
            "total_amount": format!("{}.00", total),
            "status": status,
            "notes": null,
            "items": [],
            "created_at": TS,
            "updated_at": TS
        })
    }

    pub fn page_json(data: Vec<Value>, current_page: u32, total: u64, last_page: u32) -> Value {
        json!({
            "data": data,
            "current_page": current_page,
            "per_page": 10,
            "total": total,
            "last_page": last_page
        })
    }
}
