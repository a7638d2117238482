//! # toko-api: HTTP Transport for the Toko Client
//!
//! This crate owns everything about talking to the REST API: the transport
//! trait and its reqwest implementation, the error taxonomy, the canonical
//! response envelopes, the bounded retry helper, and configuration.
//!
//! ## Modules
//!
//! - [`transport`] - `Transport` trait, `HttpTransport`, multipart forms
//! - [`error`] - `ApiError` with the network/auth/validation/api taxonomy
//! - [`envelope`] - `Envelope<T>` and the flat pagination `Page<T>`
//! - [`retry`] - bounded exponential-backoff retry for transient failures
//! - [`config`] - TOML + env configuration
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use toko_api::config::ClientConfig;
//! use toko_api::transport::{HttpTransport, Transport, TransportExt};
//!
//! # async fn run() -> Result<(), toko_api::ApiError> {
//! let config = ClientConfig::load_or_default(None);
//! let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config)?);
//!
//! let products: toko_api::Envelope<serde_json::Value> =
//!     transport.get_json("/products", &[]).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod retry;
pub mod transport;

pub use config::{ClientConfig, ConfigError};
pub use envelope::{Envelope, Page, PageMeta};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use retry::{retry_with_policy, RetryPolicy};
pub use transport::{FilePart, HttpTransport, MultipartForm, Transport, TransportExt};
