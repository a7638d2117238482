//! # Response Envelopes
//!
//! The canonical body shapes the API wraps every payload in.
//!
//! ## One Shape, Everywhere
//! Historical revisions of the API disagreed about where pagination meta
//! lived (top-level vs. nested under `pagination`). This client commits to
//! the FLAT shape and supports nothing else:
//!
//! ```text
//! {
//!   "data": {                        <- Envelope
//!     "data": [ ...entities... ],    <- Page
//!     "current_page": 1,
//!     "per_page": 10,
//!     "total": 42,
//!     "last_page": 5
//!   },
//!   "message": "optional"
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Standard `{ data, message }` wrapper around every 2xx body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Pagination metadata, flattened next to the page's `data` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub last_page: u32,
}

impl Default for PageMeta {
    fn default() -> Self {
        PageMeta {
            current_page: 1,
            per_page: toko_core::DEFAULT_PER_PAGE,
            total: 0,
            last_page: 1,
        }
    }
}

impl PageMeta {
    /// Whether another page follows the current one.
    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

// =============================================================================
// Unit Tests
// =============================================================================
