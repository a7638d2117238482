//! # Transactions Store (admin)
//!
//! Back-office view over all transactions: list with filters, detail,
//! status updates, and the cancel/refund side exits. The status adjacency
//! map gates what the UI offers; the server enforces the real rules.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::RwLock;
use tracing::info;

use toko_api::{ApiError, ApiResult, Envelope, Page, PageMeta, Transport, TransportExt};
use toko_core::filters::TransactionFilters;
use toko_core::{Transaction, TransactionStatus, UpdateTransactionRequest};

#[derive(Default)]
struct TransactionsState {
    transactions: Vec<Transaction>,
    current: Option<Transaction>,
    pagination: PageMeta,
    filters: TransactionFilters,
    is_loading: bool,
    error: Option<String>,
}

pub struct TransactionsStore {
    transport: Arc<dyn Transport>,
    state: RwLock<TransactionsState>,
}

impl TransactionsStore {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(TransactionsStore {
            transport,
            state: RwLock::new(TransactionsState::default()),
        })
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.read().await.transactions.clone()
    }

    pub async fn current(&self) -> Option<Transaction> {
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

    /// Statuses the UI may offer for a transaction, from the client-side
    /// mirror of the server's transition rules.
    pub async fn available_transitions(&self, id: i64) -> Vec<TransactionStatus> {
        self.state
            .read()
            .await
            .transactions
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.status.allowed_transitions().to_vec())
            .unwrap_or_default()
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

    async fn patch_entry(&self, transaction: Transaction) {
        let mut state = self.state.write().await;
        if let Some(existing) = state
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction.id)
        {
            *existing = transaction.clone();
        }
        if state.current.as_ref().map(|t| t.id) == Some(transaction.id) {
            state.current = Some(transaction);
        }
    }

    pub async fn fetch_transactions(
        &self,
        filters: Option<&TransactionFilters>,
    ) -> ApiResult<()> {
        self.begin().await;

        let query = {
            let mut state = self.state.write().await;
            if let Some(new_filters) = filters {
                if new_filters.status.is_some() {
                    state.filters.status = new_filters.status;
                }
                if new_filters.sort_by.is_some() {
                    state.filters.sort_by = new_filters.sort_by;
                }
                if new_filters.sort_order.is_some() {
                    state.filters.sort_order = new_filters.sort_order;
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

        let result: ApiResult<Envelope<Page<Transaction>>> =
            self.transport.get_json("/transactions", &query).await;
        self.finish(result.as_ref().err()).await;

        let page = result?.data;
        let mut state = self.state.write().await;
        state.transactions = page.data;
        state.pagination = page.meta;
        Ok(())
    }

    pub async fn fetch_transaction(&self, id: i64) -> ApiResult<Transaction> {
        self.begin().await;
        let result: ApiResult<Envelope<Transaction>> = self
            .transport
            .get_json(&format!("/transactions/{}", id), &[])
            .await;
        self.finish(result.as_ref().err()).await;

        let transaction = result?.data;
        self.state.write().await.current = Some(transaction.clone());
        Ok(transaction)
    }

    pub async fn update_transaction(
        &self,
        id: i64,
        request: &UpdateTransactionRequest,
    ) -> ApiResult<Transaction> {
        self.begin().await;
        let result: ApiResult<Envelope<Transaction>> = self
            .transport
            .put_json(
                &format!("/transactions/{}", id),
                Some(toko_api::transport::to_body(request)?),
            )
            .await;
        self.finish(result.as_ref().err()).await;

        let transaction = result?.data;
        info!(transaction_id = id, status = %transaction.status, "Transaction updated");
        self.patch_entry(transaction.clone()).await;
        Ok(transaction)
    }

    pub async fn cancel_transaction(
        &self,
        id: i64,
        reason: Option<&str>,
    ) -> ApiResult<Transaction> {
        self.begin().await;
        let result: ApiResult<Envelope<Transaction>> = self
            .transport
            .post_json(
                &format!("/transactions/{}/cancel", id),
                Some(json!({ "reason": reason })),
            )
            .await;
        self.finish(result.as_ref().err()).await;

        let transaction = result?.data;
        info!(transaction_id = id, "Transaction cancelled");
        self.patch_entry(transaction.clone()).await;
        Ok(transaction)
    }

    pub async fn refund_transaction(
        &self,
        id: i64,
        reason: Option<&str>,
    ) -> ApiResult<Transaction> {
        self.begin().await;
        let result: ApiResult<Envelope<Transaction>> = self
            .transport
            .post_json(
                &format!("/transactions/{}/refund", id),
                Some(json!({ "reason": reason })),
            )
            .await;
        self.finish(result.as_ref().err()).await;

        let transaction = result?.data;
        info!(transaction_id = id, "Transaction refunded");
        self.patch_entry(transaction.clone()).await;
        Ok(transaction)
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

    #[tokio::test]
    async fn test_fetch_and_available_transitions() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/transactions",
            Ok(json!({"data": fixtures::page_json(
                vec![
                    fixtures::transaction_json(1, "pending", 100_000),
                    fixtures::transaction_json(2, "cancelled", 50_000),
                ],
                1, 2, 1,
            )})),
        );

        let store = TransactionsStore::new(mock);
        store.fetch_transactions(None).await.unwrap();

        assert_eq!(
            store.available_transitions(1).await,
            vec![TransactionStatus::Processing, TransactionStatus::Cancelled]
        );
        assert!(store.available_transitions(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_patches_entry() {
        let mock = MockTransport::new();
        mock.on(
            "GET",
            "/transactions",
            Ok(json!({"data": fixtures::page_json(
                vec![fixtures::transaction_json(1, "pending", 100_000)],
                1, 1, 1,
            )})),
        );
        mock.on(
            "PUT",
            "/transactions/1",
            Ok(json!({"data": fixtures::transaction_json(1, "processing", 100_000)})),
        );

        let store = TransactionsStore::new(mock.clone());
        store.fetch_transactions(None).await.unwrap();
        store
            .update_transaction(
                1,
                &UpdateTransactionRequest {
                    status: TransactionStatus::Processing,
                    notes: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(
            store.transactions().await[0].status,
            TransactionStatus::Processing
        );
    }

    #[tokio::test]
    async fn test_cancel_sends_reason() {
        let mock = MockTransport::new();
        mock.on(
            "POST",
            "/transactions/1/cancel",
            Ok(json!({"data": fixtures::transaction_json(1, "cancelled", 100_000)})),
        );

        let store = TransactionsStore::new(mock.clone());
        let tx = store
            .cancel_transaction(1, Some("Stok habis"))
            .await
            .unwrap();

        assert_eq!(tx.status, TransactionStatus::Cancelled);
        let call = &mock.calls_to("POST", "/transactions/1/cancel")[0];
        assert_eq!(call.body.as_ref().unwrap()["reason"], "Stok habis");
    }
}
