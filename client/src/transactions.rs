//! Transaction resource over the CRUD container.

use std::sync::Arc;

use shared::{Transaction, TransactionCreate, TransactionFilters, TransactionUpdate};

use crate::crud::CrudResource;
use crate::error::ApiError;
use crate::state::RequestState;
use crate::transport::Transport;

const BASE: &str = "/api/transactions/";

/// Typed CRUD operations for transactions, delegating state tracking and
/// list/item cross-updates to [`CrudResource`].
#[derive(Clone)]
pub struct TransactionsApi {
    resource: CrudResource<Transaction>,
}

impl TransactionsApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            resource: CrudResource::new(transport, BASE),
        }
    }

    pub async fn list(&self, filters: &TransactionFilters) -> Result<Vec<Transaction>, ApiError> {
        self.resource.list(&filters.to_query()).await
    }

    pub async fn get(&self, id: i64) -> Result<Transaction, ApiError> {
        self.resource.get(id).await
    }

    pub async fn create(&self, data: &TransactionCreate) -> Result<Transaction, ApiError> {
        self.resource.create(data).await
    }

    pub async fn update(&self, id: i64, data: &TransactionUpdate) -> Result<Transaction, ApiError> {
        self.resource.update(id, data).await
    }

    pub async fn remove(&self, id: i64) -> Result<(), ApiError> {
        self.resource.remove(id).await
    }

    pub fn list_state(&self) -> RequestState<Vec<Transaction>> {
        self.resource.list_state()
    }

    pub fn item_state(&self) -> RequestState<Transaction> {
        self.resource.item_state()
    }

    pub fn total_count(&self) -> Option<u64> {
        self.resource.total_count()
    }
}
