//! Collection-state container: paired list and item request states over one
//! REST resource.
//!
//! Mutations keep the loaded list in sync opportunistically — create appends,
//! update replaces the matching id, remove drops it — without re-fetching.
//! This is a best-effort convenience, not a transactional guarantee: the list
//! is only patched when it has already been loaded, and a patch that finds no
//! matching entry does nothing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};

use shared::{Identified, Paginated};

use crate::error::{ApiError, TransportError};
use crate::state::{RequestState, StateCell};
use crate::transport::{decode, encode, Transport};

/// List endpoints answer with either the paginated envelope or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Paginated(Paginated<T>),
    Plain(Vec<T>),
}

/// CRUD operations against `base_path`, tracking a list state and an item
/// state.
///
/// Paths follow the REST-framework convention: the base path carries a
/// trailing slash and item paths are `base{id}/`.
pub struct CrudResource<T> {
    transport: Arc<dyn Transport>,
    base_path: String,
    list: StateCell<Vec<T>>,
    item: StateCell<T>,
    total: Arc<Mutex<Option<u64>>>,
}

impl<T> Clone for CrudResource<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            base_path: self.base_path.clone(),
            list: self.list.clone(),
            item: self.item.clone(),
            total: Arc::clone(&self.total),
        }
    }
}

impl<T> CrudResource<T>
where
    T: DeserializeOwned + Identified + Clone,
{
    pub fn new(transport: Arc<dyn Transport>, base_path: impl Into<String>) -> Self {
        Self {
            transport,
            base_path: base_path.into(),
            list: StateCell::new(None),
            item: StateCell::new(None),
            total: Arc::new(Mutex::new(None)),
        }
    }

    fn item_path(&self, id: i64) -> String {
        format!("{}{}/", self.base_path, id)
    }

    /// GET the base path. A paginated envelope is unwrapped to its `results`;
    /// a bare array is taken as-is.
    pub async fn list(&self, params: &[(String, String)]) -> Result<Vec<T>, ApiError> {
        self.list.begin();
        let result = self
            .transport
            .get(&self.base_path, params)
            .await
            .and_then(|value| decode::<ListBody<T>>(value))
            .map_err(ApiError::from);
        match result {
            Ok(body) => {
                let (items, count) = match body {
                    ListBody::Paginated(page) => (page.results, page.count),
                    ListBody::Plain(items) => {
                        let count = items.len() as u64;
                        (items, count)
                    }
                };
                *self.total.lock().expect("count lock poisoned") = Some(count);
                self.list.succeed(items.clone());
                Ok(items)
            }
            Err(err) => {
                tracing::warn!(path = %self.base_path, error = %err, "list failed");
                self.list.fail(err.clone());
                Err(err)
            }
        }
    }

    /// GET `base{id}/` into the item state.
    pub async fn get(&self, id: i64) -> Result<T, ApiError> {
        self.item.begin();
        let result = self
            .transport
            .get(&self.item_path(id), &[])
            .await
            .and_then(decode::<T>)
            .map_err(ApiError::from);
        match result {
            Ok(item) => {
                self.item.succeed(item.clone());
                Ok(item)
            }
            Err(err) => {
                self.item.fail(err.clone());
                Err(err)
            }
        }
    }

    /// POST to the base path. The created item is appended to the list only
    /// when the list has already been loaded.
    pub async fn create(&self, data: &impl Serialize) -> Result<T, ApiError> {
        self.item.begin();
        let result = async {
            let body = encode(data)?;
            let value = self.transport.post(&self.base_path, body).await?;
            decode::<T>(value)
        }
        .await
        .map_err(ApiError::from);
        match result {
            Ok(item) => {
                self.item.succeed(item.clone());
                self.list.update_data(|list| {
                    if let Some(items) = list {
                        items.push(item.clone());
                    }
                });
                Ok(item)
            }
            Err(err) => {
                tracing::warn!(path = %self.base_path, error = %err, "create failed");
                self.item.fail(err.clone());
                Err(err)
            }
        }
    }

    /// PATCH `base{id}/`. The loaded list entry with a matching id is
    /// replaced in place, order preserved.
    pub async fn update(&self, id: i64, data: &impl Serialize) -> Result<T, ApiError> {
        self.item.begin();
        let result = async {
            let body = encode(data)?;
            let value = self.transport.patch(&self.item_path(id), body).await?;
            decode::<T>(value)
        }
        .await
        .map_err(ApiError::from);
        match result {
            Ok(item) => {
                self.item.succeed(item.clone());
                self.list.update_data(|list| {
                    if let Some(items) = list {
                        if let Some(slot) = items.iter_mut().find(|entry| entry.id() == item.id())
                        {
                            *slot = item.clone();
                        }
                    }
                });
                Ok(item)
            }
            Err(err) => {
                tracing::warn!(path = %self.base_path, error = %err, "update failed");
                self.item.fail(err.clone());
                Err(err)
            }
        }
    }

    /// DELETE `base{id}/`. Clears the item state's data and drops the entry
    /// from the loaded list.
    pub async fn remove(&self, id: i64) -> Result<(), ApiError> {
        self.item.begin();
        match self.transport.delete(&self.item_path(id)).await {
            Ok(()) => {
                self.item.succeed_empty();
                self.list.update_data(|list| {
                    if let Some(items) = list {
                        items.retain(|entry| entry.id() != id);
                    }
                });
                Ok(())
            }
            Err(err) => {
                let err = ApiError::from(err);
                tracing::warn!(path = %self.base_path, error = %err, "remove failed");
                self.item.fail(err.clone());
                Err(err)
            }
        }
    }

    pub fn list_state(&self) -> RequestState<Vec<T>> {
        self.list.snapshot()
    }

    pub fn item_state(&self) -> RequestState<T> {
        self.item.snapshot()
    }

    /// Total count from the last list response (envelope `count`, or the
    /// array length for bare-array responses).
    pub fn total_count(&self) -> Option<u64> {
        *self.total.lock().expect("count lock poisoned")
    }
}
