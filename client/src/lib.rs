//! Client-side state layer for the finance tracker.
//!
//! The pieces stack bottom-up:
//!
//! - [`transport`] — the HTTP call boundary: a [`Transport`] trait returning
//!   parsed JSON or a structured [`TransportError`], plus a reqwest-backed
//!   implementation.
//! - [`error`] — normalization of transport failures into the [`ApiError`]
//!   shape consumers render.
//! - [`state`] — the generic request-state container: one async operation,
//!   tracked through an idle/loading/success/error lifecycle.
//! - [`crud`] — paired list+item request states for a REST resource, with
//!   best-effort cross-updates after create/update/remove.
//! - [`categories`] / [`transactions`] — resource modules and the category
//!   store that UI code consumes directly.
//!
//! Nothing here serializes concurrent calls: if the same container is invoked
//! again while a request is in flight, both run and whichever resolves last
//! determines the stored state.

pub mod categories;
pub mod crud;
pub mod error;
pub mod state;
pub mod transactions;
pub mod transport;

pub use categories::{CategoriesApi, CategoryStore, CategoryStoreConfig};
pub use crud::CrudResource;
pub use error::{ApiError, TransportError};
pub use state::{ApiHandle, ApiOptions, RequestState, RequestTracker, Status};
pub use transactions::TransactionsApi;
pub use transport::{HttpTransport, Transport};

#[cfg(test)]
pub(crate) mod testutil;
