//! Generic request-state container.
//!
//! [`ApiHandle`] wraps one async operation and tracks it through the
//! idle → loading → success/error lifecycle, keeping the last result and the
//! last normalized error around for the UI to render. Handles are cheap to
//! clone and clones share state, so one can live in an event callback while
//! another drives rendering.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use crate::error::{ApiError, TransportError};

/// Lifecycle of a tracked request.
///
/// Transitions: `Idle`/`Success`/`Error` → `Loading` on invoke, then
/// `Loading` → `Success` on resolve or `Loading` → `Error` on reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Snapshot of a tracked request: last data, last error, lifecycle status.
///
/// `data` survives a failed call — an error never clears what was last
/// loaded successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<ApiError>,
    pub status: Status,
}

impl<T> RequestState<T> {
    fn idle(data: Option<T>) -> Self {
        Self {
            data,
            loading: false,
            error: None,
            status: Status::Idle,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self::idle(None)
    }
}

/// Shared cell holding one [`RequestState`].
///
/// The lock is only ever held for the duration of a field update, never
/// across an await point. Concurrent requests therefore interleave freely
/// and the last one to resolve wins.
#[derive(Debug)]
pub(crate) struct StateCell<T> {
    inner: Arc<Mutex<RequestState<T>>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> StateCell<T> {
    pub(crate) fn new(data: Option<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RequestState::idle(data))),
        }
    }

    pub(crate) fn snapshot(&self) -> RequestState<T> {
        self.inner.lock().expect("state lock poisoned").clone()
    }

    /// Enter the loading state: clears the error, keeps the data.
    pub(crate) fn begin(&self) {
        let mut state = self.inner.lock().expect("state lock poisoned");
        state.loading = true;
        state.error = None;
        state.status = Status::Loading;
    }

    pub(crate) fn succeed(&self, data: T) {
        self.finish(Some(data));
    }

    /// Successful completion that leaves no data behind (e.g. a delete).
    pub(crate) fn succeed_empty(&self) {
        self.finish(None);
    }

    fn finish(&self, data: Option<T>) {
        let mut state = self.inner.lock().expect("state lock poisoned");
        state.data = data;
        state.loading = false;
        state.error = None;
        state.status = Status::Success;
    }

    /// Failed completion: stores the error, leaves `data` untouched.
    pub(crate) fn fail(&self, error: ApiError) {
        let mut state = self.inner.lock().expect("state lock poisoned");
        state.loading = false;
        state.error = Some(error);
        state.status = Status::Error;
    }

    /// Overwrite `data` without touching loading/error/status.
    pub(crate) fn set_data(&self, data: Option<T>) {
        self.inner.lock().expect("state lock poisoned").data = data;
    }

    /// Mutate `data` in place without touching loading/error/status.
    pub(crate) fn update_data(&self, f: impl FnOnce(&mut Option<T>)) {
        f(&mut self.inner.lock().expect("state lock poisoned").data)
    }

    pub(crate) fn reset(&self, data: Option<T>) {
        *self.inner.lock().expect("state lock poisoned") = RequestState::idle(data);
    }
}

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;
type Transform<T> = Box<dyn Fn(T) -> T + Send + Sync>;
type BoxedOp<A, T> = Arc<
    dyn Fn(A) -> Pin<Box<dyn Future<Output = Result<T, TransportError>> + Send>> + Send + Sync,
>;

/// Configuration for an [`ApiHandle`].
pub struct ApiOptions<T> {
    /// Run the operation once with default arguments when [`ApiHandle::init`]
    /// is called.
    pub immediate: bool,
    /// Data the handle starts with and returns to on [`ApiHandle::reset`].
    pub initial_data: Option<T>,
    pub on_success: Option<Callback<T>>,
    pub on_error: Option<Callback<ApiError>>,
    /// Applied to every successful result before it is stored and returned.
    pub transform: Option<Transform<T>>,
}

impl<T> Default for ApiOptions<T> {
    fn default() -> Self {
        Self {
            immediate: false,
            initial_data: None,
            on_success: None,
            on_error: None,
            transform: None,
        }
    }
}

impl<T> ApiOptions<T> {
    pub fn immediate(mut self) -> Self {
        self.immediate = true;
        self
    }

    pub fn initial_data(mut self, data: T) -> Self {
        self.initial_data = Some(data);
        self
    }

    pub fn on_success(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&ApiError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn transform(mut self, f: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        self.transform = Some(Box::new(f));
        self
    }
}

/// Request-state container around a single async operation.
///
/// `A` is the operation's argument (use a tuple for several); `T` is the
/// result stored in state. Failures are normalized into [`ApiError`], stored,
/// and returned, so both the handle's state and the call site see them.
pub struct ApiHandle<A, T> {
    op: BoxedOp<A, T>,
    options: Arc<ApiOptions<T>>,
    cell: StateCell<T>,
}

impl<A, T> Clone for ApiHandle<A, T> {
    fn clone(&self) -> Self {
        Self {
            op: Arc::clone(&self.op),
            options: Arc::clone(&self.options),
            cell: self.cell.clone(),
        }
    }
}

impl<A, T> ApiHandle<A, T>
where
    T: Clone,
{
    pub fn new<F, Fut>(op: F, options: ApiOptions<T>) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, TransportError>> + Send + 'static,
    {
        let cell = StateCell::new(options.initial_data.clone());
        Self {
            op: Arc::new(move |args| Box::pin(op(args))),
            options: Arc::new(options),
            cell,
        }
    }

    /// Run the wrapped operation.
    ///
    /// Sets status to loading and clears the error, then on success applies
    /// the transform, stores the result, and fires `on_success`; on failure
    /// stores the normalized error (previous data untouched), fires
    /// `on_error`, and returns the error to the caller.
    pub async fn execute(&self, args: A) -> Result<T, ApiError> {
        self.cell.begin();
        match (self.op)(args).await {
            Ok(value) => {
                let value = match &self.options.transform {
                    Some(transform) => transform(value),
                    None => value,
                };
                self.cell.succeed(value.clone());
                if let Some(on_success) = &self.options.on_success {
                    on_success(&value);
                }
                Ok(value)
            }
            Err(err) => {
                let err = ApiError::from(err);
                tracing::warn!(error = %err, "request failed");
                self.cell.fail(err.clone());
                if let Some(on_error) = &self.options.on_error {
                    on_error(&err);
                }
                Err(err)
            }
        }
    }

    /// One-shot auto-load: runs the operation with default arguments when the
    /// handle was configured as `immediate`, otherwise does nothing.
    pub async fn init(&self) -> Result<Option<T>, ApiError>
    where
        A: Default,
    {
        if self.options.immediate {
            self.execute(A::default()).await.map(Some)
        } else {
            Ok(None)
        }
    }

    /// Restore `{data: initial_data, loading: false, error: None, status: Idle}`.
    pub fn reset(&self) {
        self.cell.reset(self.options.initial_data.clone());
    }

    /// Overwrite the stored data without touching loading/error/status.
    /// For externally-driven state sync.
    pub fn set_data(&self, data: T) {
        self.cell.set_data(Some(data));
    }

    pub fn state(&self) -> RequestState<T> {
        self.cell.snapshot()
    }
}

/// Loading/error tracker with no data of its own.
///
/// Feature stores keep their domain cache separately and delegate the
/// request lifecycle to one of these, so they introduce no error taxonomy of
/// their own.
#[derive(Clone, Debug)]
pub struct RequestTracker {
    cell: StateCell<()>,
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestTracker {
    pub fn new() -> Self {
        Self {
            cell: StateCell::new(None),
        }
    }

    /// Drive a future through the status machine, normalizing its error.
    pub async fn track<T>(
        &self,
        fut: impl Future<Output = Result<T, TransportError>>,
    ) -> Result<T, ApiError> {
        self.cell.begin();
        match fut.await {
            Ok(value) => {
                self.cell.succeed(());
                Ok(value)
            }
            Err(err) => {
                let err = ApiError::from(err);
                tracing::warn!(error = %err, "request failed");
                self.cell.fail(err.clone());
                Err(err)
            }
        }
    }

    pub fn loading(&self) -> bool {
        self.cell.snapshot().loading
    }

    pub fn status(&self) -> Status {
        self.cell.snapshot().status
    }

    pub fn error(&self) -> Option<ApiError> {
        self.cell.snapshot().error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn ok_op(value: i64) -> ApiHandle<(), i64> {
        ApiHandle::new(
            move |_| async move { Ok(value) },
            ApiOptions::default(),
        )
    }

    #[tokio::test]
    async fn successful_execute_stores_data_and_status() {
        let handle = ok_op(42);
        assert_eq!(handle.state().status, Status::Idle);

        let result = handle.execute(()).await.unwrap();
        assert_eq!(result, 42);

        let state = handle.state();
        assert_eq!(state.status, Status::Success);
        assert_eq!(state.data, Some(42));
        assert_eq!(state.error, None);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn failed_execute_keeps_previous_data() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let handle: ApiHandle<(), i64> = ApiHandle::new(
            move |_| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Ok(7)
                    } else {
                        Err(TransportError::Network {
                            message: "connection reset".to_string(),
                        })
                    }
                }
            },
            ApiOptions::default(),
        );

        handle.execute(()).await.unwrap();
        let err = handle.execute(()).await.unwrap_err();
        assert_eq!(err.message, "connection reset");
        assert_eq!(err.status, None);

        let state = handle.state();
        assert_eq!(state.status, Status::Error);
        assert_eq!(state.data, Some(7), "error must not clear previous data");
        assert_eq!(state.error, Some(err));
    }

    #[tokio::test]
    async fn transform_applies_before_store_and_return() {
        let handle: ApiHandle<(), i64> = ApiHandle::new(
            |_| async { Ok(10) },
            ApiOptions::default().transform(|v| v * 2),
        );
        assert_eq!(handle.execute(()).await.unwrap(), 20);
        assert_eq!(handle.state().data, Some(20));
    }

    #[tokio::test]
    async fn callbacks_fire_on_success_and_error() {
        let successes = Arc::new(AtomicUsize::new(0));
        let failures = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&successes);
        let f = Arc::clone(&failures);
        let flips = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&flips);
        let handle: ApiHandle<(), i64> = ApiHandle::new(
            move |_| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n % 2 == 0 {
                        Ok(1)
                    } else {
                        Err(TransportError::Local {
                            message: "boom".to_string(),
                        })
                    }
                }
            },
            ApiOptions::default()
                .on_success(move |_| {
                    s.fetch_add(1, Ordering::SeqCst);
                })
                .on_error(move |_| {
                    f.fetch_add(1, Ordering::SeqCst);
                }),
        );

        let _ = handle.execute(()).await;
        let _ = handle.execute(()).await;
        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(failures.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reset_restores_initial_data() {
        let handle: ApiHandle<(), i64> = ApiHandle::new(
            |_| async { Ok(99) },
            ApiOptions::default().initial_data(1),
        );
        assert_eq!(handle.state().data, Some(1));

        handle.execute(()).await.unwrap();
        assert_eq!(handle.state().data, Some(99));

        handle.reset();
        let state = handle.state();
        assert_eq!(state.data, Some(1));
        assert_eq!(state.status, Status::Idle);
        assert_eq!(state.error, None);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn set_data_leaves_status_untouched() {
        let handle = ok_op(5);
        handle.execute(()).await.unwrap();
        handle.set_data(123);

        let state = handle.state();
        assert_eq!(state.data, Some(123));
        assert_eq!(state.status, Status::Success);
    }

    #[tokio::test]
    async fn init_runs_only_when_immediate() {
        let handle: ApiHandle<(), i64> =
            ApiHandle::new(|_| async { Ok(3) }, ApiOptions::default().immediate());
        assert_eq!(handle.init().await.unwrap(), Some(3));

        let lazy = ok_op(3);
        assert_eq!(lazy.init().await.unwrap(), None);
        assert_eq!(lazy.state().status, Status::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_executes_last_resolved_wins() {
        // args = (delay, value); no sequencing, so the slower first call
        // overwrites the faster second call's result.
        let handle: ApiHandle<(u64, i64), i64> = ApiHandle::new(
            |(delay_ms, value)| async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(value)
            },
            ApiOptions::default(),
        );

        let slow = handle.execute((50, 1));
        let fast = handle.execute((10, 2));
        let (slow_result, fast_result) = tokio::join!(slow, fast);
        assert_eq!(slow_result.unwrap(), 1);
        assert_eq!(fast_result.unwrap(), 2);

        assert_eq!(handle.state().data, Some(1), "last resolved call wins");
    }

    #[tokio::test]
    async fn tracker_reports_lifecycle() {
        let tracker = RequestTracker::new();
        assert_eq!(tracker.status(), Status::Idle);

        let value = tracker.track(async { Ok::<_, TransportError>(5) }).await;
        assert_eq!(value.unwrap(), 5);
        assert_eq!(tracker.status(), Status::Success);

        let err = tracker
            .track(async {
                Err::<i64, _>(TransportError::Local {
                    message: "nope".to_string(),
                })
            })
            .await
            .unwrap_err();
        assert_eq!(tracker.status(), Status::Error);
        assert_eq!(tracker.error(), Some(err));
        assert!(!tracker.loading());
    }
}
