//! Async load-state controller.
//!
//! [`PageState`] tracks `{is_loading, error, data}` for one asynchronous
//! operation owned by a page. It is independent of routing.
//!
//! # Lifecycle
//!
//! ```text
//! mount()/refresh()/run(fut) ──► is_loading = true, error cleared
//!                                    │
//!                      ┌─────────────┴─────────────┐
//!                      ▼ Ok(v)                     ▼ Err(e)
//!              data = v, error = None      error = e, on_error(&e)
//!                      └─────────────┬─────────────┘        (data kept)
//!                                    ▼
//!                             is_loading = false
//! ```
//!
//! # Known limitation
//!
//! Operations are neither cancelled nor ordered. When two overlap, whichever
//! settles *last* wins, so a slow first call can overwrite a fast second
//! call's result, and the first settlement clears `is_loading` while the
//! other is still in flight.
//!
//! After [`PageState::unmount`] every settlement is ignored.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tracing::{debug, trace, warn};

/// Snapshot of a load operation.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadState<T, E> {
    pub is_loading: bool,
    pub error: Option<E>,
    pub data: Option<T>,
}

impl<T, E> LoadState<T, E> {
    fn initial(data: Option<T>) -> Self {
        Self {
            is_loading: false,
            error: None,
            data,
        }
    }
}

/// Produces the operation's future; called once per refresh.
pub type LoadingFn<T, E> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Called with each failure.
pub type ErrorHandler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Construction options for [`PageState`].
pub struct PageStateOptions<T, E> {
    loading_fn: Option<LoadingFn<T, E>>,
    initial_data: Option<T>,
    on_error: Option<ErrorHandler<E>>,
}

impl<T, E> Default for PageStateOptions<T, E> {
    fn default() -> Self {
        Self {
            loading_fn: None,
            initial_data: None,
            on_error: None,
        }
    }
}

impl<T, E> PageStateOptions<T, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operation run by [`PageState::refresh`].
    pub fn with_loading_fn<F, Fut>(mut self, loading_fn: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.loading_fn = Some(Arc::new(move || loading_fn().boxed()));
        self
    }

    /// Data visible before the first successful load.
    pub fn with_initial_data(mut self, data: T) -> Self {
        self.initial_data = Some(data);
        self
    }

    pub fn with_on_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(on_error));
        self
    }
}

struct Inner<T, E> {
    state: watch::Sender<LoadState<T, E>>,
    loading_fn: Option<LoadingFn<T, E>>,
    on_error: Option<ErrorHandler<E>>,
    mounted: AtomicBool,
}

/// Load-state controller for one page-owned operation.
///
/// Cheap to clone; clones share state, so a clone can be moved into a
/// spawned task.
pub struct PageState<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for PageState<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> std::fmt::Debug for PageState<T, E>
where
    T: std::fmt::Debug,
    E: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageState")
            .field("state", &*self.inner.state.borrow())
            .field("mounted", &self.inner.mounted.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl<T, E> PageState<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a mounted controller. Nothing runs until [`refresh`](Self::refresh)
    /// or [`run`](Self::run) is called; see [`mount`](Self::mount) to load
    /// on construction.
    pub fn new(options: PageStateOptions<T, E>) -> Self {
        let (state, _) = watch::channel(LoadState::initial(options.initial_data));
        Self {
            inner: Arc::new(Inner {
                state,
                loading_fn: options.loading_fn,
                on_error: options.on_error,
                mounted: AtomicBool::new(true),
            }),
        }
    }

    /// Create a controller and start the loading function right away.
    ///
    /// `is_loading` is already set when this returns. The load runs on the
    /// current tokio runtime; outside a runtime it stays idle until
    /// [`refresh`](Self::refresh), like [`new`](Self::new).
    pub fn mount(options: PageStateOptions<T, E>) -> Self {
        let state = Self::new(options);
        if state.inner.loading_fn.is_none() {
            return state;
        }
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("Page state mounted outside a runtime, initial load skipped");
                return state;
            }
        };

        state.start_loading();
        let loader = state.clone();
        handle.spawn(async move {
            loader.refresh().await;
        });
        debug!("Initial load started");
        state
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> LoadState<T, E> {
        self.inner.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<E> {
        self.inner.state.borrow().error.clone()
    }

    pub fn data(&self) -> Option<T> {
        self.inner.state.borrow().data.clone()
    }

    /// Receive a notification on every state change.
    pub fn subscribe(&self) -> watch::Receiver<LoadState<T, E>> {
        self.inner.state.subscribe()
    }

    /// Run the configured loading function, as on a dependency change.
    ///
    /// Returns `false` without touching state when no loading function was
    /// configured.
    pub async fn refresh(&self) -> bool {
        let Some(loading_fn) = self.inner.loading_fn.clone() else {
            return false;
        };
        self.run(loading_fn()).await;
        true
    }

    /// Drive `operation` through the load path.
    pub async fn run<F>(&self, operation: F)
    where
        F: Future<Output = Result<T, E>>,
    {
        self.update(|s| {
            s.is_loading = true;
            s.error = None;
        });

        match operation.await {
            Ok(data) => self.update(|s| {
                s.data = Some(data);
                s.error = None;
            }),
            Err(error) => {
                if self.is_mounted() {
                    self.update(|s| s.error = Some(error.clone()));
                    if let Some(on_error) = &self.inner.on_error {
                        on_error(&error);
                    }
                } else {
                    trace!("Dropping failure settled after unmount");
                }
            }
        }

        self.update(|s| s.is_loading = false);
    }

    /// Overwrite data without going through the load path.
    pub fn set_page_data(&self, data: T) {
        self.update(|s| s.data = Some(data));
    }

    pub fn reset_error(&self) {
        self.update(|s| s.error = None);
    }

    /// Force `is_loading` on, for multi-step flows.
    pub fn start_loading(&self) {
        self.update(|s| s.is_loading = true);
    }

    pub fn end_loading(&self) {
        self.update(|s| s.is_loading = false);
    }

    /// Tear down: later settlements and setters become no-ops.
    pub fn unmount(&self) {
        if self.inner.mounted.swap(false, Ordering::SeqCst) {
            debug!("Page state unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::SeqCst)
    }

    fn update(&self, modify: impl FnOnce(&mut LoadState<T, E>)) {
        if !self.is_mounted() {
            return;
        }
        self.inner.state.send_modify(modify);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[derive(Debug, Clone, PartialEq)]
    struct FetchError(String);

    #[tokio::test]
    async fn test_success_sets_data_and_clears_error() {
        let state = PageState::new(
            PageStateOptions::new().with_loading_fn(|| async { Ok::<_, FetchError>(42) }),
        );

        assert!(state.refresh().await);
        assert_eq!(
            state.snapshot(),
            LoadState {
                is_loading: false,
                error: None,
                data: Some(42),
            }
        );
    }

    #[tokio::test]
    async fn test_mount_loads_without_refresh() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let (release, gate) = oneshot::channel::<()>();
        let gate = Arc::new(parking_lot::Mutex::new(Some(gate)));
        let state = PageState::mount(PageStateOptions::new().with_loading_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let gate = gate.lock().take();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                Ok::<_, FetchError>(42)
            }
        }));

        assert!(state.is_loading());
        assert_eq!(state.data(), None);

        let mut changes = state.subscribe();
        release.send(()).unwrap();
        tokio::time::timeout(
            Duration::from_secs(1),
            changes.wait_for(|s| !s.is_loading && s.data.is_some()),
        )
        .await
        .expect("initial load should settle")
        .unwrap();

        assert_eq!(
            state.snapshot(),
            LoadState {
                is_loading: false,
                error: None,
                data: Some(42),
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mount_without_loading_fn_stays_idle() {
        let state = PageState::<u8, FetchError>::mount(PageStateOptions::new().with_initial_data(3));
        assert!(!state.is_loading());
        assert_eq!(state.data(), Some(3));
    }

    #[test]
    fn test_mount_outside_runtime_stays_idle() {
        let state = PageState::mount(
            PageStateOptions::new().with_loading_fn(|| async { Ok::<u8, FetchError>(1) }),
        );
        assert!(!state.is_loading());
        assert_eq!(state.data(), None);
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_data_and_calls_handler_once() {
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let state = PageState::new(
            PageStateOptions::new()
                .with_initial_data(7)
                .with_loading_fn(|| async { Err::<i32, _>(FetchError("offline".into())) })
                .with_on_error(move |e: &FetchError| recorder.lock().push(e.clone())),
        );

        state.refresh().await;

        assert_eq!(state.error(), Some(FetchError("offline".into())));
        assert_eq!(state.data(), Some(7));
        assert!(!state.is_loading());
        assert_eq!(*seen.lock(), vec![FetchError("offline".into())]);
    }

    #[tokio::test]
    async fn test_success_after_failure_keeps_last_good_data() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let state = PageState::new(PageStateOptions::new().with_loading_fn(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 1 {
                    Err(FetchError("flaky".into()))
                } else {
                    Ok(n)
                }
            }
        }));

        state.refresh().await;
        assert_eq!(state.data(), Some(0));

        state.refresh().await;
        assert_eq!(state.data(), Some(0));
        assert!(state.error().is_some());

        state.refresh().await;
        assert_eq!(state.data(), Some(2));
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_loading_fn_is_noop() {
        let state: PageState<String, FetchError> =
            PageState::new(PageStateOptions::new().with_initial_data("seed".to_string()));
        assert!(!state.refresh().await);
        assert_eq!(state.data().as_deref(), Some("seed"));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_is_loading_true_while_in_flight() {
        let state: PageState<u32, FetchError> = PageState::new(PageStateOptions::new());
        let (tx, rx) = oneshot::channel::<u32>();

        let runner = state.clone();
        let task = tokio::spawn(async move {
            runner
                .run(async move { rx.await.map_err(|e| FetchError(e.to_string())) })
                .await
        });

        let mut changes = state.subscribe();
        changes.wait_for(|s| s.is_loading).await.unwrap();
        assert!(state.is_loading());

        tx.send(5).unwrap();
        task.await.unwrap();
        assert!(!state.is_loading());
        assert_eq!(state.data(), Some(5));
    }

    #[tokio::test]
    async fn test_imperative_setters() {
        let state: PageState<&'static str, FetchError> = PageState::new(PageStateOptions::new());

        state.start_loading();
        assert!(state.is_loading());
        state.set_page_data("manual");
        state.end_loading();
        assert_eq!(state.data(), Some("manual"));
        assert!(!state.is_loading());

        state.run(async { Err::<&str, _>(FetchError("boom".into())) }).await;
        assert!(state.error().is_some());
        state.reset_error();
        assert!(state.error().is_none());
        assert_eq!(state.data(), Some("manual"));
    }

    #[tokio::test]
    async fn test_settlement_after_unmount_is_ignored() {
        let handled = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&handled);
        let state: PageState<u32, FetchError> = PageState::new(
            PageStateOptions::new()
                .with_initial_data(1)
                .with_on_error(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
        );

        let (tx, rx) = oneshot::channel::<Result<u32, FetchError>>();
        let runner = state.clone();
        let task = tokio::spawn(async move {
            runner
                .run(async move { rx.await.unwrap_or(Err(FetchError("dropped".into()))) })
                .await
        });

        let mut changes = state.subscribe();
        changes.wait_for(|s| s.is_loading).await.unwrap();
        state.unmount();

        tx.send(Err(FetchError("late".into()))).unwrap();
        task.await.unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.data, Some(1));
        assert!(snapshot.error.is_none());
        assert_eq!(handled.load(Ordering::SeqCst), 0);
    }

    /// Overlapping operations are last-settled-wins, not last-started-wins.
    /// This pins the existing behaviour; it is not a guarantee worth keeping.
    #[tokio::test]
    async fn test_overlapping_runs_last_settlement_wins() {
        let state: PageState<&'static str, FetchError> = PageState::new(PageStateOptions::new());

        let slow_first = state.run(async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok::<_, FetchError>("first (slow)")
        });
        let fast_second = state.run(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, FetchError>("second (fast)")
        });
        tokio::join!(slow_first, fast_second);

        assert_eq!(state.data(), Some("first (slow)"));
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_first_settlement_clears_loading_while_other_in_flight() {
        let state: PageState<u8, FetchError> = PageState::new(PageStateOptions::new());
        let (tx, rx) = oneshot::channel::<u8>();

        let slow = {
            let state = state.clone();
            tokio::spawn(async move {
                state
                    .run(async move { rx.await.map_err(|e| FetchError(e.to_string())) })
                    .await
            })
        };

        let mut changes = state.subscribe();
        changes.wait_for(|s| s.is_loading).await.unwrap();

        state.run(async { Ok::<u8, FetchError>(1) }).await;
        assert!(!state.is_loading());

        tx.send(2).unwrap();
        slow.await.unwrap();
        assert_eq!(state.data(), Some(2));
    }
}
