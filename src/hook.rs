//! Declarative consumption of one data identifier.
//!
//! [`use_data`] is the entry point: it starts a fetch right away, and the
//! returned [`DataHook`] refetches when its identifier or query changes, on
//! an optional refresh interval, and on demand. Dropping the hook stops the
//! timer and discards any late resolution.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::context::DataContext;
use crate::data::{DataIntent, DataSlice, FetchRecord};
use crate::fetch::{DataSource, FetchError, FetchOutcome, Fetcher, RequestToken};
use crate::mvi::Reducer;
use crate::selector::DataView;
use crate::store::Store;

type IssuedToken = Arc<Mutex<Option<RequestToken>>>;

/// Options for [`use_data`].
pub struct UseDataOptions<Q, P> {
    /// Parameters passed to the source.
    pub query: Q,
    /// Refetch interval. Falls back to the context's configured default.
    pub refresh: Option<Duration>,
    pub source: Arc<dyn DataSource<Q, P>>,
}

impl<Q: Default, P> UseDataOptions<Q, P> {
    /// Options with an empty query and no explicit refresh interval.
    pub fn new(source: impl DataSource<Q, P>) -> Self {
        Self {
            query: Q::default(),
            refresh: None,
            source: Arc::new(source),
        }
    }
}

impl<Q, P> UseDataOptions<Q, P> {
    pub fn query(mut self, query: Q) -> Self {
        self.query = query;
        self
    }

    pub fn refresh(mut self, every: Duration) -> Self {
        self.refresh = Some(every);
        self
    }
}

/// Bind `id` to the store and fetch it with `options.source`.
///
/// `loading` is already in the store when this returns. Must be called from
/// within a Tokio runtime.
///
/// # Errors
/// Returns [`FetchError::EmptyId`] for an empty identifier.
pub fn use_data<R, Q, P>(
    ctx: &DataContext<R, Q, P>,
    id: &str,
    options: UseDataOptions<Q, P>,
) -> Result<DataHook<R, Q, P>, FetchError>
where
    R: Reducer + 'static,
    R::State: DataSlice<Query = Q, Payload = P>,
    R::Intent: From<DataIntent<Q, P>>,
    Q: Clone + PartialEq + Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    if id.is_empty() {
        return Err(FetchError::EmptyId);
    }

    let refresh = ctx.config().refresh.resolve(options.refresh);
    let mut hook = DataHook {
        ctx: ctx.clone(),
        id: id.to_string(),
        query: options.query,
        source: options.source,
        refresh,
        timer: None,
        issued: Arc::new(Mutex::new(None)),
        revisions: ctx.store().subscribe(),
        seen: None,
    };
    hook.trigger()?;
    Ok(hook)
}

/// A live binding between one identifier and the store.
pub struct DataHook<R: Reducer, Q, P> {
    ctx: DataContext<R, Q, P>,
    id: String,
    query: Q,
    source: Arc<dyn DataSource<Q, P>>,
    refresh: Option<Duration>,
    timer: Option<JoinHandle<()>>,
    /// Token of the latest fetch this hook started, shared with its timer.
    issued: IssuedToken,
    revisions: watch::Receiver<u64>,
    /// Entry as of the last render or change notification.
    seen: Option<Arc<FetchRecord<Q, P>>>,
}

impl<R, Q, P> DataHook<R, Q, P>
where
    R: Reducer + 'static,
    R::State: DataSlice<Query = Q, Payload = P>,
    R::Intent: From<DataIntent<Q, P>>,
    Q: Clone + PartialEq + Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Effective refresh interval, after defaults and the floor.
    pub fn refresh(&self) -> Option<Duration> {
        self.refresh
    }

    /// Per-render call. Refetches when `id` changed or `query` differs from
    /// the last requested one, then returns the current view.
    ///
    /// # Errors
    /// Returns [`FetchError::EmptyId`] for an empty identifier; the hook
    /// keeps its previous binding in that case.
    pub fn render(&mut self, id: &str, query: Q) -> Result<DataView<P>, FetchError> {
        let id_changed = self.id != id;
        if id_changed || self.query != query {
            if id.is_empty() {
                return Err(FetchError::EmptyId);
            }
            if id_changed {
                self.release();
                self.id = id.to_string();
            }
            self.query = query;
            self.trigger()?;
        }

        let current = self.ctx.record(&self.id);
        let view = DataView::from_record(current.as_deref());
        self.seen = current;
        Ok(view)
    }

    pub fn view(&self) -> DataView<P> {
        self.ctx.view(&self.id)
    }

    /// Wait until this identifier's entry differs from the last one observed,
    /// then return the new view.
    pub async fn changed(&mut self) -> DataView<P> {
        loop {
            self.revisions.borrow_and_update();
            let current = self.ctx.record(&self.id);
            if !same_record(current.as_ref(), self.seen.as_ref()) {
                let view = DataView::from_record(current.as_deref());
                self.seen = current;
                return view;
            }
            if self.revisions.changed().await.is_err() {
                return DataView::from_record(current.as_deref());
            }
        }
    }

    /// Refetch with the current query. The returned handle resolves once the
    /// result has been dispatched or discarded.
    ///
    /// # Errors
    /// Returns [`FetchError::EmptyId`] for an empty identifier.
    pub fn refetch(&self) -> Result<JoinHandle<FetchOutcome>, FetchError> {
        spawn_fetch(
            self.ctx.fetcher(),
            &self.id,
            self.query.clone(),
            &self.source,
            &self.issued,
        )
    }

    fn trigger(&mut self) -> Result<(), FetchError> {
        spawn_fetch(
            self.ctx.fetcher(),
            &self.id,
            self.query.clone(),
            &self.source,
            &self.issued,
        )?;
        self.seen = self.ctx.record(&self.id);
        self.restart_timer();
        Ok(())
    }

    fn restart_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let Some(every) = self.refresh else {
            return;
        };

        let fetcher = self.ctx.fetcher().clone();
        let id = self.id.clone();
        let query = self.query.clone();
        let source = Arc::clone(&self.source);
        let issued = Arc::clone(&self.issued);
        let behavior = self.ctx.config().refresh.missed_tick_behavior();

        self.timer = Some(tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + every, every);
            ticks.set_missed_tick_behavior(behavior);
            loop {
                ticks.tick().await;
                tracing::trace!(id = %id, "Refresh tick");
                if let Err(err) = spawn_fetch(&fetcher, &id, query.clone(), &source, &issued) {
                    tracing::warn!(id = %id, error = %err, "Refresh stopped");
                    break;
                }
            }
        }));
        tracing::debug!(id = %self.id, every_ms = every.as_millis() as u64, "Refresh timer started");
    }
}

impl<R: Reducer, Q, P> DataHook<R, Q, P> {
    /// Give up this hook's claim on its identifier. A fetch started by
    /// another consumer of the same identifier is left alone.
    fn release(&self) -> bool {
        let issued = self.issued.lock().take();
        issued.is_some_and(|token| self.ctx.fetcher().release(&self.id, token))
    }
}

impl<R: Reducer, Q, P> Drop for DataHook<R, Q, P> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let released = self.release();
        tracing::debug!(id = %self.id, released, "Data hook torn down");
    }
}

/// Dispatch `loading` now and settle the fetch on a background task.
fn spawn_fetch<R, Q, P>(
    fetcher: &Fetcher<Store<R>, Q, P>,
    id: &str,
    query: Q,
    source: &Arc<dyn DataSource<Q, P>>,
    issued: &Mutex<Option<RequestToken>>,
) -> Result<JoinHandle<FetchOutcome>, FetchError>
where
    R: Reducer + 'static,
    R::Intent: From<DataIntent<Q, P>>,
    Q: Clone + Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    let in_flight = fetcher.start(id, query)?;
    *issued.lock() = Some(in_flight.token());
    let pending = source.load(in_flight.query().clone());
    Ok(tokio::spawn(async move { in_flight.finish(pending.await) }))
}

fn same_record<T>(a: Option<&Arc<T>>, b: Option<&Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
