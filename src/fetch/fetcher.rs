//! Fetch orchestration with per-identifier request tokens.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::data::DataIntent;
use crate::store::Dispatch;

use super::error::FetchError;
use super::source::DataSource;

/// Opaque marker for the fetch that currently owns an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(Uuid);

impl RequestToken {
    fn issue() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// How a fetch cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// `complete` was dispatched.
    Complete,
    /// `error` was dispatched with this message.
    Failed(String),
    /// A newer fetch, a destroy, or a teardown took the identifier over;
    /// nothing was dispatched.
    Superseded,
}

type TokenTable = Arc<Mutex<HashMap<String, RequestToken>>>;

/// Drives loading → complete/error cycles and discards stale resolutions.
///
/// Every started fetch replaces the identifier's request token. A fetch only
/// dispatches its result if its token is still the registered one when the
/// source settles.
pub struct Fetcher<D, Q, P> {
    dispatcher: D,
    tokens: TokenTable,
    _intent: PhantomData<fn() -> (Q, P)>,
}

impl<D: Clone, Q, P> Clone for Fetcher<D, Q, P> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            tokens: Arc::clone(&self.tokens),
            _intent: PhantomData,
        }
    }
}

impl<D, Q, P> Fetcher<D, Q, P>
where
    D: Dispatch<DataIntent<Q, P>> + Clone,
    Q: Clone,
{
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher,
            tokens: Arc::new(Mutex::new(HashMap::new())),
            _intent: PhantomData,
        }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Synchronous half of a fetch: claim the identifier and dispatch
    /// `loading` before any source is invoked.
    ///
    /// # Errors
    /// Returns [`FetchError::EmptyId`] for an empty identifier.
    pub fn start(&self, id: &str, query: Q) -> Result<InFlight<D, Q, P>, FetchError> {
        if id.is_empty() {
            return Err(FetchError::EmptyId);
        }

        let token = RequestToken::issue();
        let mut tokens = self.tokens.lock();
        if let Some(previous) = tokens.insert(id.to_string(), token) {
            tracing::debug!(id = %id, superseded = %previous, "Fetch superseded by a newer request");
        }
        self.dispatcher
            .dispatch(DataIntent::loading(id, query.clone()));
        drop(tokens);

        tracing::debug!(id = %id, token = %token, "Fetch started");
        Ok(InFlight {
            fetcher: self.clone(),
            claim: Claim {
                tokens: Arc::clone(&self.tokens),
                id: id.to_string(),
                token,
            },
            query,
        })
    }

    /// Run one full fetch cycle and return once its final dispatch happened.
    ///
    /// # Errors
    /// Returns [`FetchError::EmptyId`] for an empty identifier. Source
    /// failures are reported as [`FetchOutcome::Failed`].
    pub async fn fetch<S>(&self, id: &str, query: Q, source: &S) -> Result<FetchOutcome, FetchError>
    where
        S: DataSource<Q, P> + ?Sized,
    {
        let in_flight = self.start(id, query)?;
        let pending = source.load(in_flight.query().clone());
        Ok(in_flight.finish(pending.await))
    }

    /// Evict `id` and make any in-flight fetch for it stale.
    pub fn destroy(&self, id: &str) {
        let mut tokens = self.tokens.lock();
        tokens.remove(id);
        self.dispatcher.dispatch(DataIntent::destroy(id));
        tracing::debug!(id = %id, "Data destroyed");
    }
}

impl<D, Q, P> Fetcher<D, Q, P> {
    /// Make any in-flight fetch for `id` stale without touching the registry.
    ///
    /// Returns `true` if a fetch was pending.
    pub fn supersede(&self, id: &str) -> bool {
        let pending = self.tokens.lock().remove(id).is_some();
        if pending {
            tracing::debug!(id = %id, "Pending fetch released");
        }
        pending
    }

    /// Drop `id`'s token only if it is still `token`.
    ///
    /// Returns `true` if the token was released. A newer fetch for `id`
    /// keeps its claim.
    pub fn release(&self, id: &str, token: RequestToken) -> bool {
        let released = release_token(&self.tokens, id, token);
        if released {
            tracing::debug!(id = %id, token = %token, "Pending fetch released");
        }
        released
    }

    /// Whether a fetch currently owns `id`.
    pub fn is_pending(&self, id: &str) -> bool {
        self.tokens.lock().contains_key(id)
    }
}

fn release_token(
    tokens: &Mutex<HashMap<String, RequestToken>>,
    id: &str,
    token: RequestToken,
) -> bool {
    let mut tokens = tokens.lock();
    if tokens.get(id) == Some(&token) {
        tokens.remove(id);
        true
    } else {
        false
    }
}

/// Ownership of an identifier by one fetch. Released on drop if the fetch
/// never settled.
struct Claim {
    tokens: TokenTable,
    id: String,
    token: RequestToken,
}

impl Drop for Claim {
    fn drop(&mut self) {
        if release_token(&self.tokens, &self.id, self.token) {
            tracing::debug!(id = %self.id, token = %self.token, "Fetch dropped before settling");
        }
    }
}

/// A started fetch waiting for its source to settle.
///
/// Dropping it unsettled releases the identifier, so an abandoned
/// [`Fetcher::fetch`] does not stay pending.
pub struct InFlight<D, Q, P> {
    fetcher: Fetcher<D, Q, P>,
    claim: Claim,
    query: Q,
}

impl<D, Q, P> InFlight<D, Q, P>
where
    D: Dispatch<DataIntent<Q, P>>,
{
    pub fn id(&self) -> &str {
        &self.claim.id
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn token(&self) -> RequestToken {
        self.claim.token
    }

    /// Dispatch the settled result, unless this fetch has been superseded.
    pub fn finish(self, result: anyhow::Result<P>) -> FetchOutcome {
        let InFlight {
            fetcher,
            claim,
            query,
        } = self;
        let id = claim.id.as_str();

        let mut tokens = fetcher.tokens.lock();
        if tokens.get(id) != Some(&claim.token) {
            tracing::debug!(id = %id, token = %claim.token, "Discarding stale resolution");
            return FetchOutcome::Superseded;
        }
        tokens.remove(id);

        let dispatcher = &fetcher.dispatcher;
        match result {
            Ok(data) => {
                dispatcher.dispatch(DataIntent::complete(id, query, data));
                tracing::debug!(id = %id, "Fetch complete");
                FetchOutcome::Complete
            }
            Err(err) => {
                let message = err.to_string();
                dispatcher.dispatch(DataIntent::error(id, &message));
                tracing::warn!(id = %id, error = %message, "Fetch failed");
                FetchOutcome::Failed(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataReducer, FetchStatus, Params};
    use crate::store::Store;

    type TestStore = Store<DataReducer<Params, u32>>;
    type TestFetcher = Fetcher<TestStore, Params, u32>;

    fn status(store: &TestStore, id: &str) -> Option<FetchStatus> {
        store.select(|registry| registry.get(id).map(|r| r.status()))
    }

    #[test]
    fn start_rejects_empty_id() {
        let fetcher = TestFetcher::new(TestStore::default());
        assert!(matches!(
            fetcher.start("", Params::new()),
            Err(FetchError::EmptyId)
        ));
    }

    #[test]
    fn start_dispatches_loading_immediately() {
        let store = TestStore::default();
        let fetcher = TestFetcher::new(store.clone());

        let in_flight = fetcher.start("users", Params::new()).unwrap();
        assert_eq!(status(&store, "users"), Some(FetchStatus::Loading));
        assert!(fetcher.is_pending("users"));
        assert_eq!(in_flight.id(), "users");
    }

    #[test]
    fn finish_releases_token() {
        let store = TestStore::default();
        let fetcher = TestFetcher::new(store.clone());

        let in_flight = fetcher.start("users", Params::new()).unwrap();
        assert_eq!(in_flight.finish(Ok(3)), FetchOutcome::Complete);
        assert!(!fetcher.is_pending("users"));
        assert_eq!(status(&store, "users"), Some(FetchStatus::Complete));
    }

    #[test]
    fn newer_start_supersedes_older() {
        let store = TestStore::default();
        let fetcher = TestFetcher::new(store.clone());

        let first = fetcher.start("users", Params::new()).unwrap();
        let second = fetcher.start("users", Params::new()).unwrap();
        assert_ne!(first.token(), second.token());

        assert_eq!(first.finish(Ok(1)), FetchOutcome::Superseded);
        assert_eq!(status(&store, "users"), Some(FetchStatus::Loading));

        assert_eq!(second.finish(Ok(2)), FetchOutcome::Complete);
        let data = store.select(|r| r.get("users").and_then(|r| r.data().cloned()));
        assert_eq!(data.as_deref(), Some(&2));
    }

    #[test]
    fn supersede_drops_late_failure() {
        let store = TestStore::default();
        let fetcher = TestFetcher::new(store.clone());

        let in_flight = fetcher.start("users", Params::new()).unwrap();
        assert!(fetcher.supersede("users"));
        assert!(!fetcher.supersede("users"));

        let outcome = in_flight.finish(Err(anyhow::anyhow!("boom")));
        assert_eq!(outcome, FetchOutcome::Superseded);
        assert_eq!(status(&store, "users"), Some(FetchStatus::Loading));
    }

    #[test]
    fn destroy_removes_entry_and_stales_fetch() {
        let store = TestStore::default();
        let fetcher = TestFetcher::new(store.clone());

        let in_flight = fetcher.start("users", Params::new()).unwrap();
        fetcher.destroy("users");
        assert_eq!(status(&store, "users"), None);

        assert_eq!(in_flight.finish(Ok(1)), FetchOutcome::Superseded);
        assert_eq!(status(&store, "users"), None);
    }

    #[test]
    fn release_keeps_newer_claim() {
        let fetcher = TestFetcher::new(TestStore::default());

        let first = fetcher.start("users", Params::new()).unwrap();
        let second = fetcher.start("users", Params::new()).unwrap();

        assert!(!fetcher.release("users", first.token()));
        assert!(fetcher.is_pending("users"));
        assert!(fetcher.release("users", second.token()));
        assert!(!fetcher.is_pending("users"));
    }

    #[test]
    fn dropping_unsettled_fetch_releases_id() {
        let store = TestStore::default();
        let fetcher = TestFetcher::new(store.clone());

        let in_flight = fetcher.start("users", Params::new()).unwrap();
        drop(in_flight);
        assert!(!fetcher.is_pending("users"));
        assert_eq!(status(&store, "users"), Some(FetchStatus::Loading));
    }

    #[test]
    fn dropping_stale_fetch_keeps_newer_claim() {
        let fetcher = TestFetcher::new(TestStore::default());

        let first = fetcher.start("users", Params::new()).unwrap();
        let _second = fetcher.start("users", Params::new()).unwrap();
        drop(first);
        assert!(fetcher.is_pending("users"));
    }

    #[tokio::test]
    async fn abandoned_fetch_is_not_left_pending() {
        let fetcher = TestFetcher::new(TestStore::default());
        let source = |_q: Params| futures::future::pending::<anyhow::Result<u32>>();

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            fetcher.fetch("users", Params::new(), &source),
        )
        .await;

        assert!(timed_out.is_err());
        assert!(!fetcher.is_pending("users"));
    }

    #[tokio::test]
    async fn fetch_reports_failure_message() {
        let store = TestStore::default();
        let fetcher = TestFetcher::new(store.clone());
        let source = |_q: Params| async { Err::<u32, _>(anyhow::anyhow!("boom")) };

        let outcome = fetcher.fetch("users", Params::new(), &source).await;
        assert_eq!(outcome, Ok(FetchOutcome::Failed("boom".into())));
        assert_eq!(status(&store, "users"), Some(FetchStatus::Error));
    }
}
