//! Everything a data consumer needs, bundled for explicit injection.

use std::sync::Arc;

use crate::config::Config;
use crate::data::{DataIntent, DataSlice, FetchRecord};
use crate::fetch::{DataSource, FetchError, FetchOutcome, Fetcher};
use crate::mvi::Reducer;
use crate::selector::DataView;
use crate::store::Store;

/// Store, fetcher and settings shared by every hook of one application.
///
/// Cloning is cheap; all clones talk to the same store and token table.
pub struct DataContext<R: Reducer, Q, P> {
    store: Store<R>,
    fetcher: Fetcher<Store<R>, Q, P>,
    config: Arc<Config>,
}

impl<R: Reducer, Q, P> Clone for DataContext<R, Q, P> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            fetcher: self.fetcher.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R: Reducer, Q, P> DataContext<R, Q, P> {
    pub fn store(&self) -> &Store<R> {
        &self.store
    }

    pub fn fetcher(&self) -> &Fetcher<Store<R>, Q, P> {
        &self.fetcher
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<R, Q, P> DataContext<R, Q, P>
where
    R: Reducer + 'static,
    R::State: DataSlice<Query = Q, Payload = P>,
    R::Intent: From<DataIntent<Q, P>>,
    Q: Clone + Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    pub fn new(store: Store<R>, config: Config) -> Self {
        let fetcher = Fetcher::new(store.clone());
        Self {
            store,
            fetcher,
            config: Arc::new(config),
        }
    }

    pub fn with_defaults(store: Store<R>) -> Self {
        Self::new(store, Config::default())
    }

    /// One fetch cycle outside of any hook.
    ///
    /// # Errors
    /// Returns [`FetchError::EmptyId`] for an empty identifier.
    pub async fn fetch<S>(&self, id: &str, query: Q, source: &S) -> Result<FetchOutcome, FetchError>
    where
        S: DataSource<Q, P> + ?Sized,
    {
        self.fetcher.fetch(id, query, source).await
    }

    pub fn destroy(&self, id: &str) {
        self.fetcher.destroy(id);
    }

    /// Current entry for `id`, shared with the store.
    pub fn record(&self, id: &str) -> Option<Arc<FetchRecord<Q, P>>> {
        self.store.select(|state| state.data().get(id).cloned())
    }

    pub fn view(&self, id: &str) -> DataView<P> {
        self.store
            .select(|state| DataView::from_record(state.data().get(id).map(Arc::as_ref)))
    }
}
