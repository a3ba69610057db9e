//! Observable state container.
//!
//! Holds the host application's state behind a lock and folds every intent
//! through a single [`Reducer`]. Readers either select from the current state
//! or subscribe to the revision counter to learn when it changed.

use std::mem;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::mvi::Reducer;

/// Anything intents of type `I` can be dispatched to.
///
/// The fetcher only talks to the store through this trait, so tests can
/// substitute a recording dispatcher.
pub trait Dispatch<I>: Send + Sync {
    fn dispatch(&self, intent: I);
}

/// Thread-safe store with a single reducer.
///
/// Reducer application happens under the write lock, so it is atomic with
/// respect to every [`Store::select`].
pub struct Store<R: Reducer> {
    inner: Arc<StoreInner<R::State>>,
}

struct StoreInner<S> {
    state: RwLock<S>,
    /// Bumped once per reduced intent.
    revision: watch::Sender<u64>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Reducer> Default for Store<R> {
    fn default() -> Self {
        Self::new(R::State::default())
    }
}

impl<R: Reducer> Store<R> {
    pub fn new(initial: R::State) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(initial),
                revision,
            }),
        }
    }

    /// Run `intent` through the reducer and store the result.
    pub fn dispatch(&self, intent: R::Intent) {
        let mut state = self.inner.state.write();
        *state = R::reduce(mem::take(&mut *state), intent);
        self.inner.revision.send_modify(|revision| *revision += 1);
        tracing::trace!(revision = *self.inner.revision.borrow(), "Intent reduced");
    }

    /// Read from the current state.
    pub fn select<T>(&self, selector: impl FnOnce(&R::State) -> T) -> T {
        selector(&self.inner.state.read())
    }

    /// Receiver that is notified after every dispatch.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Number of intents reduced so far.
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }
}

impl<R, I> Dispatch<I> for Store<R>
where
    R: Reducer,
    R::Intent: From<I>,
{
    fn dispatch(&self, intent: I) {
        Store::dispatch(self, R::Intent::from(intent));
    }
}
