//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use fetchstore::config::Config;
use fetchstore::data::IntentKind;
use fetchstore::{DataContext, DataIntent, DataReducer, DataSource, Dispatch, Params, Store};
use parking_lot::Mutex;
use tokio::sync::oneshot;

pub type TestReducer = DataReducer<Params, u32>;
pub type TestStore = Store<TestReducer>;
pub type TestContext = DataContext<TestReducer, Params, u32>;

/// Context over a fresh store with default settings.
pub fn test_context() -> TestContext {
    DataContext::with_defaults(TestStore::default())
}

/// Query with a single `key` entry.
pub fn query(key: &str, value: impl Into<serde_json::Value>) -> Params {
    let mut params = Params::new();
    params.insert(key.to_string(), value.into());
    params
}

/// Dispatcher that records every intent instead of reducing it.
pub struct RecordingDispatcher<Q, P> {
    intents: Arc<Mutex<Vec<DataIntent<Q, P>>>>,
}

impl<Q, P> Default for RecordingDispatcher<Q, P> {
    fn default() -> Self {
        Self {
            intents: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<Q, P> Clone for RecordingDispatcher<Q, P> {
    fn clone(&self) -> Self {
        Self {
            intents: Arc::clone(&self.intents),
        }
    }
}

impl<Q: Clone, P: Clone> RecordingDispatcher<Q, P> {
    pub fn intents(&self) -> Vec<DataIntent<Q, P>> {
        self.intents.lock().clone()
    }
}

impl<Q, P> RecordingDispatcher<Q, P> {
    pub fn kinds(&self) -> Vec<IntentKind> {
        self.intents.lock().iter().map(DataIntent::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.intents.lock().len()
    }
}

impl<Q: Send, P: Send> Dispatch<DataIntent<Q, P>> for RecordingDispatcher<Q, P> {
    fn dispatch(&self, intent: DataIntent<Q, P>) {
        self.intents.lock().push(intent);
    }
}

type Waiter<P> = (Params, oneshot::Sender<Result<P, String>>);

/// Controls the resolution of every load issued by a [`gated_source`].
pub struct Gate<P> {
    waiting: Arc<Mutex<VecDeque<Waiter<P>>>>,
    calls: Arc<AtomicUsize>,
}

impl<P> Gate<P> {
    /// Total number of loads issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Loads not yet resolved.
    pub fn waiting(&self) -> usize {
        self.waiting.lock().len()
    }

    /// Query of the oldest unresolved load.
    pub fn front_query(&self) -> Option<Params> {
        self.waiting.lock().front().map(|(query, _)| query.clone())
    }

    /// Resolve the oldest unresolved load.
    pub fn resolve_oldest(&self, result: Result<P, &str>) {
        let (_, tx) = self
            .waiting
            .lock()
            .pop_front()
            .expect("no load is waiting");
        let _ = tx.send(result.map_err(str::to_string));
    }

    /// Resolve the newest unresolved load.
    pub fn resolve_newest(&self, result: Result<P, &str>) {
        let (_, tx) = self
            .waiting
            .lock()
            .pop_back()
            .expect("no load is waiting");
        let _ = tx.send(result.map_err(str::to_string));
    }
}

/// Source whose loads stay pending until the test resolves them via [`Gate`].
pub fn gated_source<P: Send + 'static>() -> (Gate<P>, impl DataSource<Params, P>) {
    let waiting: Arc<Mutex<VecDeque<Waiter<P>>>> = Arc::new(Mutex::new(VecDeque::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Gate {
        waiting: Arc::clone(&waiting),
        calls: Arc::clone(&calls),
    };

    let source = move |query: Params| {
        let (tx, rx) = oneshot::channel();
        waiting.lock().push_back((query, tx));
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            match rx.await {
                Ok(Ok(data)) => Ok(data),
                Ok(Err(message)) => Err(anyhow!(message)),
                Err(_) => Err(anyhow!("gate closed")),
            }
        }
    };
    (gate, source)
}

/// Source that resolves immediately with the number of loads issued so far.
pub fn counting_source() -> (Arc<AtomicUsize>, impl DataSource<Params, u32>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let source = move |_query: Params| {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move { Ok::<_, anyhow::Error>(n as u32) }
    };
    (calls, source)
}

/// Let spawned fetch tasks run to completion.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
