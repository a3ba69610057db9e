//! State for the data slice: fetch records and the registry holding them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::mvi::StoreState;

/// Default dynamic query type: parameter name → JSON value.
pub type Params = BTreeMap<String, serde_json::Value>;

/// Coarse fetch status reported to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// No record exists for the identifier.
    #[default]
    Idle,
    Loading,
    Complete,
    Error,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FetchStatus::Idle => "idle",
            FetchStatus::Loading => "loading",
            FetchStatus::Complete => "complete",
            FetchStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// Stored lifecycle state of one record.
///
/// Payload and error message live in separate variants, so a record can
/// never carry both.
#[derive(Debug)]
pub enum RecordState<P> {
    Loading,
    Complete { data: Arc<P> },
    Error { message: String },
}

// Manual impl: cloning shares the payload and must not require `P: Clone`.
impl<P> Clone for RecordState<P> {
    fn clone(&self) -> Self {
        match self {
            RecordState::Loading => RecordState::Loading,
            RecordState::Complete { data } => RecordState::Complete {
                data: Arc::clone(data),
            },
            RecordState::Error { message } => RecordState::Error {
                message: message.clone(),
            },
        }
    }
}

impl<P: PartialEq> PartialEq for RecordState<P> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RecordState::Loading, RecordState::Loading) => true,
            (RecordState::Complete { data: a }, RecordState::Complete { data: b }) => a == b,
            (RecordState::Error { message: a }, RecordState::Error { message: b }) => a == b,
            _ => false,
        }
    }
}

/// Cached state for one data identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRecord<Q, P> {
    pub id: String,
    /// Parameters of the latest *requested* fetch. `None` only when an error
    /// was recorded for an identifier that never started loading.
    pub query: Option<Q>,
    pub state: RecordState<P>,
}

impl<Q, P> FetchRecord<Q, P> {
    pub fn status(&self) -> FetchStatus {
        match self.state {
            RecordState::Loading => FetchStatus::Loading,
            RecordState::Complete { .. } => FetchStatus::Complete,
            RecordState::Error { .. } => FetchStatus::Error,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RecordState::Loading)
    }

    /// Payload of a completed fetch.
    pub fn data(&self) -> Option<&Arc<P>> {
        match &self.state {
            RecordState::Complete { data } => Some(data),
            _ => None,
        }
    }

    /// Message of a failed fetch.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            RecordState::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Entry registry: identifier → fetch record.
///
/// Records are held behind `Arc` so a transition only allocates the entry it
/// touches. Selectors and hooks can compare entries with [`Arc::ptr_eq`] to
/// detect changes.
#[derive(Debug)]
pub struct DataRegistry<Q, P> {
    entries: HashMap<String, Arc<FetchRecord<Q, P>>>,
}

impl<Q, P> Default for DataRegistry<Q, P> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<Q, P> Clone for DataRegistry<Q, P> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<Q, P> StoreState for DataRegistry<Q, P>
where
    Q: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
}

impl<Q, P> DataRegistry<Q, P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<FetchRecord<Q, P>>> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers currently cached, in arbitrary order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub(super) fn insert(&mut self, record: FetchRecord<Q, P>) {
        self.entries.insert(record.id.clone(), Arc::new(record));
    }

    pub(super) fn remove(&mut self, id: &str) -> Option<Arc<FetchRecord<Q, P>>> {
        self.entries.remove(id)
    }
}

/// Host state that mounts a [`DataRegistry`] under its `data` key.
///
/// Selectors and the hook read through this trait, so the registry can live
/// inside any larger application state.
pub trait DataSlice {
    type Query;
    type Payload;

    fn data(&self) -> &DataRegistry<Self::Query, Self::Payload>;
}

impl<Q, P> DataSlice for DataRegistry<Q, P> {
    type Query = Q;
    type Payload = P;

    fn data(&self) -> &DataRegistry<Q, P> {
        self
    }
}
