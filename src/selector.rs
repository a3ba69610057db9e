//! Read-only projections from host state to one identifier's entry.
//!
//! Every selector is built for a fixed identifier and works on any state
//! implementing [`DataSlice`].

use std::sync::Arc;

use crate::data::{DataSlice, FetchRecord, FetchStatus};

/// Composite read handed to consumers.
#[derive(Debug)]
pub struct DataView<P> {
    pub data: Option<Arc<P>>,
    pub error: Option<String>,
    pub loading: bool,
    pub status: FetchStatus,
}

impl<P> DataView<P> {
    pub fn from_record<Q>(record: Option<&FetchRecord<Q, P>>) -> Self {
        match record {
            Some(record) => Self {
                data: record.data().cloned(),
                error: record.error().map(str::to_string),
                loading: record.is_loading(),
                status: record.status(),
            },
            None => Self::default(),
        }
    }
}

impl<P> Default for DataView<P> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
            status: FetchStatus::Idle,
        }
    }
}

impl<P> Clone for DataView<P> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            loading: self.loading,
            status: self.status,
        }
    }
}

impl<P: PartialEq> PartialEq for DataView<P> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
            && self.error == other.error
            && self.loading == other.loading
            && self.status == other.status
    }
}

/// Payload of `id`, or `None` when absent, loading or failed.
pub fn create_data_selector<S: DataSlice>(
    id: impl Into<String>,
) -> impl Fn(&S) -> Option<Arc<S::Payload>> {
    let id = id.into();
    move |state: &S| state.data().get(&id).and_then(|r| r.data().cloned())
}

/// Failure message of `id`.
pub fn create_error_selector<S: DataSlice>(id: impl Into<String>) -> impl Fn(&S) -> Option<String> {
    let id = id.into();
    move |state: &S| {
        state
            .data()
            .get(&id)
            .and_then(|r| r.error().map(str::to_string))
    }
}

pub fn create_loading_selector<S: DataSlice>(id: impl Into<String>) -> impl Fn(&S) -> bool {
    let id = id.into();
    move |state: &S| state.data().get(&id).is_some_and(|r| r.is_loading())
}

pub fn create_status_selector<S: DataSlice>(id: impl Into<String>) -> impl Fn(&S) -> FetchStatus {
    let id = id.into();
    move |state: &S| {
        state
            .data()
            .get(&id)
            .map_or(FetchStatus::Idle, |r| r.status())
    }
}

/// Query of the latest requested fetch for `id`.
pub fn create_query_selector<S>(id: impl Into<String>) -> impl Fn(&S) -> Option<S::Query>
where
    S: DataSlice,
    S::Query: Clone,
{
    let id = id.into();
    move |state: &S| state.data().get(&id).and_then(|r| r.query.clone())
}

/// `{ data, error, loading }` for `id` in one read.
pub fn create_view_selector<S: DataSlice>(
    id: impl Into<String>,
) -> impl Fn(&S) -> DataView<S::Payload> {
    let id = id.into();
    move |state: &S| DataView::from_record(state.data().get(&id).map(Arc::as_ref))
}
