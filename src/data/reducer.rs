//! Reducer for the data slice.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::mvi::Reducer;

use super::intent::DataIntent;
use super::state::{DataRegistry, FetchRecord, RecordState};

/// Reducer for fetch record transitions.
///
/// Pure function. It never decides whether a resolution is stale; the
/// fetcher simply does not dispatch superseded results.
pub struct DataReducer<Q, P>(PhantomData<fn() -> (Q, P)>);

impl<Q, P> Reducer for DataReducer<Q, P>
where
    Q: Clone + Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    type State = DataRegistry<Q, P>;
    type Intent = DataIntent<Q, P>;

    fn reduce(mut state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            DataIntent::Loading { id, query } => {
                state.insert(FetchRecord {
                    id,
                    query: Some(query),
                    state: RecordState::Loading,
                });
            }

            DataIntent::Complete { id, query, data } => {
                state.insert(FetchRecord {
                    id,
                    query: Some(query),
                    state: RecordState::Complete {
                        data: Arc::new(data),
                    },
                });
            }

            DataIntent::Error { id, error } => {
                // The error is about the last attempted query, so keep it.
                let query = state.get(&id).and_then(|prior| prior.query.clone());
                state.insert(FetchRecord {
                    id,
                    query,
                    state: RecordState::Error { message: error },
                });
            }

            DataIntent::Destroy { id } => {
                state.remove(&id);
            }
        }
        state
    }
}
