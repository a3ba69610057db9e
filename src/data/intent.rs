//! Lifecycle intents for the data slice.

use std::fmt;

use crate::mvi::Intent;

/// Tag identifying the kind of a [`DataIntent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Loading,
    Complete,
    Error,
    Destroy,
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            IntentKind::Loading => "DATA_LOADING",
            IntentKind::Complete => "DATA_COMPLETE",
            IntentKind::Error => "DATA_ERROR",
            IntentKind::Destroy => "DATA_DESTROY",
        };
        f.write_str(tag)
    }
}

/// Intents that can be dispatched to the data reducer.
///
/// The constructors do not validate the identifier; an empty id is rejected
/// by the fetcher, not here.
#[derive(Debug, Clone, PartialEq)]
pub enum DataIntent<Q, P> {
    /// A fetch with `query` has started for `id`.
    Loading { id: String, query: Q },

    /// The fetch for `query` resolved with `data`.
    Complete { id: String, query: Q, data: P },

    /// The latest fetch for `id` failed.
    Error { id: String, error: String },

    /// Evict `id` from the registry.
    Destroy { id: String },
}

impl<Q, P> DataIntent<Q, P> {
    pub fn loading(id: impl Into<String>, query: Q) -> Self {
        DataIntent::Loading {
            id: id.into(),
            query,
        }
    }

    pub fn complete(id: impl Into<String>, query: Q, data: P) -> Self {
        DataIntent::Complete {
            id: id.into(),
            query,
            data,
        }
    }

    /// Failure intent. Only the `Display` rendering of `error` is kept.
    pub fn error(id: impl Into<String>, error: impl fmt::Display) -> Self {
        DataIntent::Error {
            id: id.into(),
            error: error.to_string(),
        }
    }

    pub fn destroy(id: impl Into<String>) -> Self {
        DataIntent::Destroy { id: id.into() }
    }

    pub fn kind(&self) -> IntentKind {
        match self {
            DataIntent::Loading { .. } => IntentKind::Loading,
            DataIntent::Complete { .. } => IntentKind::Complete,
            DataIntent::Error { .. } => IntentKind::Error,
            DataIntent::Destroy { .. } => IntentKind::Destroy,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            DataIntent::Loading { id, .. }
            | DataIntent::Complete { id, .. }
            | DataIntent::Error { id, .. }
            | DataIntent::Destroy { id } => id,
        }
    }
}

impl<Q, P> Intent for DataIntent<Q, P>
where
    Q: Send + 'static,
    P: Send + 'static,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Params;

    type TestIntent = DataIntent<Params, bool>;

    #[test]
    fn loading_carries_query() {
        let intent = TestIntent::loading("test", Params::new());
        assert_eq!(
            intent,
            DataIntent::Loading {
                id: "test".into(),
                query: Params::new()
            }
        );
        assert_eq!(intent.kind(), IntentKind::Loading);
    }

    #[test]
    fn complete_carries_query_and_data() {
        let intent = TestIntent::complete("test", Params::new(), true);
        assert_eq!(
            intent,
            DataIntent::Complete {
                id: "test".into(),
                query: Params::new(),
                data: true
            }
        );
    }

    #[test]
    fn error_keeps_message_only() {
        let err = std::io::Error::other("test-error");
        let intent = TestIntent::error("test", &err);
        assert_eq!(
            intent,
            DataIntent::Error {
                id: "test".into(),
                error: "test-error".into()
            }
        );
    }

    #[test]
    fn destroy_carries_id_only() {
        let intent = TestIntent::destroy("test");
        assert_eq!(intent, DataIntent::Destroy { id: "test".into() });
        assert_eq!(intent.id(), "test");
    }

    #[test]
    fn empty_id_is_not_validated() {
        let intent = TestIntent::destroy("");
        assert_eq!(intent.id(), "");
    }

    #[test]
    fn kind_tags() {
        assert_eq!(IntentKind::Loading.to_string(), "DATA_LOADING");
        assert_eq!(IntentKind::Complete.to_string(), "DATA_COMPLETE");
        assert_eq!(IntentKind::Error.to_string(), "DATA_ERROR");
        assert_eq!(IntentKind::Destroy.to_string(), "DATA_DESTROY");
    }
}
