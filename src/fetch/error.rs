use thiserror::Error;

/// Programmer errors rejected at the integration boundary.
///
/// Source failures are not errors here; they are recorded in the registry
/// and reported as [`FetchOutcome::Failed`](super::FetchOutcome::Failed).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("data identifier must not be empty")]
    EmptyId,
}
