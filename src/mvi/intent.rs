//! Base trait for intents in MVI architecture.

/// Marker trait for intent objects.
///
/// Intents represent:
/// - Fetch lifecycle events (loading, complete, error, destroy)
/// - Host application actions composed next to them
///
/// Intents are processed by reducers to produce new states.
pub trait Intent: Send + 'static {}
