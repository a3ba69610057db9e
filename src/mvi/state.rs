//! Base trait for store state in MVI architecture.

/// Marker trait for state held by a [`Store`](crate::store::Store).
///
/// States should be:
/// - Self-contained (everything selectors need to read)
/// - Cheap to take out of the store (`Default` leaves a placeholder behind
///   while the reducer runs)
/// - Shareable across tasks
pub trait StoreState: Default + Send + Sync + 'static {}
