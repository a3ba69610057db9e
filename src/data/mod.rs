//! Data slice feature module.
//!
//! Holds the per-identifier fetch records and the only vocabulary allowed to
//! change them.
//!
//! # Architecture
//!
//! Uses MVI (Model-View-Intent) pattern:
//! - `state.rs` - Fetch records and the entry registry
//! - `intent.rs` - Lifecycle events (Loading, Complete, Error, Destroy)
//! - `reducer.rs` - State transitions (pure, no side effects)

mod intent;
mod reducer;
mod state;

pub use intent::{DataIntent, IntentKind};
pub use reducer::DataReducer;
pub use state::{DataRegistry, DataSlice, FetchRecord, FetchStatus, Params, RecordState};
