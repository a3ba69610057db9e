//! Model-View-Intent (MVI) primitives.
//!
//! Base traits for the unidirectional data flow the store is built on.
//!
//! # Architecture
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ Selector
//!    ↑                               │
//!    └───────────────────────────────┘
//! ```
//!
//! - **State**: a value owned by the store, replaced on every dispatch
//! - **Intent**: a lifecycle event or a host application action
//! - **Reducer**: pure function that transforms state based on intents

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::StoreState;
