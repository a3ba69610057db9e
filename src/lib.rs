//! Data-fetch lifecycle engine on top of a single-store, reducer-driven
//! state container.
//!
//! Every fetch is recorded under a string identifier as
//! `loading → complete | error`, and can be evicted with `destroy`.
//! Consumers bind to an identifier with [`hook::use_data`] and read it
//! through the [`selector`] functions.
//!
//! ```text
//! DataHook ──→ Fetcher ──→ Store::dispatch ──→ DataReducer ──→ DataRegistry
//!    ↑                                                              │
//!    └──────────────────── selectors / DataView ────────────────────┘
//! ```

pub mod config;
pub mod context;
pub mod data;
pub mod fetch;
pub mod hook;
pub mod logging;
pub mod mvi;
pub mod selector;
pub mod store;

pub use context::DataContext;
pub use data::{DataIntent, DataReducer, DataRegistry, DataSlice, FetchStatus, Params};
pub use fetch::{DataSource, FetchError, FetchOutcome, Fetcher};
pub use hook::{use_data, DataHook, UseDataOptions};
pub use selector::DataView;
pub use store::{Dispatch, Store};
