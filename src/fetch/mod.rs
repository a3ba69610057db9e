//! Fetch orchestration.
//!
//! [`Fetcher`] dispatches the lifecycle intents for one identifier in the
//! order loading → complete/error and guards against stale resolutions with
//! request tokens. Sources are anything implementing [`DataSource`].

mod error;
mod fetcher;
mod source;

pub use error::FetchError;
pub use fetcher::{FetchOutcome, Fetcher, InFlight, RequestToken};
pub use source::{DataSource, SourceFuture};
