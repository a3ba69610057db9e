//! Data source contract.

use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

/// Future returned by a [`DataSource`].
pub type SourceFuture<P> = BoxFuture<'static, anyhow::Result<P>>;

/// Something that can produce a payload for a query.
///
/// Supplied by the embedding application. Any `Fn(Q) -> impl Future<Output =
/// Result<P, E>>` with `E: Into<anyhow::Error>` is a source; the error's
/// `Display` rendering becomes the recorded failure message.
pub trait DataSource<Q, P>: Send + Sync + 'static {
    fn load(&self, query: Q) -> SourceFuture<P>;
}

impl<Q, P, E, F, Fut> DataSource<Q, P> for F
where
    F: Fn(Q) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, E>> + Send + 'static,
    E: Into<anyhow::Error> + 'static,
    Q: 'static,
    P: Send + 'static,
{
    fn load(&self, query: Q) -> SourceFuture<P> {
        self(query).map(|result| result.map_err(Into::into)).boxed()
    }
}
