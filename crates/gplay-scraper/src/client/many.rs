use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::endpoints::ListEndpoint;
use crate::error::ScraperError;
use crate::request::RequestContext;
use crate::transport::Transport;

use super::{Extraction, PlayClient};

impl<T: Transport> PlayClient<T> {
    /// Runs one chain per endpoint with at most `budget` chains in flight.
    ///
    /// Chains are independent: one failing or being slow does not affect
    /// the others, and each keeps its own sequential page order. Results
    /// come back in the order of `endpoints`. Cancelling `cancel` stops
    /// every chain, each reporting [`super::ChainOutcome::Cancelled`].
    pub async fn extract_many<E: ListEndpoint>(
        &self,
        ctx: &RequestContext,
        endpoints: &[E],
        limit: Option<usize>,
        budget: usize,
        cancel: &CancellationToken,
    ) -> Vec<Result<Extraction<E::Item>, ScraperError>> {
        tracing::info!(chains = endpoints.len(), budget, "starting concurrent extraction");

        let mut results: Vec<(usize, Result<Extraction<E::Item>, ScraperError>)> =
            stream::iter(endpoints.iter().enumerate())
                .map(|(index, endpoint)| {
                    let fut = self.extract(ctx, endpoint, limit, cancel);
                    async move { (index, fut.await) }
                })
                .buffer_unordered(budget.max(1))
                .collect()
                .await;

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}
