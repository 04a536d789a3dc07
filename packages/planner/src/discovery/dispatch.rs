//! Concurrent search dispatch.

use std::time::Duration;

use extraction::{ExtractionError, SearchResult, WebSearcher};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::queries::SearchQuery;
use crate::common::truncate_chars;
use crate::config::DiscoveryConfig;
use crate::error::{PlannerError, Result};

/// One search result, truncated and ready for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    pub url: String,
    pub title: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub query: SearchQuery,
    pub blocks: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchOutcome {
    /// Successful queries, in completion order.
    pub results: Vec<QueryResult>,
    pub total: usize,
    /// Queries that errored, timed out, came back empty or never finished.
    pub failures: usize,
    /// Cancellation or the deadline cut the batch short.
    pub interrupted: bool,
    pub degraded: bool,
}

impl DispatchOutcome {
    pub fn successes(&self) -> usize {
        self.results.len()
    }
}

enum QueryError {
    Search(ExtractionError),
    TimedOut(Duration),
}

/// Run every query against the searcher with bounded concurrency.
///
/// Individual failures never abort the batch. A quota-exhausted response
/// does: the run cannot succeed once the provider has cut us off. On
/// cancellation or deadline the results gathered so far are returned and
/// the outcome is flagged degraded.
pub async fn dispatch<S>(
    searcher: &S,
    queries: &[SearchQuery],
    config: &DiscoveryConfig,
    cancel: &CancellationToken,
    deadline: Option<Instant>,
) -> Result<DispatchOutcome>
where
    S: WebSearcher + ?Sized,
{
    let timeout = config.query_timeout();
    let limit = config.results_per_query;
    let max_block_chars = config.max_block_chars;
    let total = queries.len();

    info!(
        queries = total,
        concurrency = config.concurrency,
        timeout_ms = config.query_timeout_ms,
        "Dispatching discovery searches"
    );

    let mut in_flight = stream::iter(queries.iter().cloned())
        .map(|query| async move {
            let result = match tokio::time::timeout(timeout, searcher.search(&query.text, limit)).await
            {
                Ok(Ok(results)) => Ok(results),
                Ok(Err(e)) => Err(QueryError::Search(e)),
                Err(_) => Err(QueryError::TimedOut(timeout)),
            };
            (query, result)
        })
        .buffer_unordered(config.concurrency.max(1));

    let deadline_reached = async {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(deadline_reached);

    let mut results = Vec::new();
    let mut interrupted = false;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(completed = results.len(), "Discovery dispatch cancelled");
                interrupted = true;
                break;
            }
            _ = &mut deadline_reached => {
                warn!(completed = results.len(), "Discovery dispatch hit deadline");
                interrupted = true;
                break;
            }
            next = in_flight.next() => {
                let Some((query, outcome)) = next else { break };
                match outcome {
                    Ok(found) => {
                        let blocks = to_blocks(found, max_block_chars);
                        if blocks.is_empty() {
                            warn!(query = %query.text, "Search returned no usable results");
                            continue;
                        }
                        debug!(query = %query.text, blocks = blocks.len(), "Search succeeded");
                        results.push(QueryResult { query, blocks });
                    }
                    Err(QueryError::Search(ExtractionError::QuotaExhausted)) => {
                        warn!(query = %query.text, "Search quota exhausted, aborting discovery");
                        return Err(PlannerError::UpstreamQuotaExhausted);
                    }
                    Err(QueryError::Search(e)) => {
                        warn!(query = %query.text, error = %e, "Search failed, skipping");
                    }
                    Err(QueryError::TimedOut(after)) => {
                        warn!(query = %query.text, timeout = ?after, "Search timed out, skipping");
                    }
                }
            }
        }
    }

    let successes = results.len();
    let degraded = interrupted || (successes as f32) < (total as f32) * config.min_success_ratio;

    info!(
        total,
        successes,
        failures = total - successes,
        degraded,
        "Discovery dispatch finished"
    );

    Ok(DispatchOutcome {
        results,
        total,
        failures: total - successes,
        interrupted,
        degraded,
    })
}

fn to_blocks(results: Vec<SearchResult>, max_chars: usize) -> Vec<ContentBlock> {
    results
        .into_iter()
        .filter(|r| !r.content.trim().is_empty())
        .map(|r| ContentBlock {
            url: r.url.to_string(),
            title: r.title,
            content: truncate_chars(r.content.trim(), max_chars).to_string(),
        })
        .collect()
}
