//! Corpus building and candidate extraction.

use std::collections::{BTreeMap, HashSet};

use extraction::{ExtractedPlace, ExtractionError, ExtractionRequest, Extractor};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::dispatch::QueryResult;
use super::queries::QueryCategory;
use crate::common::normalize_name;
use crate::config::DiscoveryConfig;
use crate::error::{Condition, PlannerError, Result};
use crate::models::CandidatePlace;

/// Concatenated content for one category, plus the per-query text used to
/// attribute provenance.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub category: QueryCategory,
    pub text: String,
    sources: Vec<(String, String)>,
}

impl Corpus {
    /// Queries whose content mentions `name`, compared normalized.
    fn mentions(&self, name: &str) -> Vec<String> {
        let key = normalize_name(name);
        if key.is_empty() {
            return Vec::new();
        }
        self.sources
            .iter()
            .filter(|(_, text)| text.contains(&key))
            .map(|(query, _)| query.clone())
            .collect()
    }
}

/// Group successful results into one bounded corpus per category.
///
/// Queries are taken in text order so the corpus does not depend on
/// completion order. A URL already used in a corpus is not repeated.
pub fn build_corpora(results: &[QueryResult], max_chars: usize) -> Vec<Corpus> {
    let mut grouped: BTreeMap<QueryCategory, Vec<&QueryResult>> = BTreeMap::new();
    for result in results {
        grouped.entry(result.query.category).or_default().push(result);
    }

    grouped
        .into_iter()
        .filter_map(|(category, mut group)| {
            group.sort_by(|a, b| a.query.text.cmp(&b.query.text));

            let mut text = String::new();
            let mut used = 0usize;
            let mut seen_urls = HashSet::new();
            let mut sources = Vec::new();

            'queries: for result in group {
                let mut attributed = String::new();
                for block in &result.blocks {
                    if !seen_urls.insert(block.url.as_str()) {
                        continue;
                    }
                    let entry = match &block.title {
                        Some(title) => format!("## {}\n{}\n\n", title, block.content),
                        None => format!("{}\n\n", block.content),
                    };
                    let remaining = max_chars.saturating_sub(used);
                    if remaining == 0 {
                        break 'queries;
                    }
                    let piece: String = entry.chars().take(remaining).collect();
                    used += piece.chars().count();
                    attributed.push(' ');
                    attributed.push_str(&normalize_name(&piece));
                    text.push_str(&piece);
                }
                sources.push((result.query.text.clone(), attributed));
            }

            (!text.trim().is_empty()).then_some(Corpus {
                category,
                text,
                sources,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct AggregateOutcome {
    pub candidates: Vec<CandidatePlace>,
    pub conditions: Vec<Condition>,
    pub extraction_calls: u32,
    pub raw_records: usize,
    /// Records dropped at conversion (unknown type, empty name).
    pub rejected_records: usize,
    /// Cancellation or the deadline stopped extraction early.
    pub interrupted: bool,
}

/// Run the extractor over each corpus in turn.
///
/// Rate limiting is retried with backoff; once it persists past the
/// attempt budget the remaining corpora are skipped and
/// [`Condition::ExtractionUnavailable`] is reported. Malformed or failed
/// calls count as zero results. Quota exhaustion aborts. Cancellation or
/// the deadline stops extraction and keeps what was gathered.
pub async fn extract_candidates<E>(
    extractor: &E,
    city: &str,
    corpora: &[Corpus],
    config: &DiscoveryConfig,
    cancel: &CancellationToken,
    deadline: Option<Instant>,
) -> Result<AggregateOutcome>
where
    E: Extractor + ?Sized,
{
    let mut outcome = AggregateOutcome::default();
    let mut malformed = 0u32;
    let mut failed = 0u32;

    for corpus in corpora {
        let request = ExtractionRequest::candidates(corpus.category.label(), city, corpus.text.clone());
        outcome.extraction_calls += 1;

        let deadline_reached = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        let call = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            _ = deadline_reached => None,
            result = extract_with_retry(extractor, &request, config) => Some(result),
        };
        let Some(call) = call else {
            warn!(category = %corpus.category, "Extraction interrupted");
            outcome.interrupted = true;
            break;
        };

        let records = match call {
            Ok(records) => records,
            Err(ExtractionError::QuotaExhausted) => {
                warn!(category = %corpus.category, "Extraction quota exhausted");
                return Err(PlannerError::UpstreamQuotaExhausted);
            }
            Err(ExtractionError::RateLimited { .. }) => {
                warn!(
                    category = %corpus.category,
                    attempts = config.extraction_attempts,
                    "Extraction still rate limited, skipping remaining corpora"
                );
                outcome.conditions.push(Condition::ExtractionUnavailable);
                break;
            }
            Err(ExtractionError::Malformed { reason }) => {
                warn!(category = %corpus.category, reason = %reason, "Malformed extraction response");
                malformed += 1;
                continue;
            }
            Err(e) => {
                warn!(category = %corpus.category, error = %e, "Extraction call failed");
                failed += 1;
                continue;
            }
        };

        debug!(category = %corpus.category, records = records.len(), "Extraction returned records");
        outcome.raw_records += records.len();

        for record in records {
            let mut provenance = corpus.mentions(&record.name);
            if provenance.is_empty() {
                provenance.push(corpus.category.label().to_string());
            }
            match CandidatePlace::from_extracted(record, provenance) {
                Some(candidate) => outcome.candidates.push(candidate),
                None => outcome.rejected_records += 1,
            }
        }
    }

    if malformed > 0 {
        outcome.conditions.push(Condition::UpstreamMalformed { calls: malformed });
    }
    if failed > 0 {
        outcome.conditions.push(Condition::PartialDegraded {
            reason: format!("{} extraction calls failed", failed),
        });
    }

    info!(
        calls = outcome.extraction_calls,
        raw = outcome.raw_records,
        accepted = outcome.candidates.len(),
        rejected = outcome.rejected_records,
        "Candidate extraction finished"
    );

    Ok(outcome)
}

async fn extract_with_retry<E>(
    extractor: &E,
    request: &ExtractionRequest,
    config: &DiscoveryConfig,
) -> std::result::Result<Vec<ExtractedPlace>, ExtractionError>
where
    E: Extractor + ?Sized,
{
    let attempts = config.extraction_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match extractor.extract_candidates(request).await {
            Err(ExtractionError::RateLimited { retry_after }) if attempt < attempts => {
                let delay = retry_after
                    .unwrap_or_else(|| config.retry_base_delay() * 2u32.saturating_pow(attempt - 1));
                debug!(label = %request.label, attempt, delay = ?delay, "Rate limited, backing off");
                tokio::time::sleep(delay).await;
            }
            other => return other,
        }
    }
}
