use std::cmp::Ordering;

use crate::models::CandidatePlace;

/// Drop low-confidence candidates and order the rest: confidence
/// descending, then corroboration descending, then normalized name.
pub fn filter_and_rank(mut candidates: Vec<CandidatePlace>, min_confidence: f32) -> Vec<CandidatePlace> {
    candidates.retain(|c| c.confidence >= min_confidence);
    candidates.sort_by(compare);
    candidates
}

fn compare(a: &CandidatePlace, b: &CandidatePlace) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| b.corroboration().cmp(&a.corroboration()))
        .then_with(|| a.details.normalized_name().cmp(&b.details.normalized_name()))
}
