//! Request shapes sent to the reasoning service.

use serde::{Deserialize, Serialize};

/// What the service should return for a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSchema {
    CandidatePlaces,
    DayPlanSkeleton,
}

/// A batch of raw text the service should turn into structured records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// Label for the corpus, usually the query category ("food", "nightlife").
    pub label: String,

    /// City the corpus is about, used to keep the service from returning
    /// same-named places elsewhere.
    pub city: String,

    /// Concatenated content blocks.
    pub corpus: String,

    pub schema: TargetSchema,
}

impl ExtractionRequest {
    /// Request candidate places from a corpus.
    pub fn candidates(
        label: impl Into<String>,
        city: impl Into<String>,
        corpus: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            city: city.into(),
            corpus: corpus.into(),
            schema: TargetSchema::CandidatePlaces,
        }
    }
}
