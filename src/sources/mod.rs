//! Boundary contracts for the transcription and analysis backends.
//!
//! Both backends are injectable so the pipeline can be driven by the
//! bundled simulators in production demos and by deterministic fixtures
//! in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AnalyzerError;

pub mod mock;

pub use mock::{MockAnalysis, MockTranscription};

/// Raw record returned by an analysis backend, prior to validation.
///
/// Mirrors the JSON shape an NLP service would return; every field is
/// optional at this layer so a partial response can be rejected cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    pub sentiment: Option<f64>,
    pub keywords: Option<Vec<String>>,
    pub entities: Option<Vec<String>>,
}

impl RawAnalysis {
    /// Check all required fields are present and usable.
    pub fn validate(self) -> Result<NlpResult, AnalyzerError> {
        let sentiment = self
            .sentiment
            .ok_or_else(|| AnalyzerError::InvalidAnalysisResult("missing sentiment".into()))?;
        if !sentiment.is_finite() {
            return Err(AnalyzerError::InvalidAnalysisResult(format!(
                "non-finite sentiment: {sentiment}"
            )));
        }

        let keywords = self
            .keywords
            .ok_or_else(|| AnalyzerError::InvalidAnalysisResult("missing keywords".into()))?;
        let entities = self
            .entities
            .ok_or_else(|| AnalyzerError::InvalidAnalysisResult("missing entities".into()))?;

        Ok(NlpResult {
            sentiment,
            keywords,
            entities,
        })
    }
}

/// Validated per-utterance analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NlpResult {
    /// Sentiment score in [0, 100).
    pub sentiment: f64,
    pub keywords: Vec<String>,
    pub entities: Vec<String>,
}

/// Supplies utterances one at a time, in delivery order.
#[async_trait]
pub trait TranscriptionSource: Send {
    /// Next utterance, or `None` when the call has ended.
    async fn next_utterance(&mut self) -> Result<Option<String>, AnalyzerError>;
}

/// Produces an analysis record for a single utterance.
#[async_trait]
pub trait AnalysisSource: Send {
    async fn analyze(&mut self, text: &str) -> Result<RawAnalysis, AnalyzerError>;
}
