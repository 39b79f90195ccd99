use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::state::{CallPhase, SentimentSample, SessionState};

/// Everything saved for one reviewed call: the session's final analysis
/// plus the reviewer's verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReport {
    pub id: String,
    pub started_at: Option<DateTime<Utc>>,
    pub phase: CallPhase,
    pub transcript: String,
    pub word_count: usize,
    pub average_word_length: f64,
    pub effectiveness: u32,
    pub keywords: Vec<String>,
    pub entities: Vec<String>,
    pub sentiment_series: Vec<SentimentSample>,
    /// Reviewer-assigned score in [0, 100], independent of the
    /// heuristic effectiveness score.
    pub reviewer_score: u32,
    pub reviewer_notes: String,
    pub created_at: DateTime<Utc>,
}

impl CallReport {
    pub fn from_session(state: &SessionState, reviewer_score: u32, reviewer_notes: &str) -> Self {
        let (word_count, average_word_length, keywords, entities) = match &state.summary {
            Some(summary) => (
                summary.word_count,
                summary.average_word_length,
                summary.keywords.clone(),
                summary.entities.clone(),
            ),
            None => (0, 0.0, Vec::new(), Vec::new()),
        };

        Self {
            id: Uuid::new_v4().to_string(),
            started_at: state.started_at,
            phase: state.phase,
            transcript: state.transcript(),
            word_count,
            average_word_length,
            effectiveness: state.effectiveness,
            keywords,
            entities,
            sentiment_series: state.sentiment_series.clone(),
            reviewer_score,
            reviewer_notes: reviewer_notes.to_string(),
            created_at: Utc::now(),
        }
    }
}
