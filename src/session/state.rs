use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    Idle,
    Recording,
    Completed,
}

impl Default for SessionStatus {
    fn default() -> Self {
        SessionStatus::Idle
    }
}

/// Stage of the sales call the rep is currently in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CallPhase {
    Introduction,
    Discovery,
    Presentation,
    HandlingObjections,
    Closing,
}

impl CallPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallPhase::Introduction => "introduction",
            CallPhase::Discovery => "discovery",
            CallPhase::Presentation => "presentation",
            CallPhase::HandlingObjections => "handling-objections",
            CallPhase::Closing => "closing",
        }
    }
}

impl Default for CallPhase {
    fn default() -> Self {
        CallPhase::Introduction
    }
}

/// One processed utterance. Appended in arrival order, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSegment {
    pub text: String,
    /// Sentiment score in [0, 100).
    pub sentiment: f64,
    pub keywords: Vec<String>,
    pub entities: Vec<String>,
}

/// Cumulative view of all segments seen so far.
///
/// The four boolean flags reflect only the most recent segment, while
/// `keywords`/`entities` accumulate across the whole session. The
/// asymmetry is inherited behavior and is pinned by tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub word_count: usize,
    pub average_word_length: f64,
    pub contains_product_mention: bool,
    pub contains_value_proposition: bool,
    pub mentions_statistics: bool,
    pub asks_questions: bool,
    /// Union of all keyword hits, deduplicated, first-seen order.
    pub keywords: Vec<String>,
    /// Union of all entity hits, deduplicated, first-seen order.
    pub entities: Vec<String>,
}

/// One point on the sentiment-over-time chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SentimentSample {
    /// Nominal offset from call start, in seconds.
    pub time_secs: u32,
    pub sentiment: f64,
}

/// Everything tracked for the current recording session.
///
/// All fields move together through `analysis::ingest` and `reset`;
/// consumers only ever observe fully applied updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: SessionStatus,
    pub phase: CallPhase,
    pub started_at: Option<DateTime<Utc>>,
    pub segments: Vec<CallSegment>,
    pub summary: Option<AnalysisSummary>,
    /// Running effectiveness score in [0, 100], never decreases.
    pub effectiveness: u32,
    pub sentiment_series: Vec<SentimentSample>,
    /// Most recent pipeline failure, surfaced for the presentation layer.
    pub last_error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Idle,
            phase: CallPhase::Introduction,
            started_at: None,
            segments: Vec::new(),
            summary: None,
            effectiveness: 0,
            sentiment_series: Vec::new(),
            last_error: None,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything back to initial values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Full transcript: segment texts joined by a single space.
    pub fn transcript(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
