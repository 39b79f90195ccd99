use thiserror::Error;

/// Failures surfaced by the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The analysis backend returned a record we refuse to fold into
    /// session state. Prior state is left untouched.
    #[error("analysis source returned a malformed result: {0}")]
    InvalidAnalysisResult(String),

    /// A transcription or analysis backend cannot produce further results.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),
}
