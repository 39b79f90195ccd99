pub mod analysis;
pub mod db;
pub mod error;
pub mod session;
pub mod sources;

pub use analysis::AnalysisConfig;
pub use db::{CallReport, Database};
pub use error::AnalyzerError;
pub use session::{CallPhase, SessionController, SessionState, SessionStatus};
pub use sources::{
    AnalysisSource, MockAnalysis, MockTranscription, NlpResult, RawAnalysis, TranscriptionSource,
};
