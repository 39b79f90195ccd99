pub mod controller;
pub mod pipeline;
pub mod state;

pub use controller::SessionController;
pub use state::{
    AnalysisSummary, CallPhase, CallSegment, SentimentSample, SessionState, SessionStatus,
};
