pub mod aggregator;
pub mod config;
pub mod scoring;

pub use aggregator::ingest;
pub use config::AnalysisConfig;
pub use scoring::{detect_signals, effectiveness_increment, SegmentSignals};
