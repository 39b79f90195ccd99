use std::path::PathBuf;

use anyhow::Result;
use log::info;

use callsight::{
    AnalysisConfig, CallPhase, CallReport, Database, MockAnalysis, MockTranscription,
    SessionController,
};

/// Runs one simulated sales call end to end: record, analyze, review, save.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("callsight starting up...");

    let db_path = std::env::var("CALLSIGHT_DB").unwrap_or_else(|_| "callsight.sqlite3".into());
    let database = Database::new(PathBuf::from(db_path))?;

    let mut controller = SessionController::new(AnalysisConfig::default());
    controller
        .start_call(MockTranscription::new(), MockAnalysis::new())
        .await?;
    controller.set_phase(CallPhase::Discovery).await;
    controller.wait_for_end().await?;

    let state = controller.snapshot().await;
    info!("transcript: {}", state.transcript());
    if let Some(summary) = &state.summary {
        info!(
            "words: {} (avg length {:.2}), keywords: [{}], entities: [{}]",
            summary.word_count,
            summary.average_word_length,
            summary.keywords.join(", "),
            summary.entities.join(", "),
        );
    }
    info!("call effectiveness: {}%", state.effectiveness);

    let report = CallReport::from_session(&state, 85, "Solid discovery; tighten the close.");
    database.insert_call_report(&report).await?;
    info!("saved call report {}", report.id);

    Ok(())
}
