use std::sync::Arc;

use log::{error, info};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::analysis::{aggregator, AnalysisConfig};
use crate::session::state::{SessionState, SessionStatus};
use crate::sources::{AnalysisSource, TranscriptionSource};

/// Drives one recording session: pull utterances from the transcription
/// source, analyze each, fold the pair into shared session state.
///
/// Segments are processed strictly one at a time. Cancellation between an
/// utterance arriving and its analysis completing discards that segment;
/// partially processed segments are never ingested.
pub(crate) async fn ingestion_loop<T, A>(
    state: Arc<Mutex<SessionState>>,
    config: AnalysisConfig,
    mut transcription: T,
    mut analyzer: A,
    cancel_token: CancellationToken,
) where
    T: TranscriptionSource,
    A: AnalysisSource,
{
    loop {
        let utterance = tokio::select! {
            result = transcription.next_utterance() => match result {
                Ok(Some(text)) => text,
                Ok(None) => {
                    info!("transcription source drained, ending session");
                    break;
                }
                Err(err) => {
                    error!("transcription source failed: {err}");
                    state.lock().await.last_error = Some(err.to_string());
                    break;
                }
            },
            _ = cancel_token.cancelled() => {
                info!("ingestion pipeline cancelled");
                return;
            }
        };

        let raw = tokio::select! {
            result = analyzer.analyze(&utterance) => match result {
                Ok(raw) => raw,
                Err(err) => {
                    error!("analysis failed for utterance: {err}");
                    state.lock().await.last_error = Some(err.to_string());
                    continue;
                }
            },
            _ = cancel_token.cancelled() => {
                info!("ingestion pipeline cancelled, discarding in-flight segment");
                return;
            }
        };

        let mut guard = state.lock().await;
        if let Err(err) = aggregator::ingest(&mut guard, &utterance, raw, &config) {
            error!("segment rejected: {err}");
            guard.last_error = Some(err.to_string());
        }
    }

    let mut guard = state.lock().await;
    if guard.status == SessionStatus::Recording {
        guard.status = SessionStatus::Completed;
    }
}
