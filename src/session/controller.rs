use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::info;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::analysis::AnalysisConfig;
use crate::session::pipeline::ingestion_loop;
use crate::session::state::{CallPhase, SessionState, SessionStatus};
use crate::sources::{AnalysisSource, TranscriptionSource};

/// Owns session state and the lifecycle of its ingestion pipeline.
///
/// One logical writer: the pipeline task is the only thing mutating
/// analysis state while a call is live. Consumers read via `snapshot`.
pub struct SessionController {
    state: Arc<Mutex<SessionState>>,
    config: AnalysisConfig,
    pipeline: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SessionController {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::new())),
            config,
            pipeline: None,
            cancel_token: None,
        }
    }

    /// Reset session state and start ingesting from the given sources.
    pub async fn start_call<T, A>(&mut self, transcription: T, analyzer: A) -> Result<()>
    where
        T: TranscriptionSource + 'static,
        A: AnalysisSource + 'static,
    {
        if let Some(handle) = &self.pipeline {
            if !handle.is_finished() {
                bail!("a recording is already in progress");
            }
        }
        self.pipeline.take();
        self.cancel_token.take();

        {
            let mut guard = self.state.lock().await;
            guard.reset();
            guard.status = SessionStatus::Recording;
            guard.started_at = Some(Utc::now());
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(ingestion_loop(
            Arc::clone(&self.state),
            self.config.clone(),
            transcription,
            analyzer,
            cancel_token.clone(),
        ));

        self.pipeline = Some(handle);
        self.cancel_token = Some(cancel_token);
        info!("call recording started");
        Ok(())
    }

    /// Stop the current call. Any in-flight, not-yet-ingested segment is
    /// discarded.
    pub async fn stop_call(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.pipeline.take() {
            handle
                .await
                .context("ingestion pipeline failed to join")?;
        }

        let mut guard = self.state.lock().await;
        if guard.status == SessionStatus::Recording {
            guard.status = SessionStatus::Completed;
        }
        info!("call recording stopped");
        Ok(())
    }

    /// Wait for the transcription source to drain on its own.
    pub async fn wait_for_end(&mut self) -> Result<()> {
        if let Some(handle) = self.pipeline.take() {
            handle
                .await
                .context("ingestion pipeline failed to join")?;
        }
        self.cancel_token.take();
        Ok(())
    }

    /// Cloned view of the current session for presentation or export.
    pub async fn snapshot(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn set_phase(&self, phase: CallPhase) {
        self.state.lock().await.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use crate::sources::{MockTranscription, RawAnalysis};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;

    struct ScriptedAnalysis {
        results: VecDeque<RawAnalysis>,
    }

    impl ScriptedAnalysis {
        fn new(results: Vec<RawAnalysis>) -> Self {
            Self {
                results: results.into(),
            }
        }
    }

    #[async_trait]
    impl AnalysisSource for ScriptedAnalysis {
        async fn analyze(&mut self, _text: &str) -> Result<RawAnalysis, AnalyzerError> {
            self.results
                .pop_front()
                .ok_or_else(|| AnalyzerError::SourceUnavailable("script exhausted".into()))
        }
    }

    /// Never completes an analysis; used to exercise cancellation.
    struct StalledAnalysis;

    #[async_trait]
    impl AnalysisSource for StalledAnalysis {
        async fn analyze(&mut self, _text: &str) -> Result<RawAnalysis, AnalyzerError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(RawAnalysis::default())
        }
    }

    fn raw(sentiment: f64, keywords: &[&str], entities: &[&str]) -> RawAnalysis {
        RawAnalysis {
            sentiment: Some(sentiment),
            keywords: Some(keywords.iter().map(|k| k.to_string()).collect()),
            entities: Some(entities.iter().map(|e| e.to_string()).collect()),
        }
    }

    fn phrases(texts: &[&str]) -> MockTranscription {
        MockTranscription::with_phrases(
            texts.iter().map(|t| t.to_string()).collect(),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn scripted_call_runs_to_completion() {
        let mut controller = SessionController::new(AnalysisConfig::default());
        let transcription = phrases(&[
            "Our efficiency grew 30% this year",
            "Do you have a few minutes?",
        ]);
        let analyzer = ScriptedAnalysis::new(vec![
            raw(70.0, &["efficiency"], &["30%"]),
            raw(55.0, &[], &[]),
        ]);

        controller.start_call(transcription, analyzer).await.unwrap();
        controller.wait_for_end().await.unwrap();

        let state = controller.snapshot().await;
        assert_eq!(state.status, SessionStatus::Completed);
        assert_eq!(state.segments.len(), 2);
        assert_eq!(state.effectiveness, 60);
        assert_eq!(
            state.transcript(),
            "Our efficiency grew 30% this year Do you have a few minutes?"
        );
        assert_eq!(state.sentiment_series.len(), 2);
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn starting_a_new_call_resets_the_previous_session() {
        let mut controller = SessionController::new(AnalysisConfig::default());

        controller
            .start_call(
                phrases(&["Do you have a few minutes?"]),
                ScriptedAnalysis::new(vec![raw(55.0, &[], &[])]),
            )
            .await
            .unwrap();
        controller.wait_for_end().await.unwrap();
        controller.set_phase(CallPhase::Closing).await;
        assert_eq!(controller.snapshot().await.effectiveness, 20);

        controller
            .start_call(
                phrases(&["Just confirming the address."]),
                ScriptedAnalysis::new(vec![raw(40.0, &[], &[])]),
            )
            .await
            .unwrap();
        controller.wait_for_end().await.unwrap();

        let state = controller.snapshot().await;
        assert_eq!(state.segments.len(), 1);
        assert_eq!(state.effectiveness, 0);
        assert_eq!(state.phase, CallPhase::Introduction);
        assert_eq!(state.sentiment_series.len(), 1);
    }

    #[tokio::test]
    async fn stopping_discards_the_in_flight_segment() {
        let mut controller = SessionController::new(AnalysisConfig::default());
        controller
            .start_call(phrases(&["never analyzed"]), StalledAnalysis)
            .await
            .unwrap();

        // Let the pipeline pick up the utterance and stall in analysis.
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.stop_call().await.unwrap();

        let state = controller.snapshot().await;
        assert_eq!(state.status, SessionStatus::Completed);
        assert!(state.segments.is_empty());
        assert!(state.sentiment_series.is_empty());
    }

    #[tokio::test]
    async fn second_start_while_recording_is_rejected() {
        let mut controller = SessionController::new(AnalysisConfig::default());
        controller
            .start_call(phrases(&["held open"]), StalledAnalysis)
            .await
            .unwrap();

        let err = controller
            .start_call(phrases(&["nope"]), StalledAnalysis)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already in progress"));

        controller.stop_call().await.unwrap();
    }

    #[tokio::test]
    async fn malformed_result_is_surfaced_and_skipped() {
        let mut controller = SessionController::new(AnalysisConfig::default());
        let transcription = phrases(&["first", "second"]);
        let analyzer = ScriptedAnalysis::new(vec![
            RawAnalysis {
                sentiment: None,
                keywords: Some(Vec::new()),
                entities: Some(Vec::new()),
            },
            raw(60.0, &[], &[]),
        ]);

        controller.start_call(transcription, analyzer).await.unwrap();
        controller.wait_for_end().await.unwrap();

        let state = controller.snapshot().await;
        // The malformed first segment was rejected, the second landed.
        assert_eq!(state.segments.len(), 1);
        assert_eq!(state.segments[0].text, "second");
        assert!(state
            .last_error
            .as_deref()
            .unwrap()
            .contains("malformed"));
    }
}
