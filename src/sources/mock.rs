//! Simulated transcription and analysis backends.
//!
//! Stand-ins for real speech-to-text and NLP services: the transcription
//! side replays a canned sales call on a fixed cadence, the analysis side
//! draws random sentiment and keyword/entity hits.

use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::time::{sleep, Duration};

use super::{AnalysisSource, RawAnalysis, TranscriptionSource};
use crate::error::AnalyzerError;

/// Nominal gap between utterances on a real call.
const UTTERANCE_INTERVAL: Duration = Duration::from_secs(2);

/// Simulated NLP round-trip latency.
const ANALYSIS_LATENCY: Duration = Duration::from_millis(500);

const CANNED_PHRASES: [&str; 6] = [
    "Hello, this is John from XYZ company.",
    "I'm calling to discuss our new product line.",
    "It could really benefit your business.",
    "Do you have a few minutes to chat?",
    "Our latest software has shown to increase efficiency by up to 30%.",
    "What challenges are you currently facing in your operations?",
];

const KEYWORD_POOL: [&str; 3] = ["product", "efficiency", "cost-saving"];
const ENTITY_POOL: [&str; 3] = ["John", "XYZ Company", "30%"];

/// Replays a scripted call, one phrase per interval.
pub struct MockTranscription {
    phrases: Vec<String>,
    next: usize,
    interval: Duration,
}

impl MockTranscription {
    pub fn new() -> Self {
        Self::with_phrases(
            CANNED_PHRASES.iter().map(|p| p.to_string()).collect(),
            UTTERANCE_INTERVAL,
        )
    }

    pub fn with_phrases(phrases: Vec<String>, interval: Duration) -> Self {
        Self {
            phrases,
            next: 0,
            interval,
        }
    }
}

impl Default for MockTranscription {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptionSource for MockTranscription {
    async fn next_utterance(&mut self) -> Result<Option<String>, AnalyzerError> {
        if self.next >= self.phrases.len() {
            return Ok(None);
        }

        // First phrase is delivered immediately, the rest are paced.
        if self.next > 0 {
            sleep(self.interval).await;
        }

        let phrase = self.phrases[self.next].clone();
        self.next += 1;
        Ok(Some(phrase))
    }
}

/// Draws random sentiment and keyword/entity hits after a fixed delay.
pub struct MockAnalysis {
    rng: StdRng,
    latency: Duration,
}

impl MockAnalysis {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            latency: ANALYSIS_LATENCY,
        }
    }

    /// Deterministic variant for reproducible runs.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            latency: Duration::ZERO,
        }
    }

    fn draw(&mut self) -> RawAnalysis {
        let sentiment = self.rng.gen::<f64>() * 100.0;
        let keywords: Vec<String> = KEYWORD_POOL
            .iter()
            .filter(|_| self.rng.gen_bool(0.5))
            .map(|k| k.to_string())
            .collect();
        let entities: Vec<String> = ENTITY_POOL
            .iter()
            .filter(|_| self.rng.gen_bool(0.5))
            .map(|e| e.to_string())
            .collect();

        RawAnalysis {
            sentiment: Some(sentiment),
            keywords: Some(keywords),
            entities: Some(entities),
        }
    }
}

impl Default for MockAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisSource for MockAnalysis {
    async fn analyze(&mut self, _text: &str) -> Result<RawAnalysis, AnalyzerError> {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        Ok(self.draw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transcription_replays_phrases_in_order_then_ends() {
        let mut source = MockTranscription::with_phrases(
            vec!["one".to_string(), "two".to_string()],
            Duration::ZERO,
        );

        assert_eq!(source.next_utterance().await.unwrap().as_deref(), Some("one"));
        assert_eq!(source.next_utterance().await.unwrap().as_deref(), Some("two"));
        assert_eq!(source.next_utterance().await.unwrap(), None);
        // Stays exhausted.
        assert_eq!(source.next_utterance().await.unwrap(), None);
    }

    #[tokio::test]
    async fn seeded_analysis_stays_within_domain() {
        let mut source = MockAnalysis::with_seed(7);

        for _ in 0..50 {
            let nlp = source.analyze("anything").await.unwrap().validate().unwrap();
            assert!((0.0..100.0).contains(&nlp.sentiment));
            assert!(nlp.keywords.iter().all(|k| KEYWORD_POOL.contains(&k.as_str())));
            assert!(nlp.entities.iter().all(|e| ENTITY_POOL.contains(&e.as_str())));
        }
    }

    #[tokio::test]
    async fn seeded_analysis_is_reproducible() {
        let mut a = MockAnalysis::with_seed(42);
        let mut b = MockAnalysis::with_seed(42);

        for _ in 0..10 {
            let left = a.analyze("x").await.unwrap();
            let right = b.analyze("x").await.unwrap();
            assert_eq!(left.sentiment, right.sentiment);
            assert_eq!(left.keywords, right.keywords);
            assert_eq!(left.entities, right.entities);
        }
    }
}
