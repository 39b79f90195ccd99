//! Incremental call-analysis aggregator.
//!
//! Folds one `(utterance, analysis result)` pair at a time into the
//! running session state: segment list, cumulative summary, effectiveness
//! score and sentiment series. Pure state transition; callers serialize
//! invocations (there is a single logical writer per session).

use crate::analysis::config::AnalysisConfig;
use crate::analysis::scoring::{detect_signals, effectiveness_increment};
use crate::error::AnalyzerError;
use crate::session::state::{AnalysisSummary, CallSegment, SentimentSample, SessionState};
use crate::sources::{NlpResult, RawAnalysis};

/// Fold one utterance and its raw analysis record into `state`.
///
/// The record is validated before anything is touched, so a malformed
/// record leaves the session exactly as it was. Replaying the same
/// utterance is not idempotent: ingestion is an append, and the score
/// increment applies again.
pub fn ingest(
    state: &mut SessionState,
    text: &str,
    raw: RawAnalysis,
    config: &AnalysisConfig,
) -> Result<(), AnalyzerError> {
    let nlp = raw.validate()?;
    apply(state, text, &nlp, config);
    Ok(())
}

fn apply(state: &mut SessionState, text: &str, nlp: &NlpResult, config: &AnalysisConfig) {
    state.segments.push(CallSegment {
        text: text.to_string(),
        sentiment: nlp.sentiment,
        keywords: nlp.keywords.clone(),
        entities: nlp.entities.clone(),
    });

    // Word stats are recomputed over the whole transcript each time. The
    // transcript is split on the literal space character, so runs of
    // spaces produce empty "words" that count toward both metrics. That
    // matches the behavior this tool has always had; tests pin it.
    let transcript = state.transcript();
    let words: Vec<&str> = transcript.split(' ').collect();
    let word_count = words.len();
    let average_word_length =
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / word_count as f64;

    let signals = detect_signals(text, nlp, config);

    let increment = effectiveness_increment(&signals, config);
    state.effectiveness = state.effectiveness.saturating_add(increment).min(config.max_score);

    let (mut keywords, mut entities) = match state.summary.take() {
        Some(summary) => (summary.keywords, summary.entities),
        None => (Vec::new(), Vec::new()),
    };
    extend_union(&mut keywords, &nlp.keywords);
    extend_union(&mut entities, &nlp.entities);

    state.summary = Some(AnalysisSummary {
        word_count,
        average_word_length,
        contains_product_mention: signals.product_mention,
        contains_value_proposition: signals.value_proposition,
        mentions_statistics: signals.statistics,
        asks_questions: signals.question,
        keywords,
        entities,
    });

    state.sentiment_series.push(SentimentSample {
        time_secs: state.sentiment_series.len() as u32 * config.seconds_per_segment,
        sentiment: nlp.sentiment,
    });
}

/// Append items not already present, preserving first-seen order.
fn extend_union(accumulated: &mut Vec<String>, incoming: &[String]) {
    for item in incoming {
        if !accumulated.iter().any(|existing| existing == item) {
            accumulated.push(item.clone());
        }
    }
}
