use crate::analysis::config::AnalysisConfig;
use crate::sources::NlpResult;

/// Scoring signals detected on a single utterance.
///
/// Evaluated against the newest segment only; history does not factor in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSignals {
    pub product_mention: bool,
    pub value_proposition: bool,
    pub statistics: bool,
    pub question: bool,
}

/// Evaluate the four scoring predicates for one utterance.
pub fn detect_signals(text: &str, nlp: &NlpResult, config: &AnalysisConfig) -> SegmentSignals {
    let product_mention = nlp.keywords.iter().any(|k| *k == config.product_keyword);
    let value_proposition = nlp
        .keywords
        .iter()
        .any(|k| config.value_keywords.contains(k));
    let statistics = nlp
        .entities
        .iter()
        .any(|e| e.contains(&config.statistic_marker));
    let question = text.contains('?');

    SegmentSignals {
        product_mention,
        value_proposition,
        statistics,
        question,
    }
}

/// Points this utterance contributes to the running effectiveness score.
pub fn effectiveness_increment(signals: &SegmentSignals, config: &AnalysisConfig) -> u32 {
    let mut increment = 0;
    if signals.product_mention {
        increment += config.product_points;
    }
    if signals.value_proposition {
        increment += config.value_points;
    }
    if signals.statistics {
        increment += config.statistic_points;
    }
    if signals.question {
        increment += config.question_points;
    }
    increment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nlp(keywords: &[&str], entities: &[&str]) -> NlpResult {
        NlpResult {
            sentiment: 50.0,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            entities: entities.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn value_proposition_and_statistics() {
        let config = AnalysisConfig::default();
        let signals = detect_signals(
            "Our efficiency grew 30% this year",
            &nlp(&["efficiency"], &["30%"]),
            &config,
        );

        assert!(!signals.product_mention);
        assert!(signals.value_proposition);
        assert!(signals.statistics);
        assert!(!signals.question);
        assert_eq!(effectiveness_increment(&signals, &config), 40);
    }

    #[test]
    fn question_alone_scores_twenty() {
        let config = AnalysisConfig::default();
        let signals = detect_signals("Do you have a few minutes?", &nlp(&[], &[]), &config);

        assert!(signals.question);
        assert!(!signals.product_mention);
        assert!(!signals.value_proposition);
        assert!(!signals.statistics);
        assert_eq!(effectiveness_increment(&signals, &config), 20);
    }

    #[test]
    fn all_signals_sum_to_seventy_five() {
        let config = AnalysisConfig::default();
        let signals = detect_signals(
            "Would our product cut costs by 30%?",
            &nlp(&["product", "cost-saving"], &["30%"]),
            &config,
        );

        assert!(signals.product_mention);
        assert!(signals.value_proposition);
        assert!(signals.statistics);
        assert!(signals.question);
        assert_eq!(effectiveness_increment(&signals, &config), 75);
    }

    #[test]
    fn statistic_marker_matches_as_substring() {
        let config = AnalysisConfig::default();
        let signals = detect_signals("growth", &nlp(&[], &["up 30% YoY"]), &config);
        assert!(signals.statistics);

        let signals = detect_signals("growth", &nlp(&[], &["XYZ Company"]), &config);
        assert!(!signals.statistics);
    }

    #[test]
    fn product_keyword_requires_exact_match() {
        let config = AnalysisConfig::default();
        let signals = detect_signals("intro", &nlp(&["production"], &[]), &config);
        assert!(!signals.product_mention);
    }
}
