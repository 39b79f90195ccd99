/// Configuration for signal detection and effectiveness scoring.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Keyword that counts as a product mention.
    pub product_keyword: String,

    /// Keywords that count as a value proposition.
    pub value_keywords: Vec<String>,

    /// Substring that marks an entity as a statistic (e.g. "30%").
    pub statistic_marker: String,

    /// Points awarded per detected signal.
    pub product_points: u32,
    pub value_points: u32,
    pub statistic_points: u32,
    pub question_points: u32,

    /// Effectiveness ceiling; the running score never exceeds this.
    pub max_score: u32,

    /// Nominal duration of one utterance, used to place sentiment samples
    /// on the time axis (not derived from real audio timing).
    pub seconds_per_segment: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            product_keyword: "product".to_string(),
            value_keywords: vec!["efficiency".to_string(), "cost-saving".to_string()],
            statistic_marker: "%".to_string(),
            product_points: 15,
            value_points: 20,
            statistic_points: 20,
            question_points: 20,
            max_score: 100,
            seconds_per_segment: 2,
        }
    }
}
