use std::collections::BTreeMap;

use crate::config::KeywordWeights;
use crate::routing::TaskRequest;

pub const BASE_SCORE: f32 = 0.3;
const KEYWORD_MULTIPLIER: f32 = 0.3;
const SCOPE_MULTIPLIER: f32 = 0.2;
const TECHNOLOGY_MULTIPLIER: f32 = 0.1;
const PER_ARG: f32 = 0.05;
const MAX_ARG_BONUS: f32 = 0.2;
const PER_PREVIOUS_TASK: f32 = 0.02;
const MAX_HISTORY_BONUS: f32 = 0.1;

pub trait ComplexityAnalyzer: Send + Sync {
    /// Score a request in `[0.0, 1.0]`.
    fn score(&self, request: &TaskRequest) -> f32;
}

/// Additive keyword scorer.
///
/// Every table entry found as a substring of the request text contributes
/// `weight * multiplier`. Overlapping keywords (e.g. "ai" inside "maintain")
/// count independently.
#[derive(Debug, Clone)]
pub struct KeywordComplexityAnalyzer {
    weights: KeywordWeights,
}

impl KeywordComplexityAnalyzer {
    pub fn new(weights: KeywordWeights) -> Self {
        Self { weights }
    }

    fn table_contribution(text: &str, table: &BTreeMap<String, f32>, multiplier: f32) -> f32 {
        table
            .iter()
            .filter(|(word, _)| text.contains(word.as_str()))
            .map(|(_, weight)| weight * multiplier)
            .sum()
    }
}

impl Default for KeywordComplexityAnalyzer {
    fn default() -> Self {
        Self::new(KeywordWeights::default())
    }
}

impl ComplexityAnalyzer for KeywordComplexityAnalyzer {
    fn score(&self, request: &TaskRequest) -> f32 {
        let text = request.text();

        let mut score = BASE_SCORE;
        score += Self::table_contribution(&text, &self.weights.keywords, KEYWORD_MULTIPLIER);
        score += Self::table_contribution(&text, &self.weights.scope, SCOPE_MULTIPLIER);
        score += Self::table_contribution(&text, &self.weights.technology, TECHNOLOGY_MULTIPLIER);

        score += (request.args().len() as f32 * PER_ARG).min(MAX_ARG_BONUS);
        score += (request.previous_task_count() as f32 * PER_PREVIOUS_TASK).min(MAX_HISTORY_BONUS);

        if score.is_nan() {
            return BASE_SCORE;
        }
        score.clamp(0.0, 1.0)
    }
}
