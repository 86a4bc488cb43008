//! Keyword-scoring intent classifier.
//!
//! Every [`IntentRule`] owns a keyword list. A rule scores the summed
//! length of each keyword found as a substring of the lower-cased query,
//! so longer, more specific keywords weigh more. The highest score wins
//! and ties go to the rule declared first.
//!
//! Confidence is `score / query length in chars`. It is not normalized and
//! can exceed 1.0 for short queries; compare it only against other
//! confidences or a threshold.

use serde::{Deserialize, Serialize};

use crate::models::Category;

/// Confidence reported when no rule matches.
pub const DEFAULT_CONFIDENCE: f64 = 0.1;

/// Intent reported when no rule matches.
pub const DEFAULT_INTENT: Category = Category::Search;

// ============================================================================
// Rules
// ============================================================================

/// Keyword list of one intent category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRule {
    /// Category this rule votes for.
    pub category: Category,
    /// Keywords, matched case-insensitively as substrings.
    pub keywords: Vec<String>,
}

impl IntentRule {
    /// Creates a rule from a category and its keywords.
    pub fn new<I, S>(category: Category, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category,
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// Sums the lengths of all keywords contained in `lowered`.
    fn score(&self, lowered: &str) -> usize {
        self.keywords
            .iter()
            .filter(|kw| !kw.is_empty() && lowered.contains(kw.as_str()))
            .map(|kw| kw.chars().count())
            .sum()
    }
}

// ============================================================================
// Results
// ============================================================================

/// A scored category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentScore {
    /// The category.
    pub intent: Category,
    /// Raw keyword score.
    pub score: usize,
    /// `score / query length`.
    pub confidence: f64,
}

/// Classification of one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    /// Winning category.
    pub intent: Category,
    /// Confidence of the winner.
    pub confidence: f64,
    /// Other categories with a positive score, best first.
    pub alternatives: Vec<IntentScore>,
}

impl IntentResult {
    /// Returns true if no rule matched and the default intent was used.
    pub fn is_default(&self) -> bool {
        self.alternatives.is_empty()
            && self.intent == DEFAULT_INTENT
            && (self.confidence - DEFAULT_CONFIDENCE).abs() < f64::EPSILON
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Maps free text to a ranked [`Category`].
#[derive(Debug, Clone, Default)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl IntentClassifier {
    /// Creates a classifier. Rule order is the tie-break order.
    ///
    /// Keywords are lower-cased and trimmed once here.
    pub fn new(rules: Vec<IntentRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| IntentRule {
                category: rule.category,
                keywords: rule
                    .keywords
                    .into_iter()
                    .map(|kw| kw.trim().to_lowercase())
                    .filter(|kw| !kw.is_empty())
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    /// Returns the rules in declaration order.
    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// Classifies a query.
    pub fn classify(&self, query: &str) -> IntentResult {
        let lowered = query.to_lowercase();
        let length = query.chars().count();

        let mut scored: Vec<IntentScore> = self
            .rules
            .iter()
            .map(|rule| (rule.category, rule.score(&lowered)))
            .filter(|(_, score)| *score > 0)
            .map(|(intent, score)| IntentScore {
                intent,
                score,
                confidence: confidence(score, length),
            })
            .collect();

        if scored.is_empty() {
            return IntentResult {
                intent: DEFAULT_INTENT,
                confidence: DEFAULT_CONFIDENCE,
                alternatives: Vec::new(),
            };
        }

        // Stable sort keeps declaration order among equal scores.
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        let best = scored.remove(0);

        IntentResult {
            intent: best.intent,
            confidence: best.confidence,
            alternatives: scored,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn confidence(score: usize, length: usize) -> f64 {
    if length == 0 {
        return 0.0;
    }
    score as f64 / length as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new(vec![
            IntentRule::new(Category::News, ["news", "latest"]),
            IntentRule::new(Category::Weather, ["weather", "forecast"]),
            IntentRule::new(Category::Tech, ["news"]),
        ])
    }

    #[test]
    fn test_longer_keywords_weigh_more() {
        let result = classifier().classify("weather news");
        assert_eq!(result.intent, Category::Weather);
        assert_eq!(result.alternatives.len(), 2);
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        let result = classifier().classify("news");
        assert_eq!(result.intent, Category::News);
        assert_eq!(result.alternatives[0].intent, Category::Tech);
        assert_eq!(result.alternatives[0].score, 4);
    }

    #[test]
    fn test_confidence_can_exceed_one() {
        let c = IntentClassifier::new(vec![IntentRule::new(
            Category::Weather,
            ["weather", "eath"],
        )]);
        let result = c.classify("weather");
        assert!((result.confidence - 11.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_default_intent() {
        let result = classifier().classify("zzz");
        assert_eq!(result.intent, Category::Search);
        assert!((result.confidence - 0.1).abs() < f64::EPSILON);
        assert!(result.is_default());
    }

    #[test]
    fn test_keywords_are_normalized() {
        let c = IntentClassifier::new(vec![IntentRule::new(Category::Stocks, ["  NASDAQ "])]);
        assert_eq!(c.classify("Nasdaq today").intent, Category::Stocks);
    }

    #[test]
    fn test_empty_query_is_default() {
        assert!(classifier().classify("").is_default());
    }
}
