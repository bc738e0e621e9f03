//! Topical categorization using weighted keyword rule sets.
//!
//! Tickets are scored against each candidate category; reviews are bucketed
//! by rating. Themes and issues are independent membership tests and do not
//! depend on the chosen category.

use crate::config::{CategorizationConfig, CategoryRule, KeywordGroup};
use crate::models::{AnalysisSubject, ReviewSubject};

use super::report::Categorization;
use super::signals::{matched_groups, matched_keywords, normalize_groups, normalize_keywords, Signals};

pub const POSITIVE_FEEDBACK: &str = "positive_feedback";
pub const NEGATIVE_FEEDBACK: &str = "negative_feedback";
pub const NEUTRAL_FEEDBACK: &str = "neutral_feedback";

/// Categories produced for reviews
pub const REVIEW_CATEGORIES: [&str; 3] = [POSITIVE_FEEDBACK, NEGATIVE_FEEDBACK, NEUTRAL_FEEDBACK];

/// Score of one candidate category
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    pub category: String,
    pub match_count: usize,
    pub confidence: f32,
}

pub struct Categorizer {
    config: CategorizationConfig,
    themes: Vec<KeywordGroup>,
    issues: Vec<String>,
}

impl Categorizer {
    pub fn new(config: &CategorizationConfig) -> Self {
        let mut config = config.clone();
        config.categories = config
            .categories
            .into_iter()
            .map(|rule| CategoryRule {
                keywords: normalize_keywords(&rule.keywords),
                subcategories: normalize_keywords(&rule.subcategories),
                name: rule.name,
            })
            .collect();

        Self {
            themes: normalize_groups(&config.themes),
            issues: normalize_keywords(&config.issues),
            config,
        }
    }

    pub fn categorize(&self, signals: &Signals, subject: &AnalysisSubject) -> Categorization {
        match subject {
            AnalysisSubject::Ticket(_) => self.categorize_ticket(&signals.normalized_text),
            AnalysisSubject::Review(review) => {
                self.categorize_review(&signals.normalized_text, review)
            }
        }
    }

    /// Scores every candidate with at least one keyword match, in declared order.
    pub fn score_candidates(&self, text: &str) -> Vec<CandidateScore> {
        self.config
            .categories
            .iter()
            .filter_map(|rule| {
                let match_count = matched_keywords(text, &rule.keywords).len();
                if match_count == 0 {
                    return None;
                }
                let confidence = (self.config.base_confidence
                    + self.config.per_match_bonus * match_count as f32)
                    .min(self.config.max_confidence)
                    .clamp(0.0, 1.0);
                Some(CandidateScore {
                    category: rule.name.clone(),
                    match_count,
                    confidence,
                })
            })
            .collect()
    }

    fn categorize_ticket(&self, text: &str) -> Categorization {
        // Earlier candidates keep ties.
        let best = self
            .score_candidates(text)
            .into_iter()
            .fold(None::<CandidateScore>, |best, candidate| match best {
                Some(b) if b.confidence >= candidate.confidence => Some(b),
                _ => Some(candidate),
            })
            .filter(|b| b.confidence > self.config.floor);

        let (category, subcategory, confidence) = match best {
            Some(best) => {
                let subcategory = self.subcategory_for(&best.category, text);
                (best.category, subcategory, best.confidence)
            }
            None => (
                self.config.fallback_category.clone(),
                self.config.fallback_subcategory.clone(),
                self.config.floor,
            ),
        };

        Categorization {
            category,
            subcategory,
            confidence,
            themes: matched_groups(text, &self.themes),
            issues: matched_keywords(text, &self.issues),
        }
    }

    fn categorize_review(&self, text: &str, review: &ReviewSubject) -> Categorization {
        let rules = &self.config.review;
        let category = if review.rating >= rules.positive_min_rating {
            POSITIVE_FEEDBACK
        } else if review.rating <= rules.negative_max_rating {
            NEGATIVE_FEEDBACK
        } else {
            NEUTRAL_FEEDBACK
        };

        let themes = matched_groups(text, &self.themes);
        let issues = if review.rating <= rules.issues_max_rating {
            matched_keywords(text, &self.issues)
        } else {
            Vec::new()
        };

        Categorization {
            category: category.to_string(),
            subcategory: themes
                .first()
                .cloned()
                .unwrap_or_else(|| rules.default_subcategory.clone()),
            confidence: rules.confidence,
            themes,
            issues,
        }
    }

    /// First subcategory found in the text, else the rule's first subcategory.
    fn subcategory_for(&self, category: &str, text: &str) -> String {
        let Some(rule) = self.config.categories.iter().find(|r| r.name == category) else {
            return self.config.fallback_subcategory.clone();
        };

        rule.subcategories
            .iter()
            .find(|s| text.contains(s.as_str()))
            .or_else(|| rule.subcategories.first())
            .cloned()
            .unwrap_or_else(|| self.config.fallback_subcategory.clone())
    }
}
