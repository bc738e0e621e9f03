//! Smart response composition.
//!
//! Picks a template from the `(category, urgency)` table (or the rating tier
//! for reviews), personalizes it, and decides tone, human review, suggested
//! actions and the resolution estimate.

use crate::config::{lookup, lookup_cell, ResponseConfig};
use crate::error::AppError;
use crate::models::{AnalysisSubject, ReviewSubject};

use super::categorizer::{NEGATIVE_FEEDBACK, POSITIVE_FEEDBACK};
use super::report::{
    Categorization, ReviewModeration, Sentiment, SentimentResult, SmartResponse, Tone, Urgency,
};

const COMPLAINT: &str = "complaint";

pub struct ResponseComposer {
    config: ResponseConfig,
}

/// First matching rule wins.
pub fn choose_tone(sentiment: Sentiment, urgency: Urgency) -> Tone {
    if urgency == Urgency::Critical || sentiment == Sentiment::Negative {
        Tone::Apologetic
    } else if sentiment == Sentiment::Positive {
        Tone::Friendly
    } else if urgency == Urgency::High {
        Tone::Professional
    } else {
        Tone::Formal
    }
}

impl ResponseComposer {
    pub fn new(config: &ResponseConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Composes the response. Reviews also get a publication decision.
    pub fn compose(
        &self,
        subject: &AnalysisSubject,
        sentiment: &SentimentResult,
        categorization: &Categorization,
    ) -> Result<(SmartResponse, Option<ReviewModeration>), AppError> {
        match subject {
            AnalysisSubject::Ticket(_) => {
                let response = self.compose_ticket(subject, sentiment, categorization)?;
                Ok((response, None))
            }
            AnalysisSubject::Review(review) => {
                let response = self.compose_review(subject, review, sentiment, categorization)?;
                let moderation = moderate(&categorization.category, sentiment.sentiment);
                Ok((response, Some(moderation)))
            }
        }
    }

    fn compose_ticket(
        &self,
        subject: &AnalysisSubject,
        sentiment: &SentimentResult,
        categorization: &Categorization,
    ) -> Result<SmartResponse, AppError> {
        let category = categorization.category.as_str();
        let urgency = sentiment.urgency;

        let template = lookup_cell(&self.config.templates, "response.templates", category, urgency)?;
        let confidence = self.confidence(category, urgency, subject.body());
        let requires_human = urgency == Urgency::Critical
            || confidence < self.config.weights.human_threshold
            || (category == COMPLAINT && urgency == Urgency::High);
        let estimated_resolution_minutes = *lookup_cell(
            &self.config.resolution_minutes,
            "response.resolution_minutes",
            category,
            urgency,
        )?;

        Ok(SmartResponse {
            text: self.personalize(template, subject, categorization),
            confidence,
            tone: choose_tone(sentiment.sentiment, urgency),
            requires_human,
            suggested_actions: self.actions(category, urgency)?,
            estimated_resolution_minutes,
        })
    }

    fn compose_review(
        &self,
        subject: &AnalysisSubject,
        review: &ReviewSubject,
        sentiment: &SentimentResult,
        categorization: &Categorization,
    ) -> Result<SmartResponse, AppError> {
        let category = categorization.category.as_str();
        let urgency = sentiment.urgency;

        let template = lookup(&self.config.review_templates, "response.review_templates", category)?;
        let estimated_resolution_minutes = *lookup(
            &self.config.review_resolution_minutes,
            "response.review_resolution_minutes",
            category,
        )?;

        Ok(SmartResponse {
            text: self.personalize(template, subject, categorization),
            confidence: self.confidence(category, urgency, subject.body()),
            tone: choose_tone(sentiment.sentiment, urgency),
            requires_human: review.rating <= self.config.review_human_max_rating,
            suggested_actions: self.actions(category, urgency)?,
            estimated_resolution_minutes,
        })
    }

    fn confidence(&self, category: &str, urgency: Urgency, body: &str) -> f32 {
        let w = &self.config.weights;
        let mut confidence = w.base_confidence;

        if w.expert_categories.iter().any(|c| c == category) {
            confidence += w.expert_bonus;
        }
        if urgency == Urgency::Critical {
            confidence -= w.critical_penalty;
        }
        if body.chars().count() < w.short_message_chars {
            confidence += w.short_message_bonus;
        }

        confidence.clamp(w.min_confidence, w.max_confidence)
    }

    fn actions(&self, category: &str, urgency: Urgency) -> Result<Vec<String>, AppError> {
        let mut actions = lookup(
            &self.config.suggested_actions,
            "response.suggested_actions",
            category,
        )?
        .clone();
        if urgency == Urgency::Critical {
            actions.extend(self.config.critical_actions.iter().cloned());
        }
        Ok(actions)
    }

    fn personalize(
        &self,
        template: &str,
        subject: &AnalysisSubject,
        categorization: &Categorization,
    ) -> String {
        let name = subject
            .customer_name()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.config.default_customer_name);

        template
            .replace("{name}", name)
            .replace("{subject}", subject.heading().trim())
            .replace("{subcategory}", &categorization.subcategory)
    }
}

/// Positive reviews publish, negative ones wait for a moderator, neutral ones
/// publish unless the text reads negative.
fn moderate(category: &str, sentiment: Sentiment) -> ReviewModeration {
    let auto_publish = if category == POSITIVE_FEEDBACK {
        true
    } else if category == NEGATIVE_FEEDBACK {
        false
    } else {
        sentiment != Sentiment::Negative
    };

    ReviewModeration {
        auto_publish,
        requires_moderation: !auto_publish,
    }
}
