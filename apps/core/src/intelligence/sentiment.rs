//! Sentiment and urgency classification.
//!
//! Deterministic decision table over signal counts plus the priority or
//! rating declared on the subject.

use crate::config::SentimentConfig;
use crate::models::AnalysisSubject;

use super::report::{Sentiment, SentimentResult, Urgency};
use super::signals::Signals;

pub struct SentimentClassifier {
    config: SentimentConfig,
}

impl SentimentClassifier {
    pub fn new(config: &SentimentConfig) -> Self {
        let mut config = config.clone();
        config.ticket_priorities = config
            .ticket_priorities
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        Self { config }
    }

    pub fn classify(&self, signals: &Signals, subject: &AnalysisSubject) -> SentimentResult {
        let (sentiment, confidence) = self.polarity(signals);

        SentimentResult {
            sentiment,
            confidence,
            emotions: signals.emotions.clone(),
            urgency: self.urgency(signals.urgent_hits, subject),
        }
    }

    fn polarity(&self, signals: &Signals) -> (Sentiment, f32) {
        let (sentiment, winning_hits) = if signals.positive_hits > signals.negative_hits {
            (Sentiment::Positive, signals.positive_hits)
        } else if signals.negative_hits > signals.positive_hits {
            (Sentiment::Negative, signals.negative_hits)
        } else {
            return (Sentiment::Neutral, self.config.neutral_confidence);
        };

        let confidence = (self.config.base_confidence
            + self.config.per_hit_bonus * winning_hits as f32)
            .min(self.config.max_confidence)
            .clamp(0.0, 1.0);

        (sentiment, confidence)
    }

    /// The tier reached by urgent keyword hits is a floor over the tier
    /// declared on the subject (ticket priority or review rating). Adding an
    /// urgent keyword can therefore never lower urgency.
    pub fn urgency(&self, urgent_hits: usize, subject: &AnalysisSubject) -> Urgency {
        let declared = self.declared_urgency(subject);
        match self.keyword_urgency(urgent_hits) {
            Some(from_keywords) => from_keywords.max(declared),
            None => declared,
        }
    }

    fn keyword_urgency(&self, urgent_hits: usize) -> Option<Urgency> {
        if urgent_hits >= self.config.critical_urgent_hits {
            Some(Urgency::Critical)
        } else if urgent_hits >= self.config.high_urgent_hits {
            Some(Urgency::High)
        } else {
            None
        }
    }

    fn declared_urgency(&self, subject: &AnalysisSubject) -> Urgency {
        match subject {
            AnalysisSubject::Review(review) => {
                if review.rating <= self.config.review_high_max_rating {
                    Urgency::High
                } else if review.rating >= self.config.review_low_min_rating {
                    Urgency::Low
                } else {
                    Urgency::Medium
                }
            }
            AnalysisSubject::Ticket(ticket) => ticket
                .priority
                .as_deref()
                .and_then(|p| self.config.ticket_priorities.get(&p.trim().to_lowercase()))
                .copied()
                .unwrap_or(self.config.default_urgency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntelligenceConfig;
    use crate::models::{ReviewSubject, TicketSubject};

    fn classifier() -> SentimentClassifier {
        SentimentClassifier::new(&IntelligenceConfig::builtin().unwrap().sentiment)
    }

    fn signals(positive: usize, negative: usize, urgent: usize) -> Signals {
        Signals {
            positive_hits: positive,
            negative_hits: negative,
            urgent_hits: urgent,
            ..Signals::default()
        }
    }

    fn ticket(priority: Option<&str>) -> AnalysisSubject {
        let mut t = TicketSubject::new("s", "m");
        t.priority = priority.map(str::to_string);
        AnalysisSubject::Ticket(t)
    }

    fn review(rating: u8) -> AnalysisSubject {
        AnalysisSubject::Review(ReviewSubject::new("", "c", rating))
    }

    #[test]
    fn test_polarity() {
        let c = classifier();

        let result = c.classify(&signals(2, 0, 0), &ticket(None));
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert!((result.confidence - 0.8).abs() < 1e-6);

        let result = c.classify(&signals(1, 3, 0), &ticket(None));
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert!((result.confidence - 0.9).abs() < 1e-6);

        let result = c.classify(&signals(2, 2, 0), &ticket(None));
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_confidence_capped() {
        let result = classifier().classify(&signals(12, 0, 0), &ticket(None));
        assert!((result.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_urgency_from_hits() {
        let c = classifier();
        assert_eq!(c.urgency(2, &ticket(Some("low"))), Urgency::Critical);
        assert_eq!(c.urgency(1, &ticket(Some("low"))), Urgency::High);
        assert_eq!(c.urgency(5, &review(5)), Urgency::Critical);
    }

    #[test]
    fn test_urgency_from_ticket_priority() {
        let c = classifier();
        assert_eq!(c.urgency(0, &ticket(Some("urgent"))), Urgency::Critical);
        assert_eq!(c.urgency(0, &ticket(Some("High"))), Urgency::High);
        assert_eq!(c.urgency(0, &ticket(Some("low"))), Urgency::Low);
        assert_eq!(c.urgency(0, &ticket(Some("normal"))), Urgency::Medium);
        assert_eq!(c.urgency(0, &ticket(None)), Urgency::Medium);
    }

    #[test]
    fn test_keyword_tier_never_lowers_declared_tier() {
        let c = classifier();
        assert_eq!(c.urgency(1, &ticket(Some("urgent"))), Urgency::Critical);
        assert_eq!(c.urgency(1, &ticket(Some("high"))), Urgency::High);
        assert_eq!(c.urgency(1, &review(1)), Urgency::High);
        assert_eq!(c.urgency(2, &review(1)), Urgency::Critical);
    }

    #[test]
    fn test_urgency_from_rating() {
        let c = classifier();
        assert_eq!(c.urgency(0, &review(1)), Urgency::High);
        assert_eq!(c.urgency(0, &review(2)), Urgency::High);
        assert_eq!(c.urgency(0, &review(3)), Urgency::Medium);
        assert_eq!(c.urgency(0, &review(4)), Urgency::Low);
    }
}
