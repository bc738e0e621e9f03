use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

/// A support ticket as materialized by the upstream persistence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TicketSubject {
    /// Short subject line typed by the customer.
    pub subject: String,
    /// Free-form message body.
    pub message: String,
    /// Priority declared on the ticket form (`low`, `medium`, `high`, `urgent`, ...).
    #[serde(default)]
    pub priority: Option<String>,
    /// Category picked by the customer, if any.
    #[serde(default)]
    pub category_hint: Option<String>,
    /// Display name used to personalize the generated response.
    #[serde(default)]
    pub customer_name: Option<String>,
}

/// A product or service review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReviewSubject {
    #[serde(default)]
    pub title: String,
    pub comment: String,
    /// Star rating, 1 to 5.
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[serde(default)]
    pub customer_name: Option<String>,
}

/// Read-only snapshot of the record to analyze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisSubject {
    Ticket(TicketSubject),
    Review(ReviewSubject),
}

/// Discriminant of [`AnalysisSubject`], kept on the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Ticket,
    Review,
}

impl AnalysisSubject {
    /// Decodes a subject from JSON and validates its fields.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        let subject: AnalysisSubject = serde_json::from_str(raw)
            .map_err(|e| AppError::MalformedSubject(e.to_string()))?;
        subject.validate()?;
        Ok(subject)
    }

    /// Decodes a subject from an already parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, AppError> {
        let subject: AnalysisSubject = serde_json::from_value(value)
            .map_err(|e| AppError::MalformedSubject(e.to_string()))?;
        subject.validate()?;
        Ok(subject)
    }

    /// Checks field ranges. Subjects built directly in code bypass serde, so
    /// the orchestrator calls this again before analyzing.
    pub fn validate(&self) -> Result<(), AppError> {
        let result = match self {
            AnalysisSubject::Ticket(ticket) => ticket.validate(),
            AnalysisSubject::Review(review) => review.validate(),
        };
        result.map_err(|e| AppError::MalformedSubject(e.to_string()))
    }

    pub fn kind(&self) -> SubjectKind {
        match self {
            AnalysisSubject::Ticket(_) => SubjectKind::Ticket,
            AnalysisSubject::Review(_) => SubjectKind::Review,
        }
    }

    /// Text fed to the signal extractor: subject + message, or title + comment.
    pub fn combined_text(&self) -> String {
        let (head, body) = match self {
            AnalysisSubject::Ticket(t) => (t.subject.as_str(), t.message.as_str()),
            AnalysisSubject::Review(r) => (r.title.as_str(), r.comment.as_str()),
        };
        format!("{} {}", head, body)
    }

    /// The body alone (ticket message or review comment).
    pub fn body(&self) -> &str {
        match self {
            AnalysisSubject::Ticket(t) => &t.message,
            AnalysisSubject::Review(r) => &r.comment,
        }
    }

    /// The heading alone (ticket subject or review title).
    pub fn heading(&self) -> &str {
        match self {
            AnalysisSubject::Ticket(t) => &t.subject,
            AnalysisSubject::Review(r) => &r.title,
        }
    }

    pub fn customer_name(&self) -> Option<&str> {
        match self {
            AnalysisSubject::Ticket(t) => t.customer_name.as_deref(),
            AnalysisSubject::Review(r) => r.customer_name.as_deref(),
        }
    }
}

impl TicketSubject {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
            priority: None,
            category_hint: None,
            customer_name: None,
        }
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }
}

impl ReviewSubject {
    pub fn new(title: impl Into<String>, comment: impl Into<String>, rating: u8) -> Self {
        Self {
            title: title.into(),
            comment: comment.into(),
            rating,
            customer_name: None,
        }
    }
}
