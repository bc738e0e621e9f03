//! Helpdesk intelligence core.
//!
//! Turns a support ticket or a product review into a structured report:
//! sentiment, category, a templated reply, escalation risk and workflow
//! routing. Everything is deterministic and driven by
//! [`config::IntelligenceConfig`].

pub mod actors;
pub mod config;
pub mod error;
pub mod intelligence;
pub mod models;
pub mod telemetry;

pub use actors::IntelligenceHandle;
pub use config::IntelligenceConfig;
pub use error::AppError;
pub use intelligence::{AnalysisOrchestrator, AnalysisReport};
pub use models::{AnalysisSubject, ReviewSubject, TicketSubject};

#[cfg(test)]
mod tests;
