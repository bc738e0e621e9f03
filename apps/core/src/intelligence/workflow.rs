//! Workflow routing recommendations.

use regex::Regex;

use crate::config::{lookup, lookup_cell, WorkflowConfig};
use crate::error::AppError;

use super::report::{Categorization, Urgency, WorkflowOptimization};

struct CompiledTrigger {
    pattern: Regex,
    suggestion: String,
}

pub struct WorkflowOptimizer {
    config: WorkflowConfig,
    triggers: Vec<CompiledTrigger>,
}

impl WorkflowOptimizer {
    /// Fails if an automation trigger pattern does not compile.
    pub fn new(config: &WorkflowConfig) -> Result<Self, AppError> {
        let triggers = config
            .automation
            .iter()
            .map(|t| -> Result<CompiledTrigger, AppError> {
                Ok(CompiledTrigger {
                    pattern: Regex::new(&t.pattern)?,
                    suggestion: t.suggestion.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config: config.clone(),
            triggers,
        })
    }

    pub fn optimize(
        &self,
        categorization: &Categorization,
        urgency: Urgency,
        text: &str,
    ) -> Result<WorkflowOptimization, AppError> {
        let category = categorization.category.as_str();

        Ok(WorkflowOptimization {
            recommended_agent: self.recommended_agent(category, urgency),
            estimated_resolution_minutes: *lookup_cell(
                &self.config.resolution_minutes,
                "workflow.resolution_minutes",
                category,
                urgency,
            )?,
            priority_score: self.priority_score(category, urgency)?,
            suggested_next_steps: lookup(&self.config.next_steps, "workflow.next_steps", category)?
                .clone(),
            automation_opportunities: self.automation_opportunities(text),
        })
    }

    /// Agent pool for the category, senior variant from `senior_from` upwards.
    /// Categories without a pool get no recommendation.
    pub fn recommended_agent(&self, category: &str, urgency: Urgency) -> Option<String> {
        let pool = self.config.agent_pools.get(category)?;
        if urgency >= self.config.senior_from {
            Some(format!("{}{}", pool, self.config.senior_suffix))
        } else {
            Some(pool.clone())
        }
    }

    pub fn priority_score(&self, category: &str, urgency: Urgency) -> Result<u8, AppError> {
        let urgency_points = lookup(
            &self.config.urgency_points,
            "workflow.urgency_points",
            urgency.as_str(),
        )?;
        let category_points = lookup(
            &self.config.category_points,
            "workflow.category_points",
            category,
        )?;

        let score = (urgency_points + category_points).clamp(
            self.config.min_priority_score as i32,
            self.config.max_priority_score as i32,
        );
        Ok(score as u8)
    }

    /// One suggestion per matching trigger, in configuration order.
    pub fn automation_opportunities(&self, text: &str) -> Vec<String> {
        self.triggers
            .iter()
            .filter(|t| t.pattern.is_match(text))
            .map(|t| t.suggestion.clone())
            .collect()
    }
}
