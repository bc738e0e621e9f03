//! Signal extraction from raw ticket/review text.
//!
//! Pure keyword matching: the text is normalized once, then each lexicon
//! entry is tested as a case-insensitive substring.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::{KeywordGroup, Lexicon};

/// Keyword hit counts and emotion tags for one text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    /// Lowercased, whitespace-collapsed text
    pub normalized_text: String,
    pub positive_hits: usize,
    pub negative_hits: usize,
    pub urgent_hits: usize,
    pub emotions: BTreeSet<String>,
}

/// Lowercases and collapses whitespace runs to single spaces.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| normalize(k))
        .filter(|k| !k.is_empty())
        .collect()
}

pub(crate) fn normalize_groups(groups: &[KeywordGroup]) -> Vec<KeywordGroup> {
    groups
        .iter()
        .map(|g| KeywordGroup {
            name: g.name.clone(),
            keywords: normalize_keywords(&g.keywords),
        })
        .collect()
}

/// Number of distinct keywords found in `text`.
pub(crate) fn count_hits(text: &str, keywords: &[String]) -> usize {
    if text.is_empty() {
        return 0;
    }
    keywords.iter().filter(|k| text.contains(k.as_str())).count()
}

/// Keywords found in `text`, in lexicon order.
pub(crate) fn matched_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| !text.is_empty() && text.contains(k.as_str()))
        .cloned()
        .collect()
}

/// Names of the groups with at least one keyword in `text`, in group order.
pub(crate) fn matched_groups(text: &str, groups: &[KeywordGroup]) -> Vec<String> {
    groups
        .iter()
        .filter(|g| count_hits(text, &g.keywords) > 0)
        .map(|g| g.name.clone())
        .collect()
}

pub struct SignalExtractor {
    positive: Vec<String>,
    negative: Vec<String>,
    urgent: Vec<String>,
    emotions: Vec<KeywordGroup>,
}

impl SignalExtractor {
    pub fn new(lexicon: &Lexicon) -> Self {
        Self {
            positive: normalize_keywords(&lexicon.positive),
            negative: normalize_keywords(&lexicon.negative),
            urgent: normalize_keywords(&lexicon.urgent),
            emotions: normalize_groups(&lexicon.emotions),
        }
    }

    /// Extracts signals from free text. Blank text yields zero hits.
    pub fn extract(&self, text: &str) -> Signals {
        let normalized_text = normalize(text);

        Signals {
            positive_hits: count_hits(&normalized_text, &self.positive),
            negative_hits: count_hits(&normalized_text, &self.negative),
            urgent_hits: count_hits(&normalized_text, &self.urgent),
            emotions: matched_groups(&normalized_text, &self.emotions)
                .into_iter()
                .collect(),
            normalized_text,
        }
    }
}
