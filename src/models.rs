//! Data models for the visibility analyzer.
//!
//! This module contains the records produced while scanning model
//! responses and the metadata attached to a run's outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// URLs and domains found in a piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Every URL in left-to-right order, duplicates kept.
    pub full_urls: Vec<String>,
    /// Distinct domains from bare hostnames and URL hosts.
    pub domains: BTreeSet<String>,
}

/// Structured analysis of one model response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// URLs and domains referenced by the response.
    pub resources: ExtractionResult,
    /// Matched brands, in brand-list order.
    pub products: Vec<String>,
    /// Character count of the response text.
    pub response_length: usize,
}

/// One attempted question and, if the model answered, its analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// The question as submitted.
    pub question: String,
    /// Response text, absent when the request failed.
    pub response: Option<String>,
    /// Analysis of the response, absent when the request failed.
    pub analysis: Option<AnalysisRecord>,
}

impl ResultEntry {
    /// Creates an entry for an answered question.
    pub fn answered(question: String, response: String, analysis: AnalysisRecord) -> Self {
        Self {
            question,
            response: Some(response),
            analysis: Some(analysis),
        }
    }

    /// Creates an entry for a question the model client failed on.
    pub fn unanswered(question: String) -> Self {
        Self {
            question,
            response: None,
            analysis: None,
        }
    }

    /// Whether the model produced a response for this question.
    pub fn is_answered(&self) -> bool {
        self.response.is_some()
    }
}

/// Run metadata shown in the report header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Model identifier the questions were sent to.
    pub model: String,
    /// System prompt text.
    pub system_prompt: String,
    /// User prompt template, including its `{question}` placeholder.
    pub user_prompt: String,
    /// Every question submitted in this run, in order.
    pub questions: Vec<String>,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
}

/// Summary object written alongside the detailed results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Domain -> number of responses that referenced it.
    pub domain_counts: BTreeMap<String, usize>,
    /// Brand -> number of responses that mentioned it.
    pub brand_counts: BTreeMap<String, usize>,
    /// Questions that produced a response. Failed requests are not counted.
    pub total_processed: usize,
    /// Questions whose request failed.
    pub failed: usize,
    /// Model identifier.
    pub model: String,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
}
