//! JSON outputs: the detailed results array and the run summary.

use crate::analysis::AggregateCounts;
use crate::models::{ResultEntry, RunMetadata, RunSummary};
use anyhow::Result;

/// Build the summary object for a run.
pub fn build_summary(
    entries: &[ResultEntry],
    counts: &AggregateCounts,
    metadata: &RunMetadata,
) -> RunSummary {
    let total_processed = entries.iter().filter(|e| e.is_answered()).count();

    RunSummary {
        domain_counts: counts.domains.clone(),
        brand_counts: counts.brands.clone(),
        total_processed,
        failed: entries.len() - total_processed,
        model: metadata.model.clone(),
        generated_at: metadata.generated_at,
    }
}

/// One object per question with `question`, `response`, `analysis`.
pub fn generate_results_json(entries: &[ResultEntry]) -> Result<String> {
    serde_json::to_string_pretty(entries).map_err(Into::into)
}

pub fn generate_summary_json(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}
