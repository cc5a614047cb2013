//! Mention aggregation and statistics.
//!
//! This module folds per-response analysis records into run-wide
//! frequency tables of domains and brands.

use crate::analysis::extractor::BrandList;
use crate::models::AnalysisRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Domain and brand frequency tables for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCounts {
    pub domains: BTreeMap<String, usize>,
    pub brands: BTreeMap<String, usize>,
}

impl AggregateCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the counts.
    pub fn record(&mut self, analysis: &AnalysisRecord) {
        for domain in &analysis.resources.domains {
            *self.domains.entry(domain.clone()).or_default() += 1;
        }
        for brand in &analysis.products {
            *self.brands.entry(brand.clone()).or_default() += 1;
        }
    }

    pub fn brand_count(&self, brand: &str) -> usize {
        self.brands.get(brand).copied().unwrap_or(0)
    }

    /// One row per brand in list order, zero counts included.
    pub fn brand_table<'a>(&self, brands: &'a BrandList) -> Vec<(&'a str, usize)> {
        brands
            .iter()
            .map(|brand| (brand.as_str(), self.brand_count(brand)))
            .collect()
    }

    /// Brands with at least one mention, most mentioned first.
    pub fn top_brands(&self) -> Vec<(&str, usize)> {
        ranked(&self.brands)
    }

    /// The `n` most referenced domains.
    pub fn top_domains(&self, n: usize) -> Vec<(&str, usize)> {
        let mut domains = ranked(&self.domains);
        domains.truncate(n);
        domains
    }
}

/// Sort by count descending, then by key.
fn ranked(counts: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut rows: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractionResult;

    fn record(domains: &[&str], products: &[&str]) -> AnalysisRecord {
        AnalysisRecord {
            resources: ExtractionResult {
                full_urls: Vec::new(),
                domains: domains.iter().map(|d| d.to_string()).collect(),
            },
            products: products.iter().map(|p| p.to_string()).collect(),
            response_length: 0,
        }
    }

    fn sample() -> Vec<AnalysisRecord> {
        vec![
            record(&["a.com", "b.org"], &["Acme"]),
            record(&["a.com"], &["Acme", "Globex"]),
            record(&[], &[]),
            record(&["c.net"], &["Globex"]),
        ]
    }

    #[test]
    fn test_record_counts() {
        let mut counts = AggregateCounts::new();
        for r in &sample() {
            counts.record(r);
        }

        assert_eq!(counts.domains.get("a.com"), Some(&2));
        assert_eq!(counts.domains.get("b.org"), Some(&1));
        assert_eq!(counts.brand_count("Acme"), 2);
        assert_eq!(counts.brand_count("Globex"), 2);
        assert_eq!(counts.brand_count("Initech"), 0);
    }

    #[test]
    fn test_order_independent() {
        let records = sample();
        let mut forward = AggregateCounts::new();
        records.iter().for_each(|r| forward.record(r));

        let mut backward = AggregateCounts::new();
        records.iter().rev().for_each(|r| backward.record(r));

        let mut interleaved = AggregateCounts::new();
        for i in [2, 0, 3, 1] {
            interleaved.record(&records[i]);
        }

        assert_eq!(forward, backward);
        assert_eq!(forward, interleaved);
    }

    #[test]
    fn test_brand_table_includes_zero_counts() {
        let mut counts = AggregateCounts::new();
        counts.record(&record(&[], &["Globex"]));

        let brands = BrandList::new(["Acme", "Globex", "Initech"]);
        assert_eq!(
            counts.brand_table(&brands),
            vec![("Acme", 0), ("Globex", 1), ("Initech", 0)]
        );
    }

    #[test]
    fn test_rankings() {
        let mut counts = AggregateCounts::new();
        sample().iter().for_each(|r| counts.record(r));

        assert_eq!(counts.top_brands(), vec![("Acme", 2), ("Globex", 2)]);
        assert_eq!(counts.top_domains(1), vec![("a.com", 2)]);
    }
}
