//! Response analysis modules.
//!
//! Extraction of URLs, domains, and brands from model responses, and
//! aggregation of those mentions across a run.

pub mod aggregator;
pub mod analyzer;
pub mod extractor;

pub use aggregator::AggregateCounts;
pub use analyzer::ResponseAnalyzer;
pub use extractor::BrandList;
