//! Per-response analysis.

use crate::analysis::extractor::{BrandList, EntityExtractor};
use crate::models::AnalysisRecord;
use anyhow::Result;

/// Turns one model response into an [`AnalysisRecord`].
#[derive(Debug, Clone)]
pub struct ResponseAnalyzer {
    extractor: EntityExtractor,
}

impl ResponseAnalyzer {
    /// Create an analyzer for the run's brand list.
    pub fn new(brands: BrandList) -> Result<Self> {
        Ok(Self {
            extractor: EntityExtractor::new(brands)?,
        })
    }

    /// Analyze a response. Missing text is treated as empty.
    pub fn analyze(&self, response: Option<&str>) -> AnalysisRecord {
        let text = response.unwrap_or_default();
        let (resources, products) = self.extractor.extract(text);

        AnalysisRecord {
            resources,
            products,
            response_length: text.chars().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ResponseAnalyzer {
        ResponseAnalyzer::new(BrandList::new(["Acme", "Globex"])).unwrap()
    }

    #[test]
    fn test_analyze_example_response() {
        let text = "Acme Corp recommends https://www.example.com/page and globex.net for details, see Acme again.";
        let record = analyzer().analyze(Some(text));

        assert_eq!(record.products, vec!["Acme", "Globex"]);
        assert_eq!(record.response_length, text.chars().count());
        assert_eq!(record.resources.full_urls.len(), 1);
    }

    #[test]
    fn test_absent_and_empty_text() {
        let a = analyzer();
        for input in [None, Some("")] {
            let record = a.analyze(input);
            assert!(record.resources.full_urls.is_empty());
            assert!(record.resources.domains.is_empty());
            assert!(record.products.is_empty());
            assert_eq!(record.response_length, 0);
        }
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let record = analyzer().analyze(Some("héllo ✓"));
        assert_eq!(record.response_length, 7);
    }

    #[test]
    fn test_products_are_members_of_brand_list() {
        let record = analyzer().analyze(Some("GLOBEX, acme, Initech"));
        assert_eq!(record.products, vec!["Acme", "Globex"]);
    }
}
