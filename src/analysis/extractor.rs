//! URL, domain, and brand extraction from free text.
//!
//! The domain pattern is deliberately loose: any dotted token whose last
//! label is alphabetic looks like a hostname to it, so identifiers such as
//! `config.yaml` or `v2.beta` are reported as domains too.

use crate::models::ExtractionResult;
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::debug;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:[-\w.]|(?:%[\da-fA-F]{2}))+(?:/[-\w%!.?&=+]*)*")
        .expect("URL pattern is valid")
});

static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:www\.)?([a-zA-Z0-9][-a-zA-Z0-9]{0,62}\.[a-zA-Z0-9][-a-zA-Z0-9]{0,62}\.[a-zA-Z]{2,}|[a-zA-Z0-9][-a-zA-Z0-9]{0,62}\.[a-zA-Z]{2,})",
    )
    .expect("domain pattern is valid")
});

static URL_HOST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://(?:www\.)?([^/]+)").expect("host pattern is valid"));

/// Ordered, de-duplicated list of brand names to look for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandList(Vec<String>);

impl BrandList {
    /// Builds a list from raw names: trimmed, blanks dropped, first occurrence kept.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = BTreeSet::new();
        let brands = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(name.clone()))
            .collect();
        Self(brands)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A brand name compiled into a case-insensitive whole-word matcher.
#[derive(Debug, Clone)]
struct BrandMatcher {
    name: String,
    pattern: Regex,
}

impl BrandMatcher {
    fn new(name: &str) -> Result<Self> {
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(name)))
            .with_context(|| format!("Failed to compile matcher for brand '{}'", name))?;
        Ok(Self {
            name: name.to_string(),
            pattern,
        })
    }
}

/// Scans text for URLs, domains, and configured brands.
#[derive(Debug, Clone)]
pub struct EntityExtractor {
    matchers: Vec<BrandMatcher>,
}

impl EntityExtractor {
    /// Compiles one matcher per brand.
    pub fn new(brands: BrandList) -> Result<Self> {
        let matchers = brands
            .iter()
            .map(|brand| BrandMatcher::new(brand))
            .collect::<Result<Vec<_>>>()?;
        debug!("Compiled {} brand matchers", matchers.len());

        Ok(Self { matchers })
    }

    /// Returns resources and matched brands found in `text`.
    pub fn extract(&self, text: &str) -> (ExtractionResult, Vec<String>) {
        (extract_resources(text), self.extract_brands(text))
    }

    /// Brands that appear in `text` as whole words, ignoring case.
    pub fn extract_brands(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        self.matchers
            .iter()
            .filter(|m| m.pattern.is_match(text))
            .map(|m| m.name.clone())
            .collect()
    }
}

/// Finds URLs and domains in `text`.
pub fn extract_resources(text: &str) -> ExtractionResult {
    if text.is_empty() {
        return ExtractionResult::default();
    }

    let full_urls: Vec<String> = URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();

    let mut domains: BTreeSet<String> = DOMAIN_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    domains.extend(full_urls.iter().filter_map(|url| url_host(url)));

    ExtractionResult { full_urls, domains }
}

/// Host part of a URL with any leading `www.` removed.
pub fn url_host(url: &str) -> Option<String> {
    URL_HOST_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
