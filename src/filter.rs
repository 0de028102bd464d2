use crate::results::SkipReason;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// URL schemes that name inline or script content rather than a downloadable file
const NON_FETCHABLE_SCHEMES: [&str; 4] = ["data:", "blob:", "javascript:", "about:"];

/// Configuration for asset URL filtering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetFilterConfig {
    /// Regex patterns for asset URLs to leave untouched
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Decides which discovered attribute values are fetched as assets
#[derive(Debug, Default)]
pub struct AssetFilter {
    exclude_regexes: Vec<Regex>,
}

impl AssetFilter {
    /// Create a new asset filter from configuration
    pub fn new(config: &AssetFilterConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self { exclude_regexes })
    }

    /// Returns the reason to skip this attribute value, or `None` if it should be fetched
    pub fn check(&self, url: &str) -> Option<SkipReason> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Some(SkipReason::MissingAttribute);
        }

        if !is_fetchable(trimmed) {
            return Some(SkipReason::NotFetchable);
        }

        if self.exclude_regexes.iter().any(|re| re.is_match(trimmed)) {
            return Some(SkipReason::Excluded);
        }

        None
    }
}

/// Check whether a URL points at something a GET can retrieve
fn is_fetchable(url: &str) -> bool {
    if url.starts_with('#') {
        return false;
    }

    let lower = url.to_ascii_lowercase();
    !NON_FETCHABLE_SCHEMES
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}
