//! Search filter expression

use crate::config::{Configuration, FilterMode};
use std::fmt;

/// The expression placed after `index=` in the search string
///
/// Derived fresh from the configuration on every cycle, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    expression: String,
}

impl SearchFilter {
    /// Combine an index name with optional time bounds
    ///
    /// With [`FilterMode::Overwrite`] each bound that is present replaces the
    /// whole expression, so the last one applied wins. With
    /// [`FilterMode::Conjunctive`] all conditions are kept, space separated.
    pub fn new(index: &str, earliest: Option<&str>, latest: Option<&str>, mode: FilterMode) -> Self {
        let expression = match mode {
            FilterMode::Overwrite => {
                let mut expression = index.to_string();
                if let Some(earliest) = earliest {
                    expression = format!("earliest={}", earliest);
                }
                if let Some(latest) = latest {
                    expression = format!("latest={}", latest);
                }
                expression
            }
            FilterMode::Conjunctive => {
                let mut parts = vec![index.to_string()];
                parts.extend(earliest.map(|e| format!("earliest={}", e)));
                parts.extend(latest.map(|l| format!("latest={}", l)));
                parts.join(" ")
            }
        };

        Self { expression }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::new(
            config.index(),
            config.earliest(),
            config.latest(),
            config.filter_mode(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }
}

impl fmt::Display for SearchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_only() {
        let filter = SearchFilter::new("main", None, None, FilterMode::Overwrite);
        assert_eq!(filter.as_str(), "main");
    }

    #[test]
    fn test_earliest_replaces_index() {
        let filter = SearchFilter::new("main", Some("-24h"), None, FilterMode::Overwrite);
        assert_eq!(filter.as_str(), "earliest=-24h");
    }

    #[test]
    fn test_latest_wins() {
        let filter = SearchFilter::new(
            "main",
            Some("2024-01-01:00:00:00"),
            Some("2024-01-31:23:59:59"),
            FilterMode::Overwrite,
        );
        assert_eq!(filter.as_str(), "latest=2024-01-31:23:59:59");

        let filter = SearchFilter::new("main", None, Some("now"), FilterMode::Overwrite);
        assert_eq!(filter.to_string(), "latest=now");
    }

    #[test]
    fn test_conjunctive() {
        let filter = SearchFilter::new("main", Some("-7d@d"), Some("now"), FilterMode::Conjunctive);
        assert_eq!(filter.as_str(), "main earliest=-7d@d latest=now");

        let filter = SearchFilter::new("main", None, Some("now"), FilterMode::Conjunctive);
        assert_eq!(filter.as_str(), "main latest=now");

        let filter = SearchFilter::new("main", None, None, FilterMode::Conjunctive);
        assert_eq!(filter.as_str(), "main");
    }
}
