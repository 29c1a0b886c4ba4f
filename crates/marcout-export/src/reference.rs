//! Code-to-label reference lookups
//!
//! Each reference domain (locations, item statuses) is loaded in full once
//! per run and read from memory afterward. These tables are small; the whole
//! map fits comfortably.

use std::collections::HashMap;

/// One reference domain's code→label map.
#[derive(Debug, Default, Clone)]
pub struct ReferenceMap {
    entries: HashMap<String, String>,
}

impl ReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    /// The label for a code. A code with no entry yields an empty label;
    /// enrichment never fails an item row.
    pub fn label(&self, code: &str) -> &str {
        self.entries.get(code).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample() -> ReferenceMap {
        ReferenceMap::from_pairs([
            ("MAIN".to_string(), "Main Library".to_string()),
            ("ANNEX".to_string(), "Storage Annex".to_string()),
        ])
    }

    #[test]
    fn test_known_code_resolves() {
        let map = sample();
        assert_eq!(map.label("MAIN"), "Main Library");
        assert_eq!(map.label("ANNEX"), "Storage Annex");
    }

    #[test]
    fn test_missing_code_yields_empty_label() {
        let map = sample();
        assert_eq!(map.label("NOWHERE"), "");
        assert_eq!(map.label(""), "");
    }

    #[test]
    fn test_empty_map() {
        let map = ReferenceMap::new();
        assert!(map.is_empty());
        assert_eq!(map.label("MAIN"), "");
    }
}
