//! Link relation feature table
//!
//! Models `HTMLLinkElement.relList` and its `supports()` test so that
//! capability probing can be exercised against any browser profile.

/// Relation-list capabilities of the hosting environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomFeatures {
    /// Link elements expose a `relList`
    pub rel_list: bool,
    /// `relList.supports` exists
    pub rel_list_supports: bool,
    /// Relation tokens `supports` reports as supported
    pub supported_rels: Vec<String>,
}

impl Default for DomFeatures {
    fn default() -> Self {
        Self {
            rel_list: true,
            rel_list_supports: true,
            supported_rels: ["prefetch", "preload", "preconnect", "dns-prefetch", "stylesheet"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DomFeatures {
    /// An environment with no `relList` at all
    pub fn legacy() -> Self {
        Self {
            rel_list: false,
            rel_list_supports: false,
            supported_rels: Vec::new(),
        }
    }

    /// `relList` present but without `supports`
    pub fn without_supports() -> Self {
        Self {
            rel_list_supports: false,
            ..Self::default()
        }
    }

    /// Full support restricted to the given tokens
    pub fn with_rels(rels: &[&str]) -> Self {
        Self {
            supported_rels: rels.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }
}

/// Relation list of a single link element
#[derive(Debug, Clone)]
pub struct RelList<'a> {
    tokens: Vec<String>,
    features: &'a DomFeatures,
}

impl<'a> RelList<'a> {
    pub(crate) fn new(rel: Option<&str>, features: &'a DomFeatures) -> Self {
        let tokens = rel
            .map(|r| r.split_ascii_whitespace().map(|t| t.to_ascii_lowercase()).collect())
            .unwrap_or_default();
        Self { tokens, features }
    }

    /// `relList.supports(token)`; `None` when the function is missing
    pub fn supports(&self, token: &str) -> Option<bool> {
        if !self.features.rel_list_supports {
            return None;
        }
        Some(
            self.features
                .supported_rels
                .iter()
                .any(|r| r.eq_ignore_ascii_case(token)),
        )
    }

    /// `relList.contains(token)`
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t.eq_ignore_ascii_case(token))
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}
