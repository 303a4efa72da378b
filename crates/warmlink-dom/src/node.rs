//! Element nodes

use crate::NodeId;

/// An element in the document arena
#[derive(Debug, Clone, Default)]
pub struct Element {
    /// Lowercased tag name (`"#document"` for the root)
    pub tag: String,
    /// Attributes in insertion order
    pub attributes: Vec<(String, String)>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Get attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set attribute, replacing any existing value
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value.to_string(),
            None => self
                .attributes
                .push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Check the tag name (case-insensitive)
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_lowercased() {
        let el = Element::new("LINK");
        assert_eq!(el.tag, "link");
        assert!(el.is("Link"));
    }

    #[test]
    fn test_set_attribute_replaces() {
        let mut el = Element::new("a");
        el.set_attribute("href", "/one");
        el.set_attribute("HREF", "/two");
        assert_eq!(el.attributes.len(), 1);
        assert_eq!(el.attribute("href"), Some("/two"));
    }
}
