//! Token values for one render.

use std::collections::BTreeMap;

use quick_xml::escape::escape;

/// Map from token name (without the leading `$`) to its rendered value.
///
/// Values are XML-escaped on insert, so summaries containing `&` or `<`
/// still produce a well-formed SVG, in text content and attributes alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    values: BTreeMap<String, String>,
    longest: usize,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>, value: impl AsRef<str>) {
        let token = token.into();
        self.longest = self.longest.max(token.len());
        self.values.insert(token, escape(value.as_ref()).into_owned());
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Length in bytes of the longest token name.
    pub(crate) fn longest_token(&self) -> usize {
        self.longest
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
