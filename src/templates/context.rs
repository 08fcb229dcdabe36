//! Per-request template context.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::SiteConfig;

/// Context key holding the page template the wrapper should embed.
pub const TEMPLATE_NAME_KEY: &str = "template_name";

/// Key-value mapping handed to the renderer for one request.
///
/// A context is built fresh for every request from the site metadata and
/// dropped once the response is written, so values added while handling one
/// request never leak into another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context seeded with the fixed site metadata.
    pub fn for_site(site: &SiteConfig) -> Self {
        let mut context = Self::new();
        context.insert("title", &site.title);
        context.insert("meta_description", &site.meta_description);
        context.insert("meta_keywords", &site.meta_keywords);
        context
    }

    /// Inserts or overwrites a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the page template selected by `render`, if any.
    pub fn template_name(&self) -> Option<&str> {
        self.get(TEMPLATE_NAME_KEY)
    }
}
