//! Placeholder substitution for generated files.
//!
//! Templates use `$name` or `${name}` placeholders. `$$` renders a literal
//! dollar sign, and a `$` that is not followed by a valid name is left as-is,
//! which keeps shell snippets and f-strings in templates readable.
//!
//! There are no conditionals or loops: rendering is pure substitution and
//! every referenced placeholder must have a value.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::domain::DomainError;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$(?:(?P<escaped>\$)|(?P<named>[_a-zA-Z][_a-zA-Z0-9]*)|\{(?P<braced>[_a-zA-Z][_a-zA-Z0-9]*)\})",
    )
    .expect("placeholder pattern is a valid regex")
});

/// Context for template rendering.
///
/// A value object holding the variables for one scaffold. Built with
/// `with_variable`, read with `get`, applied with `render`.
///
/// `BTreeMap` keeps `variables()` output stable for logs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderContext {
    variables: BTreeMap<String, String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Substitute every placeholder in `template`.
    ///
    /// # Errors
    ///
    /// `MissingVariable` naming the first placeholder (in document order)
    /// that has no value.
    pub fn render(&self, template: &str) -> Result<String, DomainError> {
        if let Some(name) = self.first_missing(template) {
            return Err(DomainError::MissingVariable { name });
        }

        let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
            if caps.name("escaped").is_some() {
                return "$".to_string();
            }
            placeholder_name(caps)
                .and_then(|name| self.get(name))
                .unwrap_or_default()
                .to_string()
        });

        Ok(rendered.into_owned())
    }

    fn first_missing(&self, template: &str) -> Option<String> {
        PLACEHOLDER
            .captures_iter(template)
            .filter_map(|caps| placeholder_name(&caps).map(str::to_string))
            .find(|name| !self.contains(name))
    }
}

/// Names referenced by `template`, in document order, duplicates removed.
pub fn referenced_variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        if let Some(name) = placeholder_name(&caps) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

fn placeholder_name<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.name("named")
        .or_else(|| caps.name("braced"))
        .map(|m| m.as_str())
}
