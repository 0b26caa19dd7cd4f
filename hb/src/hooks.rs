//! Content and name transformation hooks
//!
//! Three extension points shape what goes into a bundle: the template text
//! handed to the precompiler, the key a template is stored under, and the key
//! a partial is registered under.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::BundleError;

/// Extension points applied to every source file
pub trait TemplateHooks: fmt::Debug + Send + Sync {
    /// Transform raw template text before it is precompiled
    fn process_content(&self, content: &str) -> String {
        content.to_string()
    }

    /// Registration key for a template, from its source path
    fn process_name(&self, path: &str) -> String {
        path.to_string()
    }

    /// Registration key for a partial, from its source path
    fn process_partial_name(&self, path: &str) -> String {
        default_partial_name(path)
    }
}

/// Identity content and template names, default partial names
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl TemplateHooks for DefaultHooks {}

/// Last `/`-separated segment of a source path
pub fn file_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Default partial key: filename without its final extension, minus its
/// first character.
///
/// The first character is dropped unconditionally, so `nav.hbs` becomes `av`
/// when a custom partial rule matches names without an underscore.
pub fn default_partial_name(path: &str) -> String {
    let mut pieces: Vec<&str> = file_segment(path).split('.').collect();
    pieces.pop();
    pieces.join(".").chars().skip(1).collect()
}

/// One regex substitution, as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub pattern: String,
    #[serde(default)]
    pub replace: String,
}

/// A compiled rewrite rule
#[derive(Debug, Clone)]
pub struct Rewrite {
    regex: Regex,
    replace: String,
}

impl Rewrite {
    pub fn new(pattern: &str, replace: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            replace: replace.into(),
        })
    }

    fn compile_all(field: &'static str, rules: &[RewriteRule]) -> Result<Vec<Self>, BundleError> {
        rules
            .iter()
            .map(|rule| {
                Self::new(&rule.pattern, rule.replace.clone()).map_err(|source| BundleError::InvalidRegex {
                    field,
                    pattern: rule.pattern.clone(),
                    source,
                })
            })
            .collect()
    }

    fn apply(&self, input: &str) -> String {
        self.regex.replace_all(input, self.replace.as_str()).into_owned()
    }
}

fn apply_all(rewrites: &[Rewrite], input: &str) -> String {
    rewrites
        .iter()
        .fold(input.to_string(), |acc, rewrite| rewrite.apply(&acc))
}

/// Hooks built from configured rewrite lists.
///
/// An empty list leaves the corresponding default in place; a non-empty
/// partial-name list replaces the default partial naming entirely.
#[derive(Debug, Clone, Default)]
pub struct RewriteHooks {
    content: Vec<Rewrite>,
    name: Vec<Rewrite>,
    partial_name: Vec<Rewrite>,
}

impl RewriteHooks {
    pub fn from_rules(
        content: &[RewriteRule],
        name: &[RewriteRule],
        partial_name: &[RewriteRule],
    ) -> Result<Self, BundleError> {
        Ok(Self {
            content: Rewrite::compile_all("process-content", content)?,
            name: Rewrite::compile_all("process-name", name)?,
            partial_name: Rewrite::compile_all("process-partial-name", partial_name)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.name.is_empty() && self.partial_name.is_empty()
    }
}

impl TemplateHooks for RewriteHooks {
    fn process_content(&self, content: &str) -> String {
        apply_all(&self.content, content)
    }

    fn process_name(&self, path: &str) -> String {
        let name = apply_all(&self.name, path);
        debug!(%path, %name, "RewriteHooks::process_name");
        name
    }

    fn process_partial_name(&self, path: &str) -> String {
        if self.partial_name.is_empty() {
            return default_partial_name(path);
        }
        apply_all(&self.partial_name, path)
    }
}
