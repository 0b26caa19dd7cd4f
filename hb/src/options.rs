//! Option resolution
//!
//! Options come from three layers: built-in defaults, the task-level
//! `options` block and a target or file-group override. Each layer only sets
//! the fields it names; [`Options::resolve`] folds them into one immutable
//! record used for a whole file group.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::BundleError;
use crate::hooks::{DefaultHooks, RewriteHooks, RewriteRule, TemplateHooks};
use crate::namespace::{self, NamespaceDeclaration};

/// Default namespace name
pub const DEFAULT_NAMESPACE: &str = "JST";

/// Default statement separator, before line-ending normalization
pub const DEFAULT_SEPARATOR: &str = "\n\n";

/// Default partial detection rule: filename starts with an underscore
pub const DEFAULT_PARTIAL_REGEX: &str = "^_";

/// Namespace setting as written in configuration: a name, or a boolean
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamespaceSetting {
    Enabled(bool),
    Name(String),
}

impl NamespaceSetting {
    /// The namespace name, or `None` when disabled
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Enabled(false) => None,
            Self::Enabled(true) => Some(DEFAULT_NAMESPACE),
            Self::Name(name) => Some(name.as_str()),
        }
    }
}

/// Unresolved options; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OptionsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<NamespaceSetting>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amd: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_regex: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_content: Option<Vec<RewriteRule>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_name: Option<Vec<RewriteRule>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_partial_name: Option<Vec<RewriteRule>>,
}

impl OptionsConfig {
    /// Layer `other` on top of `self`; fields set in `other` win
    pub fn merge(&self, other: &OptionsConfig) -> OptionsConfig {
        OptionsConfig {
            namespace: other.namespace.clone().or_else(|| self.namespace.clone()),
            separator: other.separator.clone().or_else(|| self.separator.clone()),
            wrapped: other.wrapped.or(self.wrapped),
            amd: other.amd.or(self.amd),
            partial_regex: other.partial_regex.clone().or_else(|| self.partial_regex.clone()),
            process_content: other.process_content.clone().or_else(|| self.process_content.clone()),
            process_name: other.process_name.clone().or_else(|| self.process_name.clone()),
            process_partial_name: other
                .process_partial_name
                .clone()
                .or_else(|| self.process_partial_name.clone()),
        }
    }
}

/// Fully resolved options for one file group
#[derive(Clone)]
pub struct Options {
    /// `None` when namespace mode is disabled
    pub namespace: Option<NamespaceDeclaration>,
    pub separator: String,
    pub wrapped: bool,
    pub amd: bool,
    pub partial_rule: Regex,
    pub hooks: Arc<dyn TemplateHooks>,
}

impl Options {
    /// Resolve layered configuration into options.
    ///
    /// Later layers override earlier ones field by field.
    pub fn resolve(layers: &[&OptionsConfig]) -> Result<Self, BundleError> {
        let config = layers
            .iter()
            .fold(OptionsConfig::default(), |acc, layer| acc.merge(layer));
        Self::from_config(&config)
    }

    pub fn from_config(config: &OptionsConfig) -> Result<Self, BundleError> {
        let namespace = match &config.namespace {
            Some(setting) => setting.name().map(namespace::declare),
            None => Some(namespace::declare(DEFAULT_NAMESPACE)),
        };

        let pattern = config.partial_regex.as_deref().unwrap_or(DEFAULT_PARTIAL_REGEX);
        let partial_rule = Regex::new(pattern).map_err(|source| BundleError::InvalidRegex {
            field: "partial-regex",
            pattern: pattern.to_string(),
            source,
        })?;

        let rewrites = RewriteHooks::from_rules(
            config.process_content.as_deref().unwrap_or_default(),
            config.process_name.as_deref().unwrap_or_default(),
            config.process_partial_name.as_deref().unwrap_or_default(),
        )?;
        let hooks: Arc<dyn TemplateHooks> = if rewrites.is_empty() {
            Arc::new(DefaultHooks)
        } else {
            Arc::new(rewrites)
        };

        let options = Self {
            namespace,
            separator: config.separator.clone().unwrap_or_else(|| DEFAULT_SEPARATOR.to_string()),
            wrapped: config.wrapped.unwrap_or(true),
            amd: config.amd.unwrap_or(false),
            partial_rule,
            hooks,
        };
        debug!(?options, "Options::from_config: resolved");
        Ok(options)
    }

    /// Replace the transformation hooks
    pub fn with_hooks(mut self, hooks: Arc<dyn TemplateHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Whether a filename is a partial under these options
    pub fn is_partial(&self, filename: &str) -> bool {
        self.partial_rule.is_match(filename)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            namespace: Some(namespace::declare(DEFAULT_NAMESPACE)),
            separator: DEFAULT_SEPARATOR.to_string(),
            wrapped: true,
            amd: false,
            partial_rule: Regex::new(DEFAULT_PARTIAL_REGEX).expect("default partial regex is valid"),
            hooks: Arc::new(DefaultHooks),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("namespace", &self.namespace.as_ref().map(|ns| ns.namespace.as_str()))
            .field("separator", &self.separator)
            .field("wrapped", &self.wrapped)
            .field("amd", &self.amd)
            .field("partial_rule", &self.partial_rule.as_str())
            .field("hooks", &self.hooks)
            .finish()
    }
}
