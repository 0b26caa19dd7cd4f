//! Bundle assembly
//!
//! A bundle collects one statement per source: partial registrations and
//! template assignments, each list in encounter order. Assembly puts every
//! partial before every template so templates can reference partials as soon
//! as the file is evaluated.

use regex::Regex;
use std::sync::LazyLock;

use crate::classify::SourceKind;
use crate::namespace::json_string;
use crate::options::Options;

/// Opening line of the AMD module wrapper
pub const AMD_OPEN: &str = "define(['handlebars'], function(Handlebars) {";

/// Closing line of the AMD module wrapper
pub const AMD_CLOSE: &str = "});";

/// Value returned from the AMD wrapper when namespace mode is off
const AMD_FALLBACK_EXPORT: &str = "Handlebars";

#[cfg(windows)]
const LINEFEED: &str = "\r\n";
#[cfg(not(windows))]
const LINEFEED: &str = "\n";

static LINE_ENDING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r\n|\n").expect("static regex"));

/// Normalize every line ending to the platform convention
pub fn normalize_lf(text: &str) -> String {
    LINE_ENDING.replace_all(text, LINEFEED).into_owned()
}

/// Statements accumulated for one destination
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    partials: Vec<String>,
    templates: Vec<String>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the statement for one compiled source
    pub fn push(&mut self, kind: SourceKind, key: &str, compiled: &str, options: &Options) {
        match kind {
            SourceKind::Partial => self.push_partial(key, compiled),
            SourceKind::Template => self.push_template(key, compiled, options),
        }
    }

    pub fn push_partial(&mut self, key: &str, compiled: &str) {
        self.partials
            .push(format!("Handlebars.registerPartial({}, {});", json_string(key), compiled));
    }

    /// Without a namespace the compiled expression is the whole statement
    pub fn push_template(&mut self, key: &str, compiled: &str, options: &Options) {
        let statement = match &options.namespace {
            Some(ns) => format!("{}[{}] = {};", ns.namespace, json_string(key), compiled),
            None => compiled.to_string(),
        };
        self.templates.push(statement);
    }

    pub fn len(&self) -> usize {
        self.partials.len() + self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn partials(&self) -> &[String] {
        &self.partials
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Ordered output lines, or `None` when there is nothing to write
    pub fn lines(&self, options: &Options) -> Option<Vec<String>> {
        if self.is_empty() {
            return None;
        }

        let mut lines = Vec::with_capacity(self.len() + 4);
        if options.amd {
            lines.push(AMD_OPEN.to_string());
        }
        if let Some(ns) = &options.namespace {
            lines.push(ns.declaration.clone());
        }
        lines.extend(self.partials.iter().cloned());
        lines.extend(self.templates.iter().cloned());
        if options.amd {
            let export = options
                .namespace
                .as_ref()
                .map_or(AMD_FALLBACK_EXPORT, |ns| ns.namespace.as_str());
            lines.push(format!("return {export};"));
            lines.push(AMD_CLOSE.to_string());
        }
        Some(lines)
    }

    /// Final artifact text, or `None` when there is nothing to write
    pub fn assemble(&self, options: &Options) -> Option<String> {
        let separator = normalize_lf(&options.separator);
        self.lines(options).map(|lines| lines.join(&separator))
    }
}
