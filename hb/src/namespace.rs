//! Namespace declaration generation
//!
//! Compiled templates are assigned into a dotted global path such as
//! `this.App.Templates`. The bundle cannot assume any segment of that path
//! exists at load time, so each segment is initialized with a guard-then-assign
//! statement before the first template assignment.

const ROOT: &str = "this";

/// The access expression and initialization statements for a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDeclaration {
    /// Bracket-access expression, e.g. `this["App"]["Templates"]`
    pub namespace: String,
    /// Statements that lazily create every segment of the path
    pub declaration: String,
}

/// Expand a dotted namespace name into its access expression and declaration.
///
/// A leading (or embedded) `this` segment is treated as the root and never
/// re-declared. `declare("this")` yields the bare root with no declaration.
pub fn declare(name: &str) -> NamespaceDeclaration {
    let mut path = ROOT.to_string();
    let mut lines = Vec::new();

    if name != ROOT {
        for part in name.split('.').filter(|part| *part != ROOT) {
            path.push('[');
            path.push_str(&json_string(part));
            path.push(']');
            lines.push(format!("{path} = {path} || {{}};"));
        }
    }

    NamespaceDeclaration {
        namespace: path,
        declaration: lines.join("\n"),
    }
}

/// Encode a string as a JSON string literal, quotes included
pub(crate) fn json_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
