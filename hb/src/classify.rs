//! Source classification: partial or template, and its registration key

use tracing::debug;

use crate::hooks::file_segment;
use crate::options::Options;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Partial,
    Template,
}

/// Classification and registration key for one source path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub kind: SourceKind,
    pub key: String,
}

/// Classify a source path by testing its filename against the partial rule.
///
/// Keys are taken verbatim from the naming hooks; duplicates are not detected.
pub fn classify(path: &str, options: &Options) -> Classified {
    let filename = file_segment(path);
    let classified = if options.is_partial(filename) {
        Classified {
            kind: SourceKind::Partial,
            key: options.hooks.process_partial_name(path),
        }
    } else {
        Classified {
            kind: SourceKind::Template,
            key: options.hooks.process_name(path),
        }
    };
    debug!(%path, kind = ?classified.kind, key = %classified.key, "classify");
    classified
}
