//! Source discovery and file I/O
//!
//! Source lists are glob patterns expanded in order. `{a,b}` alternatives are
//! expanded before matching, a `!` prefix removes earlier matches, and a
//! pattern naming an existing file or containing no glob metacharacters is
//! kept as a literal path even when nothing exists there, so a missing file
//! shows up as a warning instead of silently disappearing.

use glob::{MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::BundleError;

const GLOB_META: &[char] = &['*', '?', '['];

/// `*` and `?` stop at `/`; only `**` crosses directories
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Render a path with `/` separators
pub fn slash_path(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        rendered.into_owned()
    } else {
        rendered.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

fn is_literal(pattern: &str) -> bool {
    !pattern.contains(GLOB_META)
}

/// Expand the first `{a,b,...}` group, recursively, in order.
///
/// Unbalanced braces and groups without a comma are left as written.
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut splits = Vec::new();
    let mut close = None;
    for (offset, c) in pattern[open..].char_indices() {
        let index = open + offset;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(index);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(index),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };
    let (prefix, suffix) = (&pattern[..open], &pattern[close + 1..]);
    if splits.is_empty() {
        return expand_braces(suffix)
            .into_iter()
            .map(|rest| format!("{}{}", &pattern[..=close], rest))
            .collect();
    }

    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);
    bounds
        .windows(2)
        .flat_map(|w| expand_braces(&format!("{}{}{}", prefix, &pattern[w[0] + 1..w[1]], suffix)))
        .collect()
}

/// Expand source patterns relative to `base` into `/`-separated paths.
///
/// Results keep first-match order and contain no duplicates. Paths are
/// reported relative to `base` when the pattern was relative.
pub fn expand_sources(patterns: &[String], base: &Path) -> Result<Vec<String>, BundleError> {
    let mut paths: Vec<String> = Vec::new();

    for raw in patterns {
        if let Some(negated) = raw.strip_prefix('!') {
            let excluded = expand_braces(negated)
                .iter()
                .map(|p| Pattern::new(p))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| BundleError::Pattern {
                    pattern: raw.clone(),
                    source,
                })?;
            let before = paths.len();
            paths.retain(|path| !excluded.iter().any(|p| p.matches_with(path, MATCH_OPTIONS)));
            debug!(pattern = %raw, removed = before - paths.len(), "expand_sources: exclusion");
            continue;
        }

        for pattern in expand_braces(raw) {
            let mut found = if is_literal(&pattern) || exists(base, &pattern) {
                vec![pattern.clone()]
            } else {
                let matched = glob_relative(&pattern, base)?;
                if matched.is_empty() {
                    warn!("Source pattern \"{}\" matched no files.", pattern);
                }
                matched
            };
            found.retain(|path| !paths.contains(path));
            debug!(%pattern, matched = found.len(), "expand_sources: pattern");
            paths.extend(found);
        }
    }

    Ok(paths)
}

fn glob_relative(pattern: &str, base: &Path) -> Result<Vec<String>, BundleError> {
    let absolute = Path::new(pattern).is_absolute();
    let full = if absolute {
        pattern.to_string()
    } else {
        format!("{}/{}", Pattern::escape(&slash_path(base)).trim_end_matches('/'), pattern)
    };

    let entries = glob::glob_with(&full, MATCH_OPTIONS).map_err(|source| BundleError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut matches = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!(%pattern, "Skipping unreadable path {}: {}", e.path().display(), e.error());
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        let shown = match path.strip_prefix(base) {
            Ok(relative) if !absolute => relative.to_path_buf(),
            _ => path,
        };
        matches.push(slash_path(&shown));
    }
    Ok(matches)
}

/// Resolve a configured path against the working directory
pub fn resolve(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    base.join(path)
}

pub fn exists(base: &Path, path: &str) -> bool {
    resolve(base, path).is_file()
}

/// Read a source file as text, dropping a leading byte order mark
pub fn read(base: &Path, path: &str) -> Result<String, BundleError> {
    let content = fs::read_to_string(resolve(base, path)).map_err(|source| BundleError::Read {
        path: path.to_string(),
        source,
    })?;
    Ok(match content.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => content,
    })
}

/// Write an artifact, creating parent directories as needed
pub fn write(path: &Path, content: &str) -> Result<(), BundleError> {
    let to_error = |source| BundleError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(to_error)?;
    }
    fs::write(path, content).map_err(to_error)
}
