//! Bundle build orchestration
//!
//! A [`BundleTask`] runs file groups one at a time. Missing sources and empty
//! bundles are warnings; the first compile error stops the whole run before
//! anything else is written.

use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use crate::bundle::Bundle;
use crate::classify::{SourceKind, classify};
use crate::error::BundleError;
use crate::files;
use crate::options::Options;
use crate::precompile::{Precompiler, compile_source};

/// One source list and the artifact it produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    /// Source paths, already expanded, in encounter order
    pub src: Vec<String>,
    pub dest: PathBuf,
}

impl FileGroup {
    pub fn new(src: Vec<String>, dest: impl Into<PathBuf>) -> Self {
        Self { src, dest: dest.into() }
    }
}

/// A compiled source, ready for the bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub path: String,
    pub kind: SourceKind,
    pub key: String,
    pub compiled: String,
}

/// What a run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReport {
    /// Destinations written
    pub written: Vec<PathBuf>,
    /// Destinations skipped because no source compiled into them
    pub skipped: Vec<PathBuf>,
    /// Sources dropped because they do not exist
    pub missing_sources: Vec<String>,
}

impl TaskReport {
    pub fn extend(&mut self, other: TaskReport) {
        self.written.extend(other.written);
        self.skipped.extend(other.skipped);
        self.missing_sources.extend(other.missing_sources);
    }
}

/// Compiles file groups into bundles
pub struct BundleTask<'a> {
    base: PathBuf,
    precompiler: &'a dyn Precompiler,
}

impl<'a> BundleTask<'a> {
    /// `base` is the directory source and destination paths are relative to
    pub fn new(base: impl AsRef<Path>, precompiler: &'a dyn Precompiler) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
            precompiler,
        }
    }

    /// Process groups in order, stopping at the first error
    pub fn run(&self, groups: &[FileGroup], options: &Options) -> Result<TaskReport, BundleError> {
        let mut report = TaskReport::default();
        for group in groups {
            report.extend(self.run_group(group, options)?);
        }
        Ok(report)
    }

    /// Compile one group and write its artifact if it has any statements
    pub fn run_group(&self, group: &FileGroup, options: &Options) -> Result<TaskReport, BundleError> {
        debug!(dest = %group.dest.display(), sources = group.src.len(), "BundleTask::run_group");
        let mut report = TaskReport::default();
        let mut bundle = Bundle::new();

        for path in &group.src {
            if !files::exists(&self.base, path) {
                warn!("Source file \"{}\" not found.", path);
                report.missing_sources.push(path.clone());
                continue;
            }
            let record = self.compile_file(path, options)?;
            bundle.push(record.kind, &record.key, &record.compiled, options);
        }

        let dest = files::resolve(&self.base, &group.dest);
        match bundle.assemble(options) {
            Some(content) => {
                files::write(&dest, &content)?;
                debug!(dest = %group.dest.display(), "run_group: written");
                report.written.push(group.dest.clone());
            }
            None => {
                warn!(
                    "Destination \"{}\" not written because compiled files were empty.",
                    group.dest.display()
                );
                report.skipped.push(group.dest.clone());
            }
        }
        Ok(report)
    }

    /// Read, classify and precompile a single source
    pub fn compile_file(&self, path: &str, options: &Options) -> Result<SourceRecord, BundleError> {
        let raw = files::read(&self.base, path)?;
        let compiled = compile_source(&raw, options, self.precompiler).map_err(|source| {
            error!(%path, error = %source, "Handlebars failed to compile {}.", path);
            BundleError::Compile {
                path: path.to_string(),
                source,
            }
        })?;
        let classified = classify(path, options);
        Ok(SourceRecord {
            path: path.to_string(),
            kind: classified.kind,
            key: classified.key,
            compiled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use std::fs;
    use tempfile::TempDir;

    struct EchoPrecompiler;

    impl Precompiler for EchoPrecompiler {
        fn precompile(&self, source: &str) -> Result<String, CompileError> {
            if source.contains("{{#broken") {
                return Err(CompileError::new("unclosed block"));
            }
            Ok(format!("<{}>", source.trim()))
        }
    }

    fn write_source(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_run_group_orders_partials_first() {
        let temp = TempDir::new().unwrap();
        write_source(temp.path(), "t/_b.hbs", "B");
        write_source(temp.path(), "t/a.hbs", "A");
        write_source(temp.path(), "t/_a.hbs", "PA");

        let task = BundleTask::new(temp.path(), &EchoPrecompiler);
        let group = FileGroup::new(vec!["t/_b.hbs".into(), "t/a.hbs".into(), "t/_a.hbs".into()], "out.js");
        let report = task.run(&[group], &Options::default()).unwrap();
        assert_eq!(report.written, vec![PathBuf::from("out.js")]);

        let output = fs::read_to_string(temp.path().join("out.js")).unwrap();
        let b = output.find(r#"registerPartial("b""#).unwrap();
        let a = output.find(r#"registerPartial("a""#).unwrap();
        let t = output.find(r#"this["JST"]["t/a.hbs"]"#).unwrap();
        assert!(b < a && a < t);
        assert!(output.starts_with(r#"this["JST"] = this["JST"] || {};"#));
    }

    #[test]
    fn test_all_missing_sources_skip_write() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("out.js"), "previous").unwrap();

        let task = BundleTask::new(temp.path(), &EchoPrecompiler);
        let group = FileGroup::new(vec!["nope.hbs".into()], "out.js");
        let report = task.run(&[group], &Options::default()).unwrap();

        assert_eq!(report.missing_sources, vec!["nope.hbs".to_string()]);
        assert_eq!(report.skipped, vec![PathBuf::from("out.js")]);
        assert!(report.written.is_empty());
        assert_eq!(fs::read_to_string(temp.path().join("out.js")).unwrap(), "previous");
    }

    #[test]
    fn test_compile_error_stops_later_groups() {
        let temp = TempDir::new().unwrap();
        write_source(temp.path(), "ok.hbs", "fine");
        write_source(temp.path(), "bad.hbs", "{{#broken}}");

        let task = BundleTask::new(temp.path(), &EchoPrecompiler);
        let groups = vec![
            FileGroup::new(vec!["ok.hbs".into()], "first.js"),
            FileGroup::new(vec!["ok.hbs".into(), "bad.hbs".into()], "second.js"),
            FileGroup::new(vec!["ok.hbs".into()], "third.js"),
        ];
        let err = task.run(&groups, &Options::default()).unwrap_err();

        assert!(matches!(err, BundleError::Compile { ref path, .. } if path == "bad.hbs"));
        assert!(temp.path().join("first.js").exists());
        assert!(!temp.path().join("second.js").exists());
        assert!(!temp.path().join("third.js").exists());
    }

    #[test]
    fn test_compile_file_record() {
        let temp = TempDir::new().unwrap();
        write_source(temp.path(), "views/_row.hbs", "row");

        let task = BundleTask::new(temp.path(), &EchoPrecompiler);
        let record = task.compile_file("views/_row.hbs", &Options::default()).unwrap();
        assert_eq!(record.kind, SourceKind::Partial);
        assert_eq!(record.key, "row");
        assert_eq!(record.compiled, "Handlebars.template(<row>)");
    }
}
