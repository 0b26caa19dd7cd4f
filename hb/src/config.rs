//! Configuration for hbsbundle
//!
//! ```yaml
//! log-level: info
//! precompiler:
//!   command: ["node", "scripts/precompile.js"]
//! options:
//!   namespace: App.Templates
//! targets:
//!   - name: app
//!     options:
//!       amd: true
//!     files:
//!       - src: ["templates/**/*.hbs", "!templates/**/draft-*.hbs"]
//!         dest: build/templates.js
//! ```

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::BundleError;
use crate::files;
use crate::options::{Options, OptionsConfig};
use crate::precompile::{CommandPrecompiler, HandlebarsPrecompiler, Precompiler};
use crate::task::{BundleTask, FileGroup, TaskReport};

/// Project-local config file name
pub const LOCAL_CONFIG: &str = ".hb.yml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Log level used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    pub precompiler: PrecompilerConfig,

    /// Task-level options shared by every target
    pub options: OptionsConfig,

    pub targets: Vec<TargetConfig>,
}

/// Which precompiler to run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecompilerConfig {
    /// External command (argv); the built-in precompiler is used when empty
    pub command: Vec<String>,
}

impl PrecompilerConfig {
    /// The configured command, or the built-in precompiler.
    ///
    /// The built-in one only validates markup; its specs cannot be rendered
    /// by the Handlebars runtime, so choosing it is logged as a warning.
    pub fn build(&self) -> Box<dyn Precompiler> {
        match CommandPrecompiler::from_argv(&self.command) {
            Some(command) => Box::new(command),
            None => {
                warn!(
                    "No precompiler.command configured; bundles are syntax-checked but their templates cannot be rendered."
                );
                Box::new(HandlebarsPrecompiler)
            }
        }
    }
}

/// A named set of file groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub name: String,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub files: Vec<FilesConfig>,
}

/// Source patterns and their destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    pub src: Vec<String>,
    pub dest: PathBuf,

    /// Per-group overrides, applied after target options
    #[serde(default)]
    pub options: OptionsConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        match Self::locate(config_path) {
            Some(path) => {
                Self::load_from_file(&path).context(format!("Failed to load config from {}", path.display()))
            }
            None => {
                info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Config file to read: `--config`, then `.hb.yml`, then the user config dir
    pub fn locate(config_path: Option<&PathBuf>) -> Option<PathBuf> {
        Self::locate_in(config_path, Path::new(LOCAL_CONFIG), dirs::config_dir())
    }

    fn locate_in(config_path: Option<&PathBuf>, local_config: &Path, config_dir: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(path) = config_path {
            return Some(path.clone());
        }
        if local_config.exists() {
            return Some(local_config.to_path_buf());
        }
        config_dir
            .map(|dir| dir.join("hbsbundle").join("hb.yml"))
            .filter(|user_config| user_config.exists())
    }

    /// Read only the log level, before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::log_level_from(&Self::locate(config_path)?)
    }

    fn log_level_from(path: &Path) -> Option<String> {
        let content = fs::read_to_string(path).ok()?;
        let config: Self = serde_yaml::from_str(&content).ok()?;
        config.log_level
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    pub fn target(&self, name: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Targets to build: all of them, or the named ones in the order given
    pub fn select_targets(&self, names: &[String]) -> Result<Vec<&TargetConfig>, BundleError> {
        if names.is_empty() {
            return Ok(self.targets.iter().collect());
        }
        names
            .iter()
            .map(|name| self.target(name).ok_or_else(|| BundleError::UnknownTarget(name.clone())))
            .collect()
    }

    /// Resolved options for a target, before any file-group override
    pub fn target_options(&self, target: &TargetConfig) -> Result<Options, BundleError> {
        Options::resolve(&[&self.options, &target.options])
    }

    /// Build the selected targets with paths relative to `base`.
    ///
    /// Stops at the first compile error; artifacts already written stay.
    pub fn build(&self, base: &Path, names: &[String]) -> Result<TaskReport, BundleError> {
        let targets = self.select_targets(names)?;
        let precompiler = self.precompiler.build();
        let task = BundleTask::new(base, precompiler.as_ref());
        let mut report = TaskReport::default();

        for target in targets {
            debug!(target = %target.name, groups = target.files.len(), "Config::build: target");
            for files_config in &target.files {
                let options = Options::resolve(&[&self.options, &target.options, &files_config.options])?;
                let group = FileGroup::new(files::expand_sources(&files_config.src, base)?, &files_config.dest);
                report.extend(task.run_group(&group, &options)?);
            }
        }
        Ok(report)
    }
}
