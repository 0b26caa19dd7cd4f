//! hbsbundle - Handlebars template bundle compiler
//!
//! Precompiles Handlebars templates and partials and concatenates them into
//! JavaScript bundles that register partials with the runtime and store
//! templates under a namespace object, optionally inside an AMD module.
//!
//! # Pipeline
//!
//! ```text
//! src patterns ──► files::expand_sources ──► classify ──► precompile ──► Bundle ──► dest
//!                                             (partial?)   (wrapped?)    (ns / amd)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use hbsbundle::{BundleTask, FileGroup, HandlebarsPrecompiler, Options};
//!
//! let task = BundleTask::new(".", &HandlebarsPrecompiler);
//! let group = FileGroup::new(vec!["templates/_row.hbs".into(), "templates/list.hbs".into()], "build/templates.js");
//! let report = task.run(&[group], &Options::default())?;
//! ```

pub mod bundle;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod hooks;
pub mod namespace;
pub mod options;
pub mod precompile;
pub mod task;

pub use bundle::Bundle;
pub use classify::{Classified, SourceKind, classify};
pub use config::Config;
pub use error::{BundleError, CompileError};
pub use hooks::{DefaultHooks, RewriteHooks, RewriteRule, TemplateHooks, default_partial_name};
pub use namespace::{NamespaceDeclaration, declare};
pub use options::{DEFAULT_NAMESPACE, DEFAULT_SEPARATOR, NamespaceSetting, Options, OptionsConfig};
pub use precompile::{CommandPrecompiler, HandlebarsPrecompiler, Precompiler};
pub use task::{BundleTask, FileGroup, SourceRecord, TaskReport};
