//! Template precompilation
//!
//! Precompiling turns template markup into the source of a JavaScript
//! expression the Handlebars runtime can load. This crate treats that step as
//! a black box behind [`Precompiler`]; the adapter here only applies content
//! hooks and the optional `Handlebars.template(...)` materialization.

use handlebars::Handlebars;
use regex::Regex;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use tracing::debug;

use crate::error::CompileError;
use crate::namespace::json_string;
use crate::options::Options;

/// Handlebars runtime compiler revision emitted in template specs
pub const COMPILER_REVISION: u32 = 8;

/// Runtime versions compatible with [`COMPILER_REVISION`]
pub const COMPILER_VERSIONS: &str = ">= 4.3.0";

/// Turns template markup into a compiled template expression
pub trait Precompiler {
    fn precompile(&self, source: &str) -> Result<String, CompileError>;
}

/// Inverse block openers (`{{^if a}}`, `{{~^each xs}}`), not the bare `{{^}}` else
static INVERSE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(~?)\^(\s*[^\s}~])").expect("inverse opener regex is valid"));

/// Built-in precompiler.
///
/// Markup is checked for syntax errors with the `handlebars` parser, so a
/// malformed template still fails the build. The emitted spec only records
/// the runtime revision and the source text: it has no `main` function, so
/// `Handlebars.template` cannot render it. Use it to validate bundles and
/// configure `precompiler.command` to produce runnable specs.
///
/// The parser's grammar is close to Handlebars.js but not identical. Inverse
/// blocks are rewritten to regular blocks before checking, since the nesting
/// rules are the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandlebarsPrecompiler;

impl HandlebarsPrecompiler {
    fn check(source: &str) -> Result<(), CompileError> {
        let normalized = INVERSE_OPEN.replace_all(source, "{{$1#$2");
        let mut registry = Handlebars::new();
        registry
            .register_template_string("source", normalized.as_ref())
            .map_err(|e| CompileError::new(e.to_string()))
    }
}

impl Precompiler for HandlebarsPrecompiler {
    fn precompile(&self, source: &str) -> Result<String, CompileError> {
        Self::check(source)?;

        Ok(format!(
            r#"{{"compiler":[{},{}],"source":{}}}"#,
            COMPILER_REVISION,
            json_string(COMPILER_VERSIONS),
            json_string(source)
        ))
    }
}

/// Delegates to an external program.
///
/// The template text is written to the program's stdin; its trimmed stdout is
/// the compiled expression. A non-zero exit status is a compile error carrying
/// the program's stderr.
#[derive(Debug, Clone)]
pub struct CommandPrecompiler {
    program: String,
    args: Vec<String>,
}

impl CommandPrecompiler {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv list; `None` when the list is empty
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl Precompiler for CommandPrecompiler {
    fn precompile(&self, source: &str) -> Result<String, CompileError> {
        debug!(program = %self.program, args = ?self.args, "CommandPrecompiler::precompile");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CompileError::new(format!("failed to run precompiler `{}`: {}", self.program, e)))?;

        // Feed stdin from another thread so a chatty child cannot deadlock on a full pipe
        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.to_string();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| CompileError::new(format!("precompiler `{}` failed: {}", self.program, e)))?;

        if let Some(handle) = writer {
            match handle.join() {
                Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                    return Err(CompileError::new(format!("failed to send template to precompiler: {e}")));
                }
                _ => {}
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("precompiler `{}` exited with {}", self.program, output.status)
            } else {
                stderr
            };
            return Err(CompileError::new(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Run one template's text through content hooks, the precompiler and the
/// optional materialization wrapper.
pub fn compile_source(
    raw: &str,
    options: &Options,
    precompiler: &dyn Precompiler,
) -> Result<String, CompileError> {
    let content = options.hooks.process_content(raw);
    let compiled = precompiler.precompile(&content)?;
    Ok(if options.wrapped {
        materialize(&compiled)
    } else {
        compiled
    })
}

/// Wrap a compiled expression in the runtime's template constructor
pub fn materialize(compiled: &str) -> String {
    format!("Handlebars.template({compiled})")
}
