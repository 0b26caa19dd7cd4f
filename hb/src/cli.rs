//! CLI argument parsing for hb

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::options::{NamespaceSetting, OptionsConfig};

#[derive(Parser, Debug)]
#[command(name = "hb")]
#[command(author, version, about = "Precompile Handlebars templates into JavaScript bundles", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build configured targets (all when none are named)
    Build {
        /// Target names
        targets: Vec<String>,
    },

    /// Compile sources into one bundle without a config file
    Compile {
        /// Source files or glob patterns (prefix with ! to exclude)
        #[arg(required = true)]
        sources: Vec<String>,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        options: OptionArgs,
    },

    /// List configured targets
    Targets,

    /// Show resolved options for a target (task-level options when omitted)
    Options {
        /// Target name
        target: Option<String>,
    },
}

/// Option overrides accepted by `compile`
#[derive(clap::Args, Debug, Default)]
pub struct OptionArgs {
    /// Namespace to store templates under (default: JST)
    #[arg(short, long, conflicts_with = "no_namespace")]
    pub namespace: Option<String>,

    /// Emit bare compiled expressions instead of namespace assignments
    #[arg(long)]
    pub no_namespace: bool,

    /// Do not wrap compiled templates in Handlebars.template()
    #[arg(long)]
    pub no_wrap: bool,

    /// Wrap the bundle in an AMD define()
    #[arg(long)]
    pub amd: bool,

    /// Separator placed between statements
    #[arg(short, long)]
    pub separator: Option<String>,

    /// Regex that marks a filename as a partial (default: ^_)
    #[arg(short, long)]
    pub partial_regex: Option<String>,
}

impl OptionArgs {
    /// Overrides for the flags that were given; unset flags leave config alone
    pub fn to_config(&self) -> OptionsConfig {
        let namespace = if self.no_namespace {
            Some(NamespaceSetting::Enabled(false))
        } else {
            self.namespace.clone().map(NamespaceSetting::Name)
        };

        OptionsConfig {
            namespace,
            separator: self.separator.clone(),
            wrapped: self.no_wrap.then_some(false),
            amd: self.amd.then_some(true),
            partial_regex: self.partial_regex.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compile() {
        let cli = Cli::parse_from([
            "hb",
            "compile",
            "-o",
            "out.js",
            "--no-wrap",
            "--amd",
            "-n",
            "App.T",
            "a.hbs",
            "b/*.hbs",
        ]);

        match cli.command {
            Command::Compile {
                sources,
                output,
                options,
            } => {
                assert_eq!(sources, vec!["a.hbs", "b/*.hbs"]);
                assert_eq!(output, PathBuf::from("out.js"));
                let config = options.to_config();
                assert_eq!(config.wrapped, Some(false));
                assert_eq!(config.amd, Some(true));
                assert_eq!(config.namespace, Some(NamespaceSetting::Name("App.T".into())));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unset_flags_do_not_override() {
        let config = OptionArgs::default().to_config();
        assert_eq!(config, OptionsConfig::default());
    }

    #[test]
    fn test_namespace_flags_conflict() {
        let result = Cli::try_parse_from(["hb", "compile", "-o", "x.js", "-n", "A", "--no-namespace", "a.hbs"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_targets() {
        let cli = Cli::parse_from(["hb", "-c", "hb.yml", "build", "app", "admin"]);
        assert_eq!(cli.config, Some(PathBuf::from("hb.yml")));
        assert!(matches!(cli.command, Command::Build { ref targets } if targets == &["app", "admin"]));
    }
}
