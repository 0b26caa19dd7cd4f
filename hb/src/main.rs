use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use hbsbundle::cli::{Cli, Command};
use hbsbundle::config::Config;
use hbsbundle::files;
use hbsbundle::{BundleTask, FileGroup, Options, TaskReport};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn print_report(report: &TaskReport) {
    for dest in &report.written {
        println!("{} File \"{}\" created.", "✓".green(), dest.display());
    }
    for dest in &report.skipped {
        println!("{} Destination \"{}\" not written.", "!".yellow(), dest.display());
    }
}

fn cmd_build(config: &Config, base: &Path, targets: &[String]) -> Result<()> {
    let report = config.build(base, targets)?;
    print_report(&report);
    Ok(())
}

fn cmd_compile(config: &Config, base: &Path, sources: &[String], output: PathBuf, overrides: &Options) -> Result<()> {
    let precompiler = config.precompiler.build();
    let task = BundleTask::new(base, precompiler.as_ref());
    let group = FileGroup::new(files::expand_sources(sources, base)?, output);
    let report = task.run(&[group], overrides)?;
    print_report(&report);
    Ok(())
}

fn cmd_targets(config: &Config) {
    if config.targets.is_empty() {
        println!("No targets configured");
        return;
    }
    for target in &config.targets {
        println!("{}", target.name.cyan());
        for files_config in &target.files {
            println!("  {} -> {}", files_config.src.join(", "), files_config.dest.display());
        }
    }
}

fn cmd_options(config: &Config, target: Option<&str>) -> Result<()> {
    let options = match target {
        Some(name) => {
            let target = config
                .target(name)
                .ok_or_else(|| hbsbundle::BundleError::UnknownTarget(name.to_string()))?;
            config.target_options(target)?
        }
        None => Options::resolve(&[&config.options])?,
    };
    println!("{:#?}", options);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let base = std::env::current_dir().context("Failed to determine working directory")?;

    info!(targets = config.targets.len(), "hb starting");

    match cli.command {
        Command::Build { targets } => cmd_build(&config, &base, &targets),
        Command::Compile {
            sources,
            output,
            options,
        } => {
            let resolved = Options::resolve(&[&config.options, &options.to_config()])?;
            cmd_compile(&config, &base, &sources, output, &resolved)
        }
        Command::Targets => {
            cmd_targets(&config);
            Ok(())
        }
        Command::Options { target } => cmd_options(&config, target.as_deref()),
    }
}
