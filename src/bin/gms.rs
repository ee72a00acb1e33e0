// src/bin/gms.rs

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::*;
use google_music_scripts::{
    cli::Cli,
    core::{commands, config_resolver::ConfigResolver, log_planner, paths::AppPaths},
    log_at,
    models::{LogOptions, Severity},
    system::logging::LoggingState,
};

/// The main entry point of `gms`.
/// It sets up logging, resolves the defaults for the requested command and
/// performs centralized error handling.
fn main() {
    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    let paths = AppPaths::from_system()?;
    let logging = LoggingState::install()?;
    configure_logging(&logging, &cli.log_options(), &paths)?;
    log::debug!("CLI args parsed: {:?}", cli);

    let command = commands::find_command(&cli.command)
        .ok_or_else(|| anyhow!("Unknown command '{}'.", cli.command))?;

    // Resolve with the name as typed: the alias layer depends on which side of the pair was used.
    let resolver = ConfigResolver::new(paths);
    log_at!(
        Severity::INFO,
        "Reading settings from {}",
        resolver
            .paths()
            .settings_path(cli.username.as_deref())
            .display()
    );
    let defaults = resolver
        .resolve_defaults(&cli.command, cli.username.as_deref())
        .with_context(|| format!("Failed to resolve defaults for '{}'", cli.command))?;

    println!("{} {}", "Defaults for".bold(), command.name.cyan());
    if defaults.is_empty() {
        println!("{}", "(none)".dimmed());
    } else {
        print!("{}", toml::to_string_pretty(&defaults)?);
    }
    Ok(())
}

/// Applies the sink plan for `options`. File logging is optional: if the log file
/// cannot be set up, logging continues on standard output only.
fn configure_logging(state: &LoggingState, options: &LogOptions, paths: &AppPaths) -> Result<()> {
    let applied =
        log_planner::plan_sinks(options, paths).and_then(|plan| state.reconfigure(&plan));

    match applied {
        Ok(()) => Ok(()),
        Err(e) if options.log_to_file => {
            let fallback = LogOptions {
                log_to_file: false,
                ..options.clone()
            };
            state.reconfigure(&log_planner::plan_sinks(&fallback, paths)?)?;
            log::warn!("File logging disabled: {}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
