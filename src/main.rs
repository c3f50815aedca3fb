//! parchmint-check: validates ParchMint microfluidic device descriptions.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, warn, Level};
use tracing_subscriber::EnvFilter;

use parchmint_check::config;
use parchmint_check::parchmint::{check_file, Checked};
use parchmint_check::report::{self, OutputFormat};

/// Validates ParchMint microfluidic device descriptions.
///
/// Every problem in a document is reported in one pass. The exit status is
/// non-zero if any document is invalid or cannot be read.
#[derive(Parser, Debug)]
#[command(name = "parchmint-check")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// ParchMint JSON files or glob patterns (e.g. `designs/*.json`)
    #[arg(value_name = "FILES", required = true)]
    files: Vec<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Report format (overrides the configuration file)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Treat warnings as failures
    #[arg(long)]
    warnings_as_errors: bool,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)]
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Expands each argument as a glob pattern.
///
/// An argument that matches nothing is kept as a literal path so that a
/// missing file is reported rather than silently skipped.
fn expand_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for pattern in patterns {
        let matched: Vec<PathBuf> = match glob::glob(pattern) {
            Ok(paths) => paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!(error = %e, "Unreadable glob match");
                        None
                    }
                })
                .collect(),
            Err(e) => {
                debug!(pattern = %pattern, error = %e, "Not a glob pattern, using as path");
                Vec::new()
            }
        };

        if matched.is_empty() {
            files.push(PathBuf::from(pattern));
        } else {
            files.extend(matched);
        }
    }
    files
}

/// Entry point for parchmint-check.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    let format = match args.format {
        Some(format) => format,
        None => match cfg.output.format() {
            Ok(format) => format,
            Err(e) => {
                error!(error = %e, "Invalid output format");
                return ExitCode::FAILURE;
            }
        },
    };
    let warnings_as_errors = args.warnings_as_errors || cfg.validation.warnings_as_errors;

    let files = expand_inputs(&args.files);
    debug!(count = files.len(), "Checking documents");

    let mut results: Vec<(PathBuf, Checked)> = Vec::with_capacity(files.len());
    let mut success = true;

    for path in files {
        match check_file(&path) {
            Ok(checked) => {
                if !checked.valid || (warnings_as_errors && checked.warning_count() > 0) {
                    success = false;
                }
                results.push((path, checked));
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Cannot check document");
                eprintln!("{}: {e}", path.display());
                success = false;
            }
        }
    }

    let entries: Vec<_> = results
        .iter()
        .map(|(path, checked)| (path.as_path(), checked))
        .collect();

    match report::render_all(&entries, format) {
        Ok(out) => print!("{out}"),
        Err(e) => {
            error!(error = %e, "Failed to render report");
            return ExitCode::FAILURE;
        }
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn log_level_from_flags() {
        assert_eq!(get_log_level(0, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(0, false, "debug"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "nonsense"), Level::WARN);
        assert_eq!(get_log_level(2, false, "error"), Level::DEBUG);
    }

    #[test]
    fn unmatched_pattern_is_kept_as_path() {
        let files = expand_inputs(&["/nonexistent/*.json".to_string()]);
        assert_eq!(files, vec![PathBuf::from("/nonexistent/*.json")]);
    }

    #[test]
    fn glob_expands_matches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();
        std::fs::write(dir.path().join("b.json"), "{}").unwrap();
        std::fs::write(dir.path().join("c.txt"), "").unwrap();

        let pattern = dir.path().join("*.json").display().to_string();
        let mut files = expand_inputs(&[pattern]);
        files.sort();
        assert_eq!(
            files,
            vec![dir.path().join("a.json"), dir.path().join("b.json")]
        );
    }
}
