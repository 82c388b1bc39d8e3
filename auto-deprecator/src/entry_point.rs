use crate::cli::Cli;
use crate::config::Config;
use crate::constants::DEPRECATE_VERSION_ENV;
use crate::runner::{RunOptions, RunReport};
use crate::version::{VersionSettings, VersionSource};
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Exit code for a run that finished without problems.
pub const EXIT_OK: i32 = 0;
/// Exit code when a file failed, or when `--check` found pending changes.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for usage and configuration errors.
pub const EXIT_CONFIG: i32 = 2;

/// Runs the rewriter with the given arguments.
///
/// # Errors
///
/// Returns an error if writing the report fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Run auto-deprecate with the given arguments, writing output to the specified writer.
///
/// This is the testable version of `run_with_args` that allows output capture.
/// The `DEPRECATE_VERSION` environment variable is read here, once, and
/// handed to version resolution as the override.
///
/// # Errors
///
/// Returns an error if writing the report fails.
pub fn run_with_args_to<W: std::io::Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let override_version = std::env::var(DEPRECATE_VERSION_ENV).ok();
    run_with_override(args, override_version, writer)
}

/// Same as [`run_with_args_to`], with the override passed in instead of read
/// from the environment.
///
/// # Errors
///
/// Returns an error if writing the report fails.
#[allow(clippy::too_many_lines)]
pub fn run_with_override<W: std::io::Write>(
    args: Vec<String>,
    override_version: Option<String>,
    writer: &mut W,
) -> Result<i32> {
    let mut program_args = vec!["auto-deprecate".to_owned()];
    program_args.extend(args);
    let cli_var = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => {
            match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    // Let clap print help/version as intended, but captured by redirect
                    write!(writer, "{e}")?;
                    writer.flush()?;
                    return Ok(EXIT_OK);
                }
                _ => {
                    eprint!("{e}");
                    return Ok(EXIT_CONFIG);
                }
            }
        }
    };

    let root = cli_var.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let paths = if cli_var.paths.is_empty() {
        vec![root.clone()]
    } else {
        cli_var.paths.clone()
    };

    // Load config from --config, or search upwards from the root or first path
    let loaded = if let Some(config_file) = &cli_var.config {
        Config::load_from_file(config_file)
    } else {
        let start = cli_var.root.as_ref().unwrap_or(&paths[0]);
        Config::load_from_path(&start.canonicalize().unwrap_or_else(|_| start.clone()))
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            return Ok(EXIT_CONFIG);
        }
    };
    let file_config = &config.auto_deprecator;

    // Version flags on the command line replace both version keys of the file
    let cli_sets_version =
        cli_var.deprecate_version.is_some() || cli_var.version_source.is_some();
    let (literal, version_module) = if cli_sets_version {
        (cli_var.deprecate_version.clone(), cli_var.version_source.clone())
    } else {
        (
            file_config.current_version.clone(),
            file_config.version_source.clone(),
        )
    };

    // Without --root, the directory holding the configuration file is the project root
    let source_root = cli_var.root.clone().unwrap_or_else(|| {
        config
            .config_file_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    });

    let settings = VersionSettings {
        override_version,
        literal,
        version_source: version_module.map(|module| VersionSource::new(module, source_root)),
    };

    let mut exclude_folders = file_config.exclude_folders.clone().unwrap_or_default();
    exclude_folders.extend(cli_var.exclude.clone());

    let output = &cli_var.output;
    let dry_run = output.dry_run || output.check;
    let show_progress = !output.json && !output.quiet;

    if output.verbose && !output.json {
        eprintln!("[VERBOSE] auto-deprecate v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("[VERBOSE] Using {} threads", rayon::current_num_threads());
        eprintln!("[VERBOSE] Configuration:");
        if let Some(path) = &config.config_file_path {
            eprintln!("   Config file: {}", crate::utils::normalize_display_path(path));
        }
        eprintln!("   Marker: @{}", file_config.marker());
        eprintln!("   Helper module: {}", file_config.helper_module());
        eprintln!("   Dry run: {dry_run}");
        eprintln!("   Paths: {paths:?}");
        eprintln!();
    }

    if show_progress {
        crate::output::print_exclusion_list(writer, &exclude_folders).ok();
    }

    let progress = show_progress.then(|| Arc::new(crate::output::create_progress_bar(0)));

    let options = RunOptions {
        exclude: exclude_folders,
        dry_run,
        verbose: output.verbose,
        marker: file_config.marker().to_owned(),
        helper_module: file_config.helper_module().to_owned(),
        progress_bar: progress.clone(),
    };

    let start_time = std::time::Instant::now();
    let result = crate::runner::run(&paths, &settings, &options);

    if let Some(p) = progress {
        p.finish_and_clear();
    }

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} {e}", "Error:".red().bold());
            return Ok(EXIT_CONFIG);
        }
    };

    if output.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else if output.quiet {
        crate::output::print_report_quiet(writer, &report)?;
    } else {
        crate::output::print_report(writer, &report, output.verbose)?;
        writeln!(
            writer,
            "\n[TIME] Completed in {:.2}s",
            start_time.elapsed().as_secs_f64()
        )?;
    }

    Ok(exit_code(&report, output.check))
}

/// Maps a finished run to its exit code.
#[must_use]
pub fn exit_code(report: &RunReport, check: bool) -> i32 {
    if report.has_errors() || (check && report.changed_files() > 0) {
        EXIT_FAILURE
    } else {
        EXIT_OK
    }
}
