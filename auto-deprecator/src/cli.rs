use clap::{Args, Parser};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.auto-deprecator.toml, or [tool.auto-deprecator] in pyproject.toml):
  Searched for from the first path upwards. Command-line flags win over it.

  [auto-deprecator]
  current_version = \"2.1.0\"        # Version compared against each expiry
  version_source = \"mypkg\"         # ...or read mypkg.__version__ instead
  marker = \"deprecate\"             # Decorator name of the marker
  helper_module = \"auto_deprecator\" # Module the decorator is imported from
  exclude_folders = [\"build\", \"legacy\"]

ENVIRONMENT:
  DEPRECATE_VERSION overrides every other version setting.

ANNOTATIONS:
  @deprecate(expiry=\"2.1.0\", relocate=\"new_func\")
  def old_func(): ...

  def old_func():
      # auto-deprecate: expiry=2.1.0
      ...
";

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct OutputOptions {
    /// Compute and report the changes without writing any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Like --dry-run, but exit with code 1 if any file would change.
    #[arg(long)]
    pub check: bool,

    /// Output raw JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output (every removed and expiring declaration).
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: only errors and the final summary line.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Command line interface configuration using `clap`.
/// This struct defines the arguments and flags accepted by the program.
#[derive(Parser, Debug)]
#[command(
    name = "auto-deprecate",
    author,
    version,
    about = "auto-deprecate - Remove Python functions, methods and classes whose deprecation version has passed",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    /// Files or directories to rewrite.
    /// Files are processed whatever their extension; directories are walked for .py files.
    /// When no paths are provided, defaults to the current directory.
    pub paths: Vec<PathBuf>,

    /// Current version to compare expiries against.
    #[arg(long, value_name = "VER")]
    pub deprecate_version: Option<String>,

    /// Dotted module whose `__version__` is the current version (e.g. mypkg.version).
    #[arg(long, value_name = "MODULE")]
    pub version_source: Option<String>,

    /// Project root: --version-source is resolved against it and the
    /// configuration search starts there. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Folders to exclude while walking directories.
    #[arg(long, alias = "exclude-folder", value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Explicit configuration file instead of the upward search.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "auto-deprecate",
            "src",
            "tests/test_api.py",
            "--deprecate-version",
            "2.1.0",
            "--exclude",
            "legacy",
            "--exclude",
            "vendor",
            "--check",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.paths.len(), 2);
        assert_eq!(cli.deprecate_version.as_deref(), Some("2.1.0"));
        assert_eq!(cli.exclude, vec!["legacy".to_owned(), "vendor".to_owned()]);
        assert!(cli.output.check);
        assert!(cli.output.json);
        assert!(!cli.output.dry_run);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["auto-deprecate", "-q", "-v"]).is_err());
    }
}
