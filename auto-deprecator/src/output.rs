use crate::rewrite::DeclarationReport;
use crate::runner::{FileError, RunReport};
use crate::utils::normalize_display_path;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::time::Duration;

/// Print the exclusion list in styled format.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_exclusion_list(writer: &mut impl Write, folders: &[String]) -> std::io::Result<()> {
    if folders.is_empty() {
        let defaults = crate::constants::DEFAULT_EXCLUDE_FOLDERS();
        let mut sorted_defaults: Vec<&str> = defaults.iter().copied().collect();
        sorted_defaults.sort_unstable();
        let list = sorted_defaults.join(", ");
        writeln!(
            writer,
            "{} {}",
            "[OK] Using default exclusions only:".green(),
            list.dimmed()
        )?;
    } else {
        let list = folders
            .iter()
            .map(std::string::String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(writer, "{} {}", "Excluding:".yellow().bold(), list)?;
    }
    Ok(())
}

/// Create a progress bar; the runner sets its length once files are known.
///
/// In test mode, returns a hidden progress bar to avoid polluting test output.
#[must_use]
pub fn create_progress_bar(total_files: u64) -> ProgressBar {
    // In test mode, return a hidden progress bar to avoid polluting test output
    if cfg!(test) {
        return ProgressBar::hidden();
    }

    let pb =
        ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::stderr_with_hz(20));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_message("rewriting...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.tick(); // Force initial draw
    pb
}

/// Print the main header with box-drawing characters.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_header(writer: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        "╔════════════════════════════════════════╗".cyan()
    )?;
    writeln!(
        writer,
        "{}",
        "║  Deprecation Cleanup Results           ║".cyan().bold()
    )?;
    writeln!(
        writer,
        "{}",
        "╚════════════════════════════════════════╝".cyan()
    )?;
    writeln!(
        writer,
        "{}",
        format!(
            "Current version {} (from {})",
            report.current.version.to_string().bold(),
            origin_label(report)
        )
        .dimmed()
    )?;
    writeln!(writer)?;
    Ok(())
}

fn origin_label(report: &RunReport) -> &'static str {
    match report.current.origin {
        crate::version::VersionOrigin::Override => crate::constants::DEPRECATE_VERSION_ENV,
        crate::version::VersionOrigin::Literal => "explicit version",
        crate::version::VersionOrigin::VersionSource => "version source",
    }
}

/// Print summary with colored "pills".
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary_pills(writer: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    fn pill(label: &str, count: usize, color: colored::Color) -> String {
        if count == 0 {
            format!("{}: {}", label, count.to_string().green())
        } else {
            format!("{}: {}", label, count.to_string().color(color).bold())
        }
    }

    writeln!(
        writer,
        "{}  {}  {}  {}  {}",
        pill("Files", report.files_scanned, colored::Color::Cyan),
        pill("Changed", report.changed_files(), colored::Color::Cyan),
        pill("Removed", report.removed_count(), colored::Color::Cyan),
        pill("Expiring", report.expiring_count(), colored::Color::Yellow),
        pill("Errors", report.errors.len(), colored::Color::Red),
    )?;
    writeln!(writer)?;
    Ok(())
}

/// Helper to create a styled table
fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

/// Print one line per changed file.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_changed_files(writer: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    for file in report.files.iter().filter(|f| f.rewrite.changed) {
        let path = normalize_display_path(&file.path);
        let count = file.rewrite.removed.len();
        if file.written {
            writeln!(writer, "  {} {} ({} removed)", "Rewrote:".green(), path, count)?;
        } else {
            writeln!(
                writer,
                "  {} {} ({} to remove)",
                "[DRY-RUN] Would rewrite:".yellow(),
                path,
                count
            )?;
        }
    }
    Ok(())
}

/// Print removed declarations as a table.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_removed(writer: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    if report.removed_count() == 0 {
        return Ok(());
    }

    let title = if report.dry_run {
        "Declarations To Remove"
    } else {
        "Removed Declarations"
    };
    writeln!(writer, "\n{}", title.bold().underline())?;

    let mut table = create_table(vec!["Name", "Kind", "Location", "Lines", "Expiry", "Marker"]);

    for file in &report.files {
        for decl in &file.rewrite.removed {
            table.add_row(declaration_row(&normalize_display_path(&file.path), decl));
        }
        for name in &file.rewrite.collapsed {
            table.add_row(vec![
                Cell::new(name).add_attribute(Attribute::Bold),
                Cell::new("scope").add_attribute(Attribute::Dim),
                Cell::new(normalize_display_path(&file.path)),
                Cell::new(""),
                Cell::new(""),
                Cell::new("emptied").fg(Color::Yellow),
            ]);
        }
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

fn declaration_row(path: &str, decl: &DeclarationReport) -> Vec<Cell> {
    let form = match decl.form {
        crate::annotation::SourceForm::Structured => "decorator",
        crate::annotation::SourceForm::CommentBased => "comment",
    };
    vec![
        Cell::new(&decl.name).add_attribute(Attribute::Bold),
        Cell::new(decl.kind.as_str()).add_attribute(Attribute::Dim),
        Cell::new(format!("{path}:{}", decl.line)),
        Cell::new(decl.span.to_string()),
        Cell::new(decl.expiry.as_ref().map(ToString::to_string).unwrap_or_default())
            .fg(Color::Red),
        Cell::new(form),
    ]
}

/// Print warnings for declarations that expire at the current version.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_expiring(writer: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    for file in &report.files {
        for decl in &file.rewrite.expiring {
            writeln!(
                writer,
                "  {} {}:{} {}",
                "[EXPIRING]".yellow().bold(),
                normalize_display_path(&file.path),
                decl.line,
                decl.expiring_message()
            )?;
        }
    }
    Ok(())
}

/// Print a list of file errors.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_file_errors(writer: &mut impl Write, errors: &[FileError]) -> std::io::Result<()> {
    if errors.is_empty() {
        return Ok(());
    }

    writeln!(writer, "\n{}", "Errors".bold().underline().red())?;

    let mut table = create_table(vec!["File", "Error"]);

    for e in errors {
        table.add_row(vec![
            Cell::new(normalize_display_path(&e.path)).add_attribute(Attribute::Bold),
            Cell::new(&e.error).fg(Color::Red),
        ]);
    }

    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print the full report.
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
pub fn print_report(
    writer: &mut impl Write,
    report: &RunReport,
    verbose: bool,
) -> std::io::Result<()> {
    print_header(writer, report)?;
    print_summary_pills(writer, report)?;

    if report.changed_files() == 0 && report.errors.is_empty() {
        writeln!(writer, "{}", "[OK] Nothing has expired.".green().bold())?;
    } else {
        print_changed_files(writer, report)?;
    }
    print_expiring(writer, report)?;

    if verbose {
        print_removed(writer, report)?;
    }
    print_file_errors(writer, &report.errors)?;
    Ok(())
}

/// Print a summary line, plus errors.
///
/// # Errors
///
/// Returns an error if writing to the writer fails.
pub fn print_report_quiet(writer: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    print_file_errors(writer, &report.errors)?;
    writeln!(
        writer,
        "[SUMMARY] {} files scanned, {} changed, {} declarations removed, {} errors",
        report.files_scanned,
        report.changed_files(),
        report.removed_count(),
        report.errors.len()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::{rewrite_source, FileOutcome, RewriteContext};
    use crate::version::{CurrentVersion, Version, VersionOrigin};
    use std::path::PathBuf;

    fn report() -> RunReport {
        let source = "\
@deprecate(expiry='1.0', relocate='new')
def old():
    pass


@deprecate('2.0')
def soon():
    pass
";
        let ctx = RewriteContext::new(Version::new("2.0"));
        let rewrite = rewrite_source(source, &ctx).unwrap();
        RunReport {
            current: CurrentVersion {
                version: Version::new("2.0"),
                origin: VersionOrigin::Literal,
            },
            dry_run: true,
            files_scanned: 2,
            files: vec![FileOutcome {
                path: PathBuf::from("pkg/api.py"),
                written: false,
                rewrite,
            }],
            errors: vec![FileError {
                path: PathBuf::from("pkg/bad.py"),
                error: "Parse error: boom".to_owned(),
            }],
        }
    }

    #[test]
    fn test_print_report_verbose() {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        print_report(&mut buffer, &report(), true).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        assert!(output.contains("Deprecation Cleanup Results"));
        assert!(output.contains("Current version 2.0 (from explicit version)"));
        assert!(output.contains("[DRY-RUN] Would rewrite: pkg/api.py (1 to remove)"));
        assert!(output.contains("Function \"soon\" will be deprecated on version 2.0"));
        assert!(output.contains("Declarations To Remove"));
        assert!(output.contains("old"));
        assert!(output.contains("Parse error: boom"));
    }

    #[test]
    fn test_print_report_quiet() {
        let mut buffer = Vec::new();
        print_report_quiet(&mut buffer, &report()).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains(
            "[SUMMARY] 2 files scanned, 1 changed, 1 declarations removed, 1 errors"
        ));
    }

    #[test]
    fn test_print_exclusion_list() {
        let mut buffer = Vec::new();
        print_exclusion_list(&mut buffer, &["legacy".to_owned()]).unwrap();
        assert!(String::from_utf8(buffer).unwrap().contains("legacy"));
    }
}
