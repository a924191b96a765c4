/// Standard output utilities for batch results
use colored::*;
use pcpe_bio::ArchiveReport;
use pcpe_utils::BatchReport;
use std::path::Path;

/// Display a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Display a warning message
pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Display an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Tree structure item
pub fn tree_item(is_last: bool, label: &str, value: Option<&str>) {
    let prefix = if is_last { "└─" } else { "├─" };
    if let Some(val) = value {
        println!("{} {}: {}", prefix.dimmed(), label, val);
    } else {
        println!("{} {}", prefix.dimmed(), label);
    }
}

/// Completion notice for one archive
pub fn completion_notice(path: &Path) -> String {
    format!("Read file {}", path.display())
}

fn archive_details(report: &ArchiveReport) {
    println!("{}", report.archive.input.display().to_string().bold());
    tree_item(false, "records", Some(&report.records.to_string()));
    tree_item(false, "distinct sequences", Some(&report.groups.to_string()));
    tree_item(false, "duplicates", Some(&report.duplicates().to_string()));
    if report.malformed_headers > 0 {
        tree_item(false, "malformed headers", Some(&report.malformed_headers.to_string()));
    }
    if report.incomplete_records > 0 {
        tree_item(false, "headers without sequence", Some(&report.incomplete_records.to_string()));
    }
    tree_item(false, "identifiers", Some(&report.archive.id_path.display().to_string()));
    tree_item(true, "sequences", Some(&report.archive.seq_path.display().to_string()));
}

/// Print per-archive details (when verbose), failures and the batch totals
pub fn print_summary(report: &BatchReport, verbose: u8) {
    if verbose > 0 {
        for archive in report.succeeded() {
            archive_details(archive);
        }
    }

    for (path, err) in report.failures() {
        error(&format!("{}: {}", path.display(), err));
    }

    let succeeded = report.succeeded().count();
    let summary = format!(
        "{} of {} archive(s) processed: {} records, {} distinct sequences ({:.2?})",
        succeeded,
        report.outcomes.len(),
        report.total_records(),
        report.total_groups(),
        report.elapsed
    );
    if report.is_success() {
        success(&summary);
    } else {
        warning(&summary);
    }

    let skipped = report.total_skipped();
    if skipped > 0 {
        warning(&format!(
            "{} record(s) skipped because of malformed headers or missing sequence",
            skipped
        ));
    }
}
