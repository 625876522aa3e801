//! Shared output formatting for lint results.

use anyhow::Result;
use grain_lint::{LintResult, Severity, Violation, ViolationDiagnostic};
use miette::NamedSource;
use serde::Serialize;
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` locates the sources that the rich format renders snippets from.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Rich => print_rich(result, root),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
        };
        let formatted = violation.format();
        let severity_prefix = format!("  {}: ", violation.severity);
        for line in formatted.lines() {
            match line.strip_prefix(&severity_prefix) {
                Some(rest) => println!("  {severity_indicator}: {rest}"),
                None => println!("{line}"),
            }
        }
        println!();
    }

    print_failures(result);
    print_summary(result);
}

fn print_failures(result: &LintResult) {
    for failure in &result.failures {
        eprintln!(
            "\x1b[33mskipped\x1b[0m {}: {}",
            failure.file.display(),
            failure.reason
        );
    }
}

fn print_summary(result: &LintResult) {
    let (errors, warnings) = result.count_by_severity();

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, result.files_checked
    );
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a LintResult,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonSummary {
    errors: usize,
    warnings: usize,
    files_checked: usize,
    files_failed: usize,
}

fn json_report(result: &LintResult) -> JsonReport<'_> {
    let (errors, warnings) = result.count_by_severity();
    JsonReport {
        result,
        summary: JsonSummary {
            errors,
            warnings,
            files_checked: result.files_checked,
            files_failed: result.failures.len(),
        },
    }
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(&json_report(result))?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for violation in &result.violations {
        println!("{violation}");
    }
}

fn print_rich(result: &LintResult, root: &Path) {
    for violation in &result.violations {
        println!("{:?}", rich_report(violation, root));
    }
    print_failures(result);
    print_summary(result);
}

fn rich_report(violation: &Violation, root: &Path) -> miette::Report {
    let report = miette::Report::new(ViolationDiagnostic::from(violation));
    match std::fs::read_to_string(root.join(&violation.location.file)) {
        Ok(source) => report.with_source_code(NamedSource::new(
            violation.location.file.display().to_string(),
            source,
        )),
        Err(e) => {
            tracing::debug!(
                "No source snippet for {}: {}",
                violation.location.file.display(),
                e
            );
            report
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grain_lint::Location;
    use std::path::PathBuf;

    fn sample() -> LintResult {
        let mut result = LintResult::new();
        result.files_checked = 3;
        result.violations.push(Violation::new(
            "layer-dependencies",
            "pipesPurityViolation",
            Severity::Error,
            Location::new(PathBuf::from("src/pipes/a.pipe.ts"), 1, 1),
            "pipes cannot import io",
        ));
        result.violations.push(Violation::new(
            "max-params",
            "tooManyParams",
            Severity::Warning,
            Location::new(PathBuf::from("src/pipes/a.pipe.ts"), 4, 1),
            "too many parameters",
        ));
        result
    }

    #[test]
    fn json_report_carries_violations_and_summary() {
        let value = serde_json::to_value(json_report(&sample())).unwrap();
        assert_eq!(value["summary"]["errors"], 1);
        assert_eq!(value["summary"]["warnings"], 1);
        assert_eq!(value["summary"]["files_checked"], 3);
        assert_eq!(value["violations"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["violations"][0]["messageId"], "pipesPurityViolation");
    }

    #[test]
    fn rich_report_without_source_still_renders() {
        let result = sample();
        let report = rich_report(&result.violations[0], Path::new("/nonexistent-root"));
        assert!(report.to_string().contains("pipes cannot import io"));
    }
}
