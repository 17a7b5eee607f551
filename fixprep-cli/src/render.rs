//! Plain-text rendering of run reports and fixture lists.

use fixprep_types::fixture::FixtureSpec;
use fixprep_types::report::RunReport;
use std::fmt::Write as _;

pub fn render_summary(report: &RunReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        let _ = writeln!(out, "{:<40} {}", outcome.directory, outcome.status.as_str());
        if let Some(message) = &outcome.message {
            let _ = writeln!(out, "    {}", message);
        }
    }

    let summary = report.summary();
    let _ = writeln!(
        out,
        "\n{} completed, {} skipped, {} with collaborator errors",
        summary.completed, summary.skipped, summary.failed
    );
    out
}

pub fn render_fixture_list(fixtures: &[FixtureSpec]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {:<24} DATABASES", "DIRECTORY");
    let _ = writeln!(out, "  {:<24} ---------", "---------");
    for fixture in fixtures {
        let _ = writeln!(
            out,
            "  {:<24} {}",
            fixture.directory,
            fixture.databases.join(", ")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixprep_types::report::{FixtureOutcome, OutcomeStatus, ToolInfo};

    #[test]
    fn summary_lists_each_fixture_and_totals() {
        let mut report = RunReport::new(ToolInfo {
            name: "fixprep".to_string(),
            version: None,
        });
        report.outcomes.push(FixtureOutcome {
            directory: "tests/Fixtures/bookstore".to_string(),
            databases: vec!["bookstore".to_string()],
            status: OutcomeStatus::Completed,
            message: None,
            steps: vec![],
        });
        report.outcomes.push(FixtureOutcome {
            directory: "tests/Fixtures/schemas".to_string(),
            databases: vec!["bookstore".to_string()],
            status: OutcomeStatus::SkippedMissingTemplate,
            message: Some("no \"build.properties.dist\" file found".to_string()),
            steps: vec![],
        });

        let text = render_summary(&report);
        assert!(text.contains("tests/Fixtures/bookstore"));
        assert!(text.contains("skipped_missing_template"));
        assert!(text.contains("    no \"build.properties.dist\" file found"));
        assert!(text.contains("1 completed, 1 skipped, 0 with collaborator errors"));
    }

    #[test]
    fn fixture_list_joins_databases() {
        let text = render_fixture_list(&[FixtureSpec::new(
            "bookstore",
            ["bookstore", "bookstore-cms"],
        )]);
        assert!(text.contains("bookstore, bookstore-cms"));
    }
}
