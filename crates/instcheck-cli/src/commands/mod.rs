pub mod check;
pub mod completions;
pub mod man_pages;
pub mod normalize;

use console::Style;
use instcheck_core::ReconciliationReport;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INPUT_ERROR: u8 = 2;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

/// One-line count of everything that made a check fail.
pub fn failure_summary(report: &ReconciliationReport) -> String {
    format!(
        "{} missing, {} extra, {} policy violation(s)",
        report.missing().len(),
        report.extra().len(),
        report.violations.len()
    )
}

pub fn colorize_failure(msg: &str) -> String {
    Style::new()
        .red()
        .bold()
        .for_stderr()
        .apply_to(format!("✗ {msg}"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use instcheck_core::reconcile;
    use instcheck_schema::{BuildOptions, PathNormalizer};

    #[test]
    fn json_pretty_serializes_string() {
        let val = serde_json::json!({"key": "value"});
        let result = json_pretty(&val).unwrap();
        assert!(result.contains("\"key\""));
        assert!(result.contains("\"value\""));
    }

    #[test]
    fn failure_summary_counts() {
        let n = PathNormalizer::default();
        let report = reconcile(
            &n.normalize_all(["bin/b", "bin/c"]),
            &n.normalize_all(["bin/a"]),
            &BuildOptions::default(),
        );
        assert_eq!(
            failure_summary(&report),
            "1 missing, 2 extra, 0 policy violation(s)"
        );
    }

    #[test]
    fn colorize_failure_keeps_message() {
        let line = colorize_failure("check failed");
        assert!(line.contains("✗"));
        assert!(line.contains("check failed"));
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_ne!(EXIT_SUCCESS, EXIT_FAILURE);
        assert_ne!(EXIT_FAILURE, EXIT_INPUT_ERROR);
    }
}
