//! ESLint JSON report conversion.
//!
//! `eslint --format json` prints one entry per linted file. The entries are
//! folded into a single check-run output: a count title, a per-file summary,
//! and one annotation per message.

use std::path::Path;

use lintgate_core::{Annotation, AnnotationLevel, CheckRunOutput, LintReport};
use serde::Deserialize;

/// Annotations accepted per check-run update.
pub const MAX_ANNOTATIONS: usize = 50;

/// One file in an ESLint JSON report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EslintFileResult {
    pub file_path: String,
    #[serde(default)]
    pub messages: Vec<EslintMessage>,
    #[serde(default)]
    pub error_count: u32,
    #[serde(default)]
    pub warning_count: u32,
}

/// One problem reported by ESLint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EslintMessage {
    #[serde(default)]
    pub rule_id: Option<String>,
    /// 1 = warning, 2 = error
    pub severity: u8,
    pub message: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub end_line: Option<u32>,
}

pub fn parse_report(stdout: &str) -> Result<Vec<EslintFileResult>, serde_json::Error> {
    serde_json::from_str(stdout)
}

fn relative_path(file_path: &str, root: &Path) -> String {
    let path = Path::new(file_path);
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn annotation(path: &str, message: &EslintMessage) -> Annotation {
    let start_line = message.line.unwrap_or(1).max(1);
    Annotation {
        path: path.to_string(),
        start_line,
        end_line: message.end_line.unwrap_or(start_line).max(start_line),
        annotation_level: if message.severity >= 2 {
            AnnotationLevel::Failure
        } else {
            AnnotationLevel::Warning
        },
        message: message.message.clone(),
        title: message.rule_id.clone(),
    }
}

/// Build the lint report for `results`, with paths made relative to `root`.
///
/// The conclusion is `failure` exactly when some file has errors.
pub fn build_report(results: &[EslintFileResult], root: &Path) -> LintReport {
    let errors: u32 = results.iter().map(|r| r.error_count).sum();
    let warnings: u32 = results.iter().map(|r| r.warning_count).sum();

    let mut annotations = Vec::new();
    let mut lines = Vec::new();
    for result in results {
        let path = relative_path(&result.file_path, root);
        if result.error_count > 0 || result.warning_count > 0 {
            lines.push(format!(
                "- `{}`: {} error(s), {} warning(s)",
                path, result.error_count, result.warning_count
            ));
        }
        annotations.extend(result.messages.iter().map(|m| annotation(&path, m)));
    }

    let mut summary = if lines.is_empty() {
        "No problems found".to_string()
    } else {
        lines.join("\n")
    };
    if annotations.len() > MAX_ANNOTATIONS {
        let hidden = annotations.len() - MAX_ANNOTATIONS;
        annotations.truncate(MAX_ANNOTATIONS);
        summary.push_str(&format!("\n\n{hidden} more annotation(s) not shown."));
    }

    let output = CheckRunOutput {
        title: format!("{errors} error(s), {warnings} warning(s)"),
        summary,
        annotations,
    };
    if errors > 0 {
        LintReport::failure(output)
    } else {
        LintReport::success(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lintgate_core::Conclusion;

    const REPORT: &str = r#"[
      {
        "filePath": "/repo/src/a.ts",
        "messages": [
          { "ruleId": "no-unused-vars", "severity": 2, "message": "'x' is defined but never used.",
            "line": 3, "column": 7, "endLine": 3, "endColumn": 8 },
          { "ruleId": "eqeqeq", "severity": 1, "message": "Expected '===' and instead saw '=='.",
            "line": 10, "column": 5 }
        ],
        "errorCount": 1,
        "warningCount": 1,
        "fixableErrorCount": 0,
        "fixableWarningCount": 0
      },
      {
        "filePath": "/repo/src/b.ts",
        "messages": [],
        "errorCount": 0,
        "warningCount": 0
      }
    ]"#;

    #[test]
    fn test_build_report_with_errors() {
        let results = parse_report(REPORT).unwrap();
        let report = build_report(&results, Path::new("/repo"));

        assert_eq!(report.conclusion, Conclusion::Failure);
        assert_eq!(report.output.title, "1 error(s), 1 warning(s)");
        assert_eq!(report.output.summary, "- `src/a.ts`: 1 error(s), 1 warning(s)");
        assert_eq!(report.output.annotations.len(), 2);

        let first = &report.output.annotations[0];
        assert_eq!(first.path, "src/a.ts");
        assert_eq!(first.start_line, 3);
        assert_eq!(first.end_line, 3);
        assert_eq!(first.annotation_level, AnnotationLevel::Failure);
        assert_eq!(first.title.as_deref(), Some("no-unused-vars"));

        let second = &report.output.annotations[1];
        assert_eq!(second.annotation_level, AnnotationLevel::Warning);
        assert_eq!(second.end_line, 10);
    }

    #[test]
    fn test_warnings_only_is_success() {
        let results = parse_report(
            r#"[{ "filePath": "/repo/a.js", "messages": [
                 { "ruleId": "semi", "severity": 1, "message": "Missing semicolon.", "line": 1 }
               ], "errorCount": 0, "warningCount": 1 }]"#,
        )
        .unwrap();
        let report = build_report(&results, Path::new("/repo"));

        assert_eq!(report.conclusion, Conclusion::Success);
        assert_eq!(report.output.annotations.len(), 1);
    }

    #[test]
    fn test_clean_report() {
        let results =
            parse_report(r#"[{ "filePath": "/repo/a.js", "messages": [], "errorCount": 0, "warningCount": 0 }]"#)
                .unwrap();
        let report = build_report(&results, Path::new("/repo"));

        assert_eq!(report.conclusion, Conclusion::Success);
        assert_eq!(report.output.title, "0 error(s), 0 warning(s)");
        assert_eq!(report.output.summary, "No problems found");
        assert!(report.output.annotations.is_empty());
    }

    #[test]
    fn test_fatal_parse_error_without_line() {
        let results = parse_report(
            r#"[{ "filePath": "/repo/a.ts", "messages": [
                 { "ruleId": null, "fatal": true, "severity": 2, "message": "Parsing error: Unexpected token" }
               ], "errorCount": 1, "warningCount": 0 }]"#,
        )
        .unwrap();
        let report = build_report(&results, Path::new("/repo"));

        let annotation = &report.output.annotations[0];
        assert_eq!(annotation.start_line, 1);
        assert_eq!(annotation.end_line, 1);
        assert!(annotation.title.is_none());
    }

    #[test]
    fn test_annotations_capped() {
        let messages: Vec<String> = (1..=60)
            .map(|i| format!(r#"{{ "ruleId": "semi", "severity": 2, "message": "m", "line": {i} }}"#))
            .collect();
        let json = format!(
            r#"[{{ "filePath": "/repo/a.js", "messages": [{}], "errorCount": 60, "warningCount": 0 }}]"#,
            messages.join(",")
        );
        let report = build_report(&parse_report(&json).unwrap(), Path::new("/repo"));

        assert_eq!(report.output.annotations.len(), MAX_ANNOTATIONS);
        assert!(report.output.summary.ends_with("10 more annotation(s) not shown."));
    }

    #[test]
    fn test_unreadable_report() {
        assert!(parse_report("Oops! Something went wrong!").is_err());
    }
}
