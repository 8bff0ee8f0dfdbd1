//! ESLint invocation.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use lintgate_core::{Conclusion, EngineError, LintEngine, LintReport};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::report::{build_report, parse_report};

/// Command used when none is configured.
pub const DEFAULT_COMMAND: &[&str] = &["npx", "--no-install", "eslint"];

/// How to launch ESLint.
#[derive(Debug, Clone)]
pub struct EslintConfig {
    /// Command prefix; `--format json` and the target paths are appended.
    pub command: Vec<String>,

    /// Working directory, also the base for relative report paths.
    pub root: PathBuf,
}

impl EslintConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            command: DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect(),
            root: root.into(),
        }
    }

    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }
}

/// Lint engine that shells out to ESLint.
///
/// Exit codes 0 and 1 carry a JSON report. Anything else, or a report that
/// cannot be read, is an engine error. Exit code 1 always fails the report,
/// which covers `--max-warnings` tripping on a report with no errors.
pub struct EslintEngine {
    config: EslintConfig,
}

impl EslintEngine {
    pub fn new(config: EslintConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl LintEngine for EslintEngine {
    async fn run(&self, paths: &[String]) -> Result<LintReport, EngineError> {
        let start = Instant::now();
        let Some((exe, args)) = self.config.command.split_first() else {
            return Err(EngineError::Internal("Lint command is empty".to_string()));
        };

        debug!(command = ?self.config.command, files = paths.len(), "Starting ESLint");
        let child = Command::new(exe)
            .args(args)
            .args(["--format", "json"])
            .args(paths)
            .current_dir(&self.config.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                command: self.config.command.join(" "),
                source,
            })?;
        let output = child.wait_with_output().await?;

        let duration_ms = start.elapsed().as_millis() as u64;
        let code = output.status.code();
        info!(?code, duration_ms, "ESLint finished");

        match code {
            Some(0) | Some(1) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let results =
                    parse_report(&stdout).map_err(|e| EngineError::InvalidReport(e.to_string()))?;
                let root = std::fs::canonicalize(&self.config.root)
                    .unwrap_or_else(|_| self.config.root.clone());
                let report = build_report(&results, &root);
                if code == Some(1) {
                    Ok(fail_on_exit_one(report))
                } else {
                    Ok(report)
                }
            }
            _ => Err(EngineError::Crashed {
                code,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}

/// ESLint exits 1 only for errors or an exceeded warning limit.
fn fail_on_exit_one(report: LintReport) -> LintReport {
    if report.conclusion == Conclusion::Failure {
        return report;
    }
    warn!("ESLint exited with code 1 on a report without errors, treating as failure");
    let mut output = report.output;
    output
        .summary
        .push_str("\n\nESLint exited with code 1: too many warnings.");
    LintReport::failure(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    /// A fake `eslint` that records its arguments, prints `stdout`, writes
    /// `stderr`, and exits with `code`.
    fn fake_eslint(stdout: &str, stderr: &str, code: i32) -> (TempDir, EslintConfig) {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("stdout.txt"), stdout).unwrap();
        std::fs::write(dir.path().join("stderr.txt"), stderr).unwrap();
        let script = format!(
            "echo \"$@\" > args.txt\ncat stdout.txt\ncat stderr.txt >&2\nexit {code}\n"
        );
        std::fs::write(dir.path().join("eslint.sh"), script).unwrap();
        let config = EslintConfig::new(dir.path())
            .with_command(vec!["sh".to_string(), "eslint.sh".to_string()]);
        (dir, config)
    }

    fn root(dir: &TempDir) -> PathBuf {
        std::fs::canonicalize(dir.path()).unwrap()
    }

    fn report_for(root: &Path, errors: u32) -> String {
        let messages = if errors > 0 {
            r#"[{ "ruleId": "no-var", "severity": 2, "message": "Unexpected var.", "line": 2 }]"#
        } else {
            "[]"
        };
        format!(
            r#"[{{ "filePath": "{}/a.ts", "messages": {messages}, "errorCount": {errors}, "warningCount": 0 }}]"#,
            root.display()
        )
    }

    #[tokio::test]
    async fn test_clean_run_is_success() {
        let (dir, config) = fake_eslint("", "", 0);
        std::fs::write(dir.path().join("stdout.txt"), report_for(&root(&dir), 0)).unwrap();

        let report = EslintEngine::new(config).run(&["a.ts".to_string()]).await.unwrap();

        assert_eq!(report.conclusion, Conclusion::Success);
        let args = std::fs::read_to_string(dir.path().join("args.txt")).unwrap();
        assert_eq!(args.trim(), "--format json a.ts");
    }

    #[tokio::test]
    async fn test_exit_one_is_failure_report() {
        let (dir, config) = fake_eslint("", "", 1);
        std::fs::write(dir.path().join("stdout.txt"), report_for(&root(&dir), 1)).unwrap();

        let report = EslintEngine::new(config).run(&["a.ts".to_string()]).await.unwrap();

        assert_eq!(report.conclusion, Conclusion::Failure);
        assert_eq!(report.output.annotations[0].path, "a.ts");
        assert_eq!(report.output.annotations[0].start_line, 2);
    }

    #[tokio::test]
    async fn test_exit_one_with_only_warnings_is_failure() {
        let (dir, config) = fake_eslint("", "", 1);
        let report = format!(
            r#"[{{ "filePath": "{}/a.ts", "messages": [
                 {{ "ruleId": "semi", "severity": 1, "message": "Missing semicolon.", "line": 4 }}
               ], "errorCount": 0, "warningCount": 1 }}]"#,
            root(&dir).display()
        );
        std::fs::write(dir.path().join("stdout.txt"), report).unwrap();

        let report = EslintEngine::new(config).run(&["a.ts".to_string()]).await.unwrap();

        assert_eq!(report.conclusion, Conclusion::Failure);
        assert_eq!(report.output.title, "0 error(s), 1 warning(s)");
        assert!(report.output.summary.ends_with("too many warnings."));
        assert_eq!(report.output.annotations.len(), 1);
    }

    #[tokio::test]
    async fn test_exit_zero_with_only_warnings_is_success() {
        let (dir, config) = fake_eslint("", "", 0);
        let report = format!(
            r#"[{{ "filePath": "{}/a.ts", "messages": [
                 {{ "ruleId": "semi", "severity": 1, "message": "Missing semicolon.", "line": 4 }}
               ], "errorCount": 0, "warningCount": 1 }}]"#,
            root(&dir).display()
        );
        std::fs::write(dir.path().join("stdout.txt"), report).unwrap();

        let report = EslintEngine::new(config).run(&["a.ts".to_string()]).await.unwrap();

        assert_eq!(report.conclusion, Conclusion::Success);
    }

    #[tokio::test]
    async fn test_exit_two_is_engine_error() {
        let (_dir, config) = fake_eslint("", "Oops! Something went wrong!", 2);

        let err = EslintEngine::new(config)
            .run(&["a.ts".to_string()])
            .await
            .unwrap_err();

        match err {
            EngineError::Crashed { code, stderr } => {
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "Oops! Something went wrong!");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreadable_stdout_is_engine_error() {
        let (_dir, config) = fake_eslint("not json", "", 0);

        let err = EslintEngine::new(config)
            .run(&["a.ts".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::InvalidReport(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let dir = tempdir().unwrap();
        let config = EslintConfig::new(dir.path())
            .with_command(vec!["lintgate-no-such-eslint-binary".to_string()]);

        let err = EslintEngine::new(config)
            .run(&["a.ts".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Spawn { .. }));
        assert!(err.to_string().contains("lintgate-no-such-eslint-binary"));
    }

    #[tokio::test]
    async fn test_empty_command_is_engine_error() {
        let dir = tempdir().unwrap();
        let config = EslintConfig::new(dir.path()).with_command(vec![]);

        let err = EslintEngine::new(config).run(&[]).await.unwrap_err();

        assert_eq!(err.to_string(), "Lint command is empty");
    }
}
