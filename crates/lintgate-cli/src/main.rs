//! lintgate - Pull Request Lint Gate
//!
//! Lints the files a pull request changes and reports the result as one
//! check run on the pull request's head commit.
//!
//! Every flag falls back to the environment GitHub Actions provides, so the
//! binary runs with no arguments inside a workflow.

mod context;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use lintgate_core::telemetry::init_tracing;
use lintgate_core::{GateConfig, GateOutcome, LintGate, Repository, DEFAULT_IGNORE_FILE};
use lintgate_engine::{EslintConfig, EslintEngine};
use lintgate_github::{GithubClient, GithubConfig, DEFAULT_API_URL, DEFAULT_GRAPHQL_URL};
use tracing::{error, info, Level};

use crate::context::{escape_workflow_data, pr_number_from_event};

#[derive(Parser, Debug)]
#[command(name = "lintgate")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lint the files a pull request changes and report a check run", long_about = None)]
struct Cli {
    /// GitHub token (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_REPO-TOKEN", hide_env_values = true)]
    repo_token: Option<String>,

    /// Name of an in-progress check run to reuse instead of creating one
    #[arg(long, env = "INPUT_CHECK-NAME")]
    check_name: Option<String>,

    /// Repository as owner/name
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: String,

    /// Pull request number (read from the event payload when omitted)
    #[arg(long)]
    pr_number: Option<u64>,

    /// Event payload of the triggering workflow run
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// GraphQL endpoint
    #[arg(long, env = "GITHUB_GRAPHQL_URL", default_value = DEFAULT_GRAPHQL_URL)]
    graphql_url: String,

    /// Extensions to lint (comma-separated, e.g. .js,.ts)
    #[arg(long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Ignore file, relative to the repository root
    #[arg(long, default_value = DEFAULT_IGNORE_FILE)]
    ignore_file: PathBuf,

    /// Repository checkout root
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    root: PathBuf,

    /// ESLint command prefix (whitespace-separated)
    #[arg(long)]
    eslint: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn token(&self) -> Result<String> {
        self.repo_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()))
            .ok_or_else(|| anyhow!("Input required and not supplied: repo-token"))
    }

    fn pr_number(&self) -> Result<u64> {
        if let Some(number) = self.pr_number {
            return Ok(number);
        }
        let event_path = self
            .event_path
            .as_deref()
            .ok_or_else(|| anyhow!("No --pr-number given and GITHUB_EVENT_PATH is not set"))?;
        pr_number_from_event(event_path)?
            .ok_or_else(|| anyhow!("The triggering event is not a pull request"))
    }

    fn gate_config(&self) -> Result<GateConfig> {
        let mut config = GateConfig::new(self.pr_number()?)
            .with_check_name(self.check_name.clone())
            .with_ignore_file(&self.ignore_file)
            .with_root(&self.root);
        if let Some(extensions) = &self.extensions {
            config = config.with_extensions(extensions);
        }
        Ok(config)
    }

    fn eslint_config(&self) -> EslintConfig {
        let config = EslintConfig::new(&self.root);
        match &self.eslint {
            Some(command) => {
                config.with_command(command.split_whitespace().map(str::to_string).collect())
            }
            None => config,
        }
    }
}

async fn run(cli: &Cli) -> Result<GateOutcome> {
    let repository: Repository = cli.repository.parse()?;
    let config = cli.gate_config()?;

    let github = Arc::new(
        GithubClient::new(
            GithubConfig::new(&cli.token()?).with_urls(&cli.api_url, &cli.graphql_url),
            repository.clone(),
        )
        .context("Failed to create GitHub client")?,
    );
    let engine = Arc::new(EslintEngine::new(cli.eslint_config()));

    info!(repository = %repository, pr_number = config.pr_number, "Starting lint gate");
    let gate = LintGate::new(github.clone(), github, engine);
    let outcome = gate
        .run(&config)
        .await
        .with_context(|| format!("Lint gate failed for {}#{}", repository, config.pr_number))?;
    Ok(outcome)
}

/// Whether the step passes, and the `::error::` workflow command when it does not.
fn finish(result: &Result<GateOutcome>) -> (bool, Option<String>) {
    let message = match result {
        Ok(outcome) => match outcome.failure_message() {
            Some(message) => message.to_string(),
            None => {
                info!(outcome = ?outcome, "Lint gate finished");
                return (true, None);
            }
        },
        Err(err) => format!("{err:#}"),
    };
    error!("{}", message);
    (
        false,
        Some(format!("::error::{}", escape_workflow_data(&message))),
    )
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let (passed, command) = finish(&run(&cli).await);
    if let Some(command) = command {
        println!("{command}");
    }
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use lintgate_core::{CheckRunId, LINT_FAILURE_MESSAGE};

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["lintgate", "--repository", "octo/app"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_gate_config_from_flags() {
        let cli = parse(&[
            "--pr-number",
            "12",
            "--check-name",
            "lint",
            "--extensions",
            ".ts,.vue",
            "--root",
            "/work",
        ]);

        let config = cli.gate_config().unwrap();

        assert_eq!(config.pr_number, 12);
        assert_eq!(config.check_name.as_deref(), Some("lint"));
        assert!(config.extensions.contains(".vue"));
        assert!(!config.extensions.contains(".js"));
        assert_eq!(config.ignore_file_path(), PathBuf::from("/work/.eslintignore"));
    }

    #[test]
    fn test_pr_number_from_event_path() {
        let dir = tempfile::tempdir().unwrap();
        let event = dir.path().join("event.json");
        std::fs::write(&event, r#"{ "pull_request": { "number": 5 } }"#).unwrap();

        let cli = parse(&["--event-path", event.to_str().unwrap()]);

        assert_eq!(cli.pr_number().unwrap(), 5);
    }

    #[test]
    fn test_explicit_token_wins() {
        let cli = parse(&["--pr-number", "1", "--repo-token", "abc"]);
        assert_eq!(cli.token().unwrap(), "abc");
    }

    #[test]
    fn test_eslint_command_split() {
        let cli = parse(&["--pr-number", "1", "--eslint", "node_modules/.bin/eslint --max-warnings 0"]);
        assert_eq!(
            cli.eslint_config().command,
            vec!["node_modules/.bin/eslint", "--max-warnings", "0"]
        );
    }

    #[test]
    fn test_finish_passes_on_no_op_outcomes() {
        for outcome in [
            GateOutcome::NoPullRequest,
            GateOutcome::NothingToLint,
            GateOutcome::Passed {
                check_run_id: CheckRunId(3),
            },
        ] {
            let (passed, command) = finish(&Ok(outcome));
            assert!(passed);
            assert_eq!(command, None);
        }
    }

    #[test]
    fn test_finish_fails_on_lint_violations() {
        let (passed, command) = finish(&Ok(GateOutcome::Failed {
            check_run_id: CheckRunId(3),
            message: LINT_FAILURE_MESSAGE.to_string(),
        }));

        assert!(!passed);
        assert_eq!(command.as_deref(), Some("::error::ESLint found some errors"));
    }

    #[test]
    fn test_finish_reports_engine_message() {
        let (passed, command) = finish(&Ok(GateOutcome::Failed {
            check_run_id: CheckRunId(4),
            message: "Lint engine exited with code 2: Oops!\nstack".to_string(),
        }));

        assert!(!passed);
        assert_eq!(
            command.as_deref(),
            Some("::error::Lint engine exited with code 2: Oops!%0Astack")
        );
    }

    #[test]
    fn test_finish_fails_on_error() {
        let err = anyhow!("connection reset").context("Lint gate failed for octo/app#7");

        let (passed, command) = finish(&Err(err));

        assert!(!passed);
        assert_eq!(
            command.as_deref(),
            Some("::error::Lint gate failed for octo/app#7: connection reset")
        );
    }
}
