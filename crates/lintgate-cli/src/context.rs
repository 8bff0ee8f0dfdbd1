//! GitHub Actions run context.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<NumberedItem>,
    issue: Option<NumberedItem>,
    number: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct NumberedItem {
    number: u64,
}

/// Pull request number of the triggering event, if it has one.
pub fn pr_number_from_event(event_path: &Path) -> Result<Option<u64>> {
    let raw = std::fs::read_to_string(event_path)
        .with_context(|| format!("Failed to read event payload {:?}", event_path))?;
    let event: EventPayload =
        serde_json::from_str(&raw).context("Failed to parse event payload as JSON")?;
    Ok(event
        .pull_request
        .or(event.issue)
        .map(|item| item.number)
        .or(event.number))
}

/// Escape a message for a `::error::` workflow command.
pub fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
