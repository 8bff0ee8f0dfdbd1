//! Pull request metadata over GraphQL.
//!
//! Changed files are fetched 100 at a time, following `pageInfo.endCursor`
//! until the listing ends or [`MAX_CHANGED_FILES`] is reached.

use async_trait::async_trait;
use lintgate_core::{ChangedFile, HeadCommit, PullRequestInfo, PullRequestSource, SourceError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::client::GithubClient;
use crate::error::GithubError;
use crate::Result;

/// Files requested per page.
pub const FILES_PAGE_SIZE: usize = 100;

/// GitHub stops listing pull request files after this many.
pub const MAX_CHANGED_FILES: usize = 3000;

const PULL_REQUEST_QUERY: &str = r#"
query($owner: String!, $name: String!, $prNumber: Int!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $name) {
    pullRequest(number: $prNumber) {
      files(first: $first, after: $after) {
        nodes {
          path
        }
        pageInfo {
          hasNextPage
          endCursor
        }
      }
      commits(last: 1) {
        nodes {
          commit {
            oid
          }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    repository: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    pull_request: Option<PullRequestNode>,
}

#[derive(Debug, Deserialize)]
struct PullRequestNode {
    files: Option<FileConnection>,
    commits: CommitConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileConnection {
    #[serde(default)]
    nodes: Vec<FileNode>,
    page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
struct FileNode {
    path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitConnection {
    #[serde(default)]
    nodes: Vec<CommitNode>,
}

#[derive(Debug, Deserialize)]
struct CommitNode {
    commit: Commit,
}

#[derive(Debug, Deserialize)]
struct Commit {
    oid: String,
}

impl GithubClient {
    async fn pull_request_page(
        &self,
        number: u64,
        after: Option<&str>,
    ) -> Result<Option<PullRequestNode>> {
        let request = GraphQlRequest {
            query: PULL_REQUEST_QUERY,
            variables: json!({
                "owner": self.repository.owner,
                "name": self.repository.name,
                "prNumber": number,
                "first": FILES_PAGE_SIZE,
                "after": after,
            }),
        };
        let response: GraphQlResponse = self.post(&self.config.graphql_url, &request).await?;

        let not_found_only = response
            .errors
            .iter()
            .all(|e| e.kind.as_deref() == Some("NOT_FOUND"));
        if !response.errors.is_empty() && !not_found_only {
            let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(GithubError::GraphQl(messages.join("; ")));
        }

        Ok(response
            .data
            .and_then(|d| d.repository)
            .and_then(|r| r.pull_request))
    }

    /// Fetch every changed file and the head commit of pull request `number`.
    pub async fn fetch_pull_request(&self, number: u64) -> Result<Option<PullRequestInfo>> {
        let mut files = Vec::new();
        let mut cursor: Option<String> = None;
        let mut head = None;

        loop {
            let Some(page) = self.pull_request_page(number, cursor.as_deref()).await? else {
                return Ok(None);
            };
            if head.is_none() {
                head = page.commits.nodes.into_iter().last().map(|n| n.commit.oid);
            }
            let Some(connection) = page.files else {
                break;
            };
            files.extend(connection.nodes.into_iter().map(|n| ChangedFile::new(n.path)));
            debug!(pr_number = number, fetched = files.len(), "Fetched changed files page");

            match connection.page_info {
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(next),
                } => {
                    if files.len() >= MAX_CHANGED_FILES {
                        warn!(
                            pr_number = number,
                            limit = MAX_CHANGED_FILES,
                            "Pull request lists more files than GitHub returns; remaining files are not linted"
                        );
                        break;
                    }
                    cursor = Some(next);
                }
                _ => break,
            }
        }

        Ok(head.map(|oid| PullRequestInfo {
            files,
            head: HeadCommit(oid),
        }))
    }
}

#[async_trait]
impl PullRequestSource for GithubClient {
    async fn pull_request(
        &self,
        number: u64,
    ) -> std::result::Result<Option<PullRequestInfo>, SourceError> {
        Ok(self.fetch_pull_request(number).await?)
    }
}
