//! GitHub API client
//!
//! One client is bound to one repository and serves both the pull request
//! query (GraphQL) and the check-run operations (REST).

use lintgate_core::Repository;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GithubError;
use crate::Result;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// GitHub connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Token sent as a bearer credential
    pub token: String,
    /// REST API base URL
    pub api_url: String,
    /// GraphQL endpoint URL
    pub graphql_url: String,
}

impl GithubConfig {
    /// Config for github.com
    pub fn new(token: &str) -> Self {
        GithubConfig {
            token: token.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
        }
    }

    /// Point at another API host (GitHub Enterprise, test servers)
    pub fn with_urls(mut self, api_url: &str, graphql_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self.graphql_url = graphql_url.to_string();
        self
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("graphql_url", &self.graphql_url)
            .finish()
    }
}

/// GitHub client for pull request and check-run operations
pub struct GithubClient {
    pub(crate) config: GithubConfig,
    pub(crate) repository: Repository,
    http_client: reqwest::Client,
}

impl GithubClient {
    /// Create a client bound to `repository`
    pub fn new(config: GithubConfig, repository: Repository) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| GithubError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("lintgate/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(GithubClient {
            config,
            repository,
            http_client,
        })
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// `{api_url}/repos/{owner}/{name}/{path}`
    pub(crate) fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.config.api_url, self.repository.owner, self.repository.name, path
        )
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(url, "GET");
        let response = self.http_client.get(url).query(query).send().await?;
        decode(response).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        debug!(url, "POST");
        let response = self.http_client.post(url).json(body).send().await?;
        decode(response).await
    }

    pub(crate) async fn patch<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<()> {
        debug!(url, "PATCH");
        let response = self.http_client.patch(url).json(body).send().await?;
        decode::<serde_json::Value>(response).await.map(|_| ())
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(GithubError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(serde_json::from_str(&body)?)
}
