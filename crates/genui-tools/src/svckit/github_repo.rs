//! GitHub Repository Tool
//!
//! Fetches repository metadata from the GitHub REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use genui_core::{
    ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolOutput, ToolSchema,
};

use crate::credentials::CredentialSource;
use crate::error::{Result, ToolError};
use crate::model::RepoInfo;

pub const GITHUB_REPO: &str = "github-repo";

pub const REPO_FETCH_FAILED: &str =
    "There was an error fetching the repository. Please check the owner and repo names.";

/// GitHub endpoint settings
#[derive(Clone, Debug)]
pub struct GithubConfig {
    pub api_base: String,
    /// Name of the credential holding the bearer token
    pub token_var: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".into(),
            token_var: "GITHUB_TOKEN".into(),
        }
    }
}

#[derive(Deserialize)]
struct RepoResponse {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    stargazers_count: Option<u64>,
    #[serde(default)]
    language: Option<String>,
}

/// Tool for looking up a GitHub repository
pub struct GithubRepoTool {
    http: Client,
    config: GithubConfig,
    credentials: Arc<dyn CredentialSource>,
}

impl GithubRepoTool {
    pub fn new(config: GithubConfig, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            http: Client::new(),
            config,
            credentials,
        }
    }

    fn repo_url(&self, owner: &str, repo: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_base)
            .map_err(|e| ToolError::Url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| ToolError::Url(self.config.api_base.clone()))?
            .pop_if_empty()
            .extend(["repos", owner, repo]);
        Ok(url)
    }

    async fn fetch(&self, token: &str, owner: &str, repo: &str) -> Result<RepoInfo> {
        let response = self
            .http
            .get(self.repo_url(owner, repo)?)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", concat!("genui-tools/", env!("CARGO_PKG_VERSION")))
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;

        let data: RepoResponse = response.json().await?;

        Ok(RepoInfo {
            owner: owner.to_string(),
            repo: repo.to_string(),
            description: data.description.unwrap_or_default(),
            stars: data.stargazers_count.unwrap_or(0),
            language: data.language.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl Tool for GithubRepoTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: GITHUB_REPO.into(),
            description: "Get information about a GitHub repository.".into(),
            parameters: vec![
                ParameterSchema::required("owner", "string", "The name of the repository owner."),
                ParameterSchema::required("repo", "string", "The name of the repository."),
            ],
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolOutput> {
        let token = self.credentials.require(&self.config.token_var)?;

        let owner = call.str_arg("owner").unwrap_or_default();
        let repo = call.str_arg("repo").unwrap_or_default();

        match self.fetch(&token, owner, repo).await {
            Ok(info) => Ok(ToolOutput::Data(serde_json::to_value(info)?)),
            Err(e) => {
                tracing::warn!(owner, repo, error = %e, "GitHub lookup failed");
                Ok(ToolOutput::message(REPO_FETCH_FAILED))
            }
        }
    }
}
