//! Workflow event context.
//!
//! A read-only snapshot of what triggered the run, read from the variables
//! the GitHub Actions runner exports and the event payload it writes to
//! `GITHUB_EVENT_PATH`.

use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::NotifyError;

const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Event name that switches the message to pull-request mode.
pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// Pull request details taken from a `pull_request` event payload.
///
/// The message links the pull request itself, so the head branch name is not kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub head_sha: String,
    pub html_url: String,
    pub title: String,
}

/// The triggering event.
///
/// `pull_request` is `Some` exactly when `event_name` is `pull_request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventContext {
    pub server_url: String,
    pub owner: String,
    pub repo: String,
    pub git_ref: String,
    pub sha: String,
    pub workflow: String,
    pub event_name: String,
    pub pull_request: Option<PullRequest>,
}

#[derive(Debug, Default, Deserialize)]
struct EventPayload {
    pull_request: Option<PayloadPullRequest>,
}

#[derive(Debug, Deserialize)]
struct PayloadPullRequest {
    head: PayloadHead,
    html_url: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct PayloadHead {
    sha: String,
}

impl From<PayloadPullRequest> for PullRequest {
    fn from(pr: PayloadPullRequest) -> Self {
        Self {
            head_sha: pr.head.sha,
            html_url: pr.html_url,
            title: pr.title,
        }
    }
}

fn read_payload(path: &Path) -> Result<EventPayload, NotifyError> {
    if !path.exists() {
        warn!(path = %path.display(), "event payload file does not exist");
        return Ok(EventPayload::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|e| {
        NotifyError::Context(format!("cannot read event payload {}: {e}", path.display()))
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        NotifyError::Context(format!("invalid event payload {}: {e}", path.display()))
    })
}

impl EventContext {
    /// Reads the context from the process environment.
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the context through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NotifyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let require =
            |name: &str| get(name).ok_or_else(|| NotifyError::Context(format!("{name} is not set")));

        let repository = require("GITHUB_REPOSITORY")?;
        let (owner, repo) = repository.split_once('/').ok_or_else(|| {
            NotifyError::Context(format!(
                "GITHUB_REPOSITORY must look like owner/repo, got {repository}"
            ))
        })?;

        let event_name = require("GITHUB_EVENT_NAME")?;

        let payload = match get("GITHUB_EVENT_PATH") {
            Some(path) => read_payload(Path::new(&path))?,
            None => EventPayload::default(),
        };

        let pull_request = if event_name == PULL_REQUEST_EVENT {
            let pr = payload.pull_request.ok_or_else(|| {
                NotifyError::Context("pull_request event payload has no pull_request".to_string())
            })?;
            Some(PullRequest::from(pr))
        } else {
            None
        };

        let context = Self {
            server_url: get("GITHUB_SERVER_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            owner: owner.to_string(),
            repo: repo.to_string(),
            git_ref: get("GITHUB_REF").unwrap_or_default(),
            sha: require("GITHUB_SHA")?,
            workflow: get("GITHUB_WORKFLOW").unwrap_or_default(),
            event_name,
            pull_request,
        };

        debug!(
            repository = %repository,
            event = %context.event_name,
            "loaded workflow context"
        );

        Ok(context)
    }

    /// `{server}/{owner}/{repo}`.
    pub fn repo_url(&self) -> String {
        format!("{}/{}/{}", self.server_url, self.owner, self.repo)
    }

    /// `{owner}/{repo}`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
