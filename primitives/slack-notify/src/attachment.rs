//! Builds the Slack attachment describing the workflow run.

use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::context::EventContext;

const FOOTER_ICON: &str = "https://github.githubassets.com/favicon.ico";

/// A labeled value inside an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl Field {
    fn short(title: &str, value: String) -> Self {
        Self {
            title: title.to_string(),
            value,
            short: true,
        }
    }
}

/// A legacy Slack message attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub fields: Vec<Field>,
    pub footer_icon: String,
    pub footer: String,
    pub ts: u64,
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Composes the notification attachment. Pure apart from `ts`, which the caller supplies.
///
/// Fields are always Action, Status, Branch or Pull Request, Event, in that order.
pub fn build_attachment(
    context: &EventContext,
    status: Option<&str>,
    color: Option<&str>,
    ts: u64,
) -> Attachment {
    let repo_url = context.repo_url();
    let full_name = context.full_name();

    let (sha, reference) = match &context.pull_request {
        Some(pr) => (
            pr.head_sha.as_str(),
            Field::short("Pull Request", format!("<{} | {}>", pr.html_url, pr.title)),
        ),
        None => {
            let branch = context
                .git_ref
                .strip_prefix("refs/heads/")
                .unwrap_or(&context.git_ref);
            (
                context.sha.as_str(),
                Field::short(
                    "Branch",
                    format!(
                        "<{repo_url}/commit/{} | {full_name}#{branch}>",
                        context.sha
                    ),
                ),
            )
        }
    };

    Attachment {
        color: color.map(str::to_string),
        fields: vec![
            Field::short(
                "Action",
                format!("<{repo_url}/commit/{sha}/checks | {}>", context.workflow),
            ),
            Field::short("Status", status.unwrap_or_default().to_string()),
            reference,
            Field::short("Event", context.event_name.clone()),
        ],
        footer_icon: FOOTER_ICON.to_string(),
        footer: format!("<{repo_url} | {full_name}>"),
        ts,
    }
}
