//! Slack Notify - CI Status Notifications for Slack
//!
//! Posts a status attachment describing the current GitHub Actions run to a
//! Slack channel, or updates a message posted earlier in the workflow, and
//! exposes the message timestamp as the `messageId` step output.
//!
//! Inputs are read from the `INPUT_*` variables the runner sets for action
//! inputs, so the binary can be used as an action entrypoint as well as from
//! the command line.
//!
//! # Usage
//!
//! ```bash
//! # Post to a channel by name
//! slack-notify --token xoxb-... --channel '#deploys' --status success --color good
//!
//! # Post straight to a channel id, skipping the channel lookup
//! slack-notify --token xoxb-... --channel-id C0123456789 --status started
//!
//! # Update the message posted by an earlier step
//! slack-notify --token xoxb-... --channel-id C0123456789 \
//!     --message-id 1700000000.000100 --status success --color good
//! ```

mod attachment;
mod config;
mod context;
mod dispatch;
mod error;
#[cfg(test)]
mod fake;
mod resolver;
mod slack;

use anyhow::Context;
use clap::Parser;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::config::{DEFAULT_CHANNEL_TYPES, Inputs};
use crate::context::EventContext;
use crate::slack::{DEFAULT_API_URL, SlackClient};

/// Posts or updates a CI status message in Slack.
#[derive(Parser, Debug)]
#[command(name = "slack-notify")]
#[command(about = "Posts or updates a CI status notification in Slack")]
struct Args {
    /// Slack bot token.
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Channel name, optionally prefixed with '#' or '@'.
    #[arg(short, long, env = "INPUT_CHANNEL")]
    channel: Option<String>,

    /// Channel id. Takes precedence over --channel and skips the lookup.
    #[arg(long, env = "INPUT_CHANNELID")]
    channel_id: Option<String>,

    /// Plain-text fallback for the message.
    #[arg(short, long, env = "INPUT_TEXT")]
    text: Option<String>,

    /// Value of the Status field.
    #[arg(short, long, env = "INPUT_STATUS")]
    status: Option<String>,

    /// Attachment color ("good", "warning", "danger" or a hex code).
    #[arg(long, env = "INPUT_COLOR")]
    color: Option<String>,

    /// Timestamp of an existing message to update instead of posting.
    #[arg(short, long, env = "INPUT_MESSAGEID")]
    message_id: Option<String>,

    /// Channel types searched when resolving --channel.
    #[arg(long, env = "INPUT_TYPES", default_value = DEFAULT_CHANNEL_TYPES)]
    types: String,

    /// Slack Web API base URL.
    #[arg(long, env = "SLACK_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
}

impl Args {
    fn inputs(&self) -> Inputs {
        Inputs {
            token: self.token.clone(),
            channel: self.channel.clone(),
            channel_id: self.channel_id.clone(),
            text: self.text.clone(),
            status: self.status.clone(),
            color: self.color.clone(),
            message_id: self.message_id.clone(),
            types: Some(self.types.clone()),
        }
    }
}

/// Escapes a value for use as workflow command data.
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Formats the `::error::` workflow command for `message`.
fn error_command(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Appends `name=value` to the step output file.
fn append_output(path: &Path, name: &str, value: &str) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening output file {}", path.display()))?;

    writeln!(file, "{name}={value}")
        .with_context(|| format!("writing output {name} to {}", path.display()))?;

    Ok(())
}

/// Sets a step output, through `GITHUB_OUTPUT` when the runner provides it.
fn set_output(name: &str, value: &str) -> anyhow::Result<()> {
    match std::env::var_os("GITHUB_OUTPUT").filter(|p| !p.is_empty()) {
        Some(path) => append_output(Path::new(&path), name, value),
        None => {
            println!("::set-output name={name}::{}", escape_data(value));
            Ok(())
        }
    }
}

/// Reports a failed run to the workflow log.
fn set_failed(message: &str) {
    println!("{}", error_command(message));
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let result = dispatch::notify(args.inputs(), EventContext::from_env, |token| {
        SlackClient::new(token, &args.api_url)
    })
    .await;

    match result {
        Ok(ts) => match set_output("messageId", &ts) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e:#}");
                set_failed(&format!("{e:#}"));
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!(configuration = e.is_configuration(), "{e}");
            set_failed(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_newlines_and_percent() {
        assert_eq!(escape_data("50%\r\ndone"), "50%25%0D%0Adone");
        assert_eq!(
            error_command("Slack channel #deploys could not be found."),
            "::error::Slack channel #deploys could not be found."
        );
    }

    #[test]
    fn output_lines_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        std::fs::write(&path, "previous=1\n").unwrap();

        append_output(&path, "messageId", "1700000000.000100").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "previous=1\nmessageId=1700000000.000100\n");
    }
}
