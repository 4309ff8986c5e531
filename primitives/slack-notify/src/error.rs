//! Error types for slack-notify.

use thiserror::Error;

/// Every way a notification run can fail. All variants are terminal.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("You must provide a Slack bot token.")]
    MissingToken,

    #[error("You must provide either a 'channel' or a 'channelId'.")]
    MissingChannel,

    #[error("Slack channel {0} could not be found.")]
    ChannelNotFound(String),

    #[error("Slack API call {method} failed: {error}")]
    Api { method: &'static str, error: String },

    #[error("HTTP request to Slack failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to read workflow context: {0}")]
    Context(String),
}

impl NotifyError {
    /// True for errors detected before any network call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingToken | Self::MissingChannel)
    }
}
