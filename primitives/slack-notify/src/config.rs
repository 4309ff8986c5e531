//! Action inputs and their validation.
//!
//! GitHub Actions hands unset inputs to the process as empty strings, so
//! every input is trimmed and empty values are treated as absent before
//! anything else looks at them.

use crate::error::NotifyError;

/// Channel types searched when resolving a channel by name.
pub const DEFAULT_CHANNEL_TYPES: &str = "public_channel,private_channel";

/// Raw inputs as collected from the command line and environment.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub token: Option<String>,
    pub channel: Option<String>,
    pub channel_id: Option<String>,
    pub text: Option<String>,
    pub status: Option<String>,
    pub color: Option<String>,
    pub message_id: Option<String>,
    pub types: Option<String>,
}

/// Where the message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelTarget {
    /// A Slack channel id, used as-is.
    Id(String),
    /// A channel name as given, sigil included, resolved via `conversations.list`.
    Name(String),
}

/// Validated configuration for a single run.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub target: ChannelTarget,
    pub text: Option<String>,
    pub status: Option<String>,
    pub color: Option<String>,
    pub message_id: Option<String>,
    pub types: String,
}

/// Removes a single leading `#` or `@` from a channel name.
pub fn strip_sigil(name: &str) -> &str {
    name.strip_prefix(['#', '@']).unwrap_or(name)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Inputs {
    /// Checks the token first, then the channel. Never touches the network.
    pub fn validate(self) -> Result<Config, NotifyError> {
        let token = non_empty(self.token).ok_or(NotifyError::MissingToken)?;

        let target = match (non_empty(self.channel_id), non_empty(self.channel)) {
            (Some(id), _) => ChannelTarget::Id(id),
            (None, Some(name)) => {
                if strip_sigil(&name).is_empty() {
                    return Err(NotifyError::MissingChannel);
                }
                ChannelTarget::Name(name)
            }
            (None, None) => return Err(NotifyError::MissingChannel),
        };

        Ok(Config {
            token,
            target,
            text: non_empty(self.text),
            status: non_empty(self.status),
            color: non_empty(self.color),
            message_id: non_empty(self.message_id),
            types: non_empty(self.types).unwrap_or_else(|| DEFAULT_CHANNEL_TYPES.to_string()),
        })
    }
}
