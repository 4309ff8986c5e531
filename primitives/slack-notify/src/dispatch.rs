//! Validates inputs, picks the channel and sends the notification.

use tracing::{debug, info};

use crate::attachment::{Attachment, build_attachment, unix_now};
use crate::config::{ChannelTarget, Config, Inputs};
use crate::context::EventContext;
use crate::error::NotifyError;
use crate::resolver::resolve_channel_id;
use crate::slack::{MessageUpdate, NewMessage, SendRequest, SlackApi};

/// Runs one notification end to end and returns the message `ts`.
///
/// Inputs are validated first. `load_context` and `connect` (which builds the
/// API client from the token) are only called after that, so a configuration
/// error never reads the event context, creates a client or makes a request.
pub async fn notify<A, C, F>(
    inputs: Inputs,
    load_context: C,
    connect: F,
) -> Result<String, NotifyError>
where
    A: SlackApi,
    C: FnOnce() -> Result<EventContext, NotifyError>,
    F: FnOnce(&str) -> Result<A, NotifyError>,
{
    let config = inputs.validate()?;
    let context = load_context()?;
    let api = connect(&config.token)?;
    dispatch(&api, &config, &context, unix_now()).await
}

/// Sends the notification described by `config`, stamping the attachment with `ts`.
pub async fn dispatch<A>(
    api: &A,
    config: &Config,
    context: &EventContext,
    ts: u64,
) -> Result<String, NotifyError>
where
    A: SlackApi + ?Sized,
{
    let attachment = build_attachment(
        context,
        config.status.as_deref(),
        config.color.as_deref(),
        ts,
    );

    let channel = match &config.target {
        ChannelTarget::Id(id) => id.clone(),
        ChannelTarget::Name(name) => resolve_channel_id(api, name, &config.types)
            .await?
            .ok_or_else(|| NotifyError::ChannelNotFound(name.clone()))?,
    };

    let request = build_request(config, channel, vec![attachment]);
    send(api, &request).await
}

/// Update when an existing message id was given, create otherwise.
pub fn build_request(
    config: &Config,
    channel: String,
    attachments: Vec<Attachment>,
) -> SendRequest {
    match &config.message_id {
        Some(ts) => SendRequest::Update(MessageUpdate {
            channel,
            ts: ts.clone(),
            text: config.text.clone(),
            attachments,
        }),
        None => SendRequest::Create(NewMessage {
            channel,
            text: config.text.clone(),
            attachments,
        }),
    }
}

/// Performs the chat call for `request`.
pub async fn send<A>(api: &A, request: &SendRequest) -> Result<String, NotifyError>
where
    A: SlackApi + ?Sized,
{
    let ts = match request {
        SendRequest::Create(message) => {
            debug!(channel = %message.channel, "posting new message");
            api.post_message(message).await?
        }
        SendRequest::Update(update) => {
            debug!(channel = %update.channel, ts = %update.ts, "updating message");
            api.update_message(update).await?
        }
    };

    info!(%ts, "notification sent");
    Ok(ts)
}
