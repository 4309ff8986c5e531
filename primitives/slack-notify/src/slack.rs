//! Slack Web API access.
//!
//! [`SlackApi`] is the seam the rest of the crate talks to: one paginated
//! listing call and the two chat calls. [`SlackClient`] implements it over
//! HTTPS with `reqwest`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::attachment::Attachment;
use crate::error::NotifyError;

/// Default Web API base URL.
pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Channels requested per `conversations.list` page.
const PAGE_LIMIT: u32 = 200;

/// A channel as returned by `conversations.list`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// One page of `conversations.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelPage {
    pub channels: Vec<Channel>,
    /// Cursor for the following page; `None` on the last page.
    pub next_cursor: Option<String>,
}

/// Body of `chat.postMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMessage {
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// Body of `chat.update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageUpdate {
    pub channel: String,
    pub ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// The one chat call a run makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendRequest {
    Create(NewMessage),
    Update(MessageUpdate),
}

/// The Slack operations a notification run needs.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// Fetches one page of `conversations.list`, starting at `cursor`.
    async fn list_conversations(
        &self,
        types: &str,
        cursor: Option<&str>,
    ) -> Result<ChannelPage, NotifyError>;

    /// Posts a new message and returns its `ts`.
    async fn post_message(&self, message: &NewMessage) -> Result<String, NotifyError>;

    /// Replaces an existing message and returns its `ts`.
    async fn update_message(&self, update: &MessageUpdate) -> Result<String, NotifyError>;
}

#[async_trait]
impl<T> SlackApi for &T
where
    T: SlackApi + ?Sized,
{
    async fn list_conversations(
        &self,
        types: &str,
        cursor: Option<&str>,
    ) -> Result<ChannelPage, NotifyError> {
        (**self).list_conversations(types, cursor).await
    }

    async fn post_message(&self, message: &NewMessage) -> Result<String, NotifyError> {
        (**self).post_message(message).await
    }

    async fn update_message(&self, update: &MessageUpdate) -> Result<String, NotifyError> {
        (**self).update_message(update).await
    }
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channels: Vec<Channel>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

fn api_error(method: &'static str, error: Option<String>) -> NotifyError {
    NotifyError::Api {
        method,
        error: error.unwrap_or_else(|| "unknown_error".to_string()),
    }
}

impl ListResponse {
    fn into_page(self) -> Result<ChannelPage, NotifyError> {
        if !self.ok {
            return Err(api_error("conversations.list", self.error));
        }

        let next_cursor = self
            .response_metadata
            .and_then(|m| m.next_cursor)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(ChannelPage {
            channels: self.channels,
            next_cursor,
        })
    }
}

impl ChatResponse {
    fn into_ts(self, method: &'static str) -> Result<String, NotifyError> {
        if !self.ok {
            return Err(api_error(method, self.error));
        }
        self.ts
            .ok_or_else(|| api_error(method, Some("response has no ts".to_string())))
    }
}

/// HTTPS client for the Slack Web API.
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: Client,
    base_url: String,
    token: String,
}

impl SlackClient {
    pub fn new(token: &str, base_url: &str) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .user_agent(concat!("slack-notify/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    async fn post_chat<B: Serialize + Sync>(
        &self,
        method: &'static str,
        body: &B,
    ) -> Result<String, NotifyError> {
        let response = self
            .http
            .post(self.url(method))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        decode::<ChatResponse>(response).await?.into_ts(method)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, NotifyError> {
    Ok(response.error_for_status()?.json().await?)
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn list_conversations(
        &self,
        types: &str,
        cursor: Option<&str>,
    ) -> Result<ChannelPage, NotifyError> {
        debug!(?cursor, "fetching conversations.list page");

        let mut query = vec![("types", types.to_string()), ("limit", PAGE_LIMIT.to_string())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let response = self
            .http
            .get(self.url("conversations.list"))
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await?;

        decode::<ListResponse>(response).await?.into_page()
    }

    async fn post_message(&self, message: &NewMessage) -> Result<String, NotifyError> {
        self.post_chat("chat.postMessage", message).await
    }

    async fn update_message(&self, update: &MessageUpdate) -> Result<String, NotifyError> {
        self.post_chat("chat.update", update).await
    }
}
