//! In-memory [`SlackApi`] that records every call.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::NotifyError;
use crate::slack::{Channel, ChannelPage, MessageUpdate, NewMessage, SendRequest, SlackApi};

pub const RETURNED_TS: &str = "1700000000.000100";

pub fn channel(id: &str, name: &str) -> Channel {
    Channel {
        id: id.to_string(),
        name: name.to_string(),
    }
}

#[derive(Default)]
pub struct FakeSlack {
    pages: Vec<Vec<Channel>>,
    list_error: Option<String>,
    list_calls: Mutex<Vec<(String, Option<String>)>>,
    sent: Mutex<Vec<SendRequest>>,
}

impl FakeSlack {
    /// Page `n` is served for cursor `page-n`; the first page needs no cursor.
    pub fn with_pages(pages: Vec<Vec<Channel>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn failing_list(error: &str) -> Self {
        Self {
            list_error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn list_calls(&self) -> Vec<Option<String>> {
        self.list_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, cursor)| cursor.clone())
            .collect()
    }

    pub fn list_types(&self) -> Vec<String> {
        self.list_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(types, _)| types.clone())
            .collect()
    }

    pub fn sent(&self) -> Vec<SendRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SlackApi for FakeSlack {
    async fn list_conversations(
        &self,
        types: &str,
        cursor: Option<&str>,
    ) -> Result<ChannelPage, NotifyError> {
        self.list_calls
            .lock()
            .unwrap()
            .push((types.to_string(), cursor.map(str::to_string)));

        if let Some(error) = &self.list_error {
            return Err(NotifyError::Api {
                method: "conversations.list",
                error: error.clone(),
            });
        }

        let index = cursor
            .and_then(|c| c.strip_prefix("page-"))
            .map(|n| n.parse::<usize>().unwrap())
            .unwrap_or(0);
        let next_cursor = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));

        Ok(ChannelPage {
            channels: self.pages.get(index).cloned().unwrap_or_default(),
            next_cursor,
        })
    }

    async fn post_message(&self, message: &NewMessage) -> Result<String, NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push(SendRequest::Create(message.clone()));
        Ok(RETURNED_TS.to_string())
    }

    async fn update_message(&self, update: &MessageUpdate) -> Result<String, NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push(SendRequest::Update(update.clone()));
        Ok(update.ts.clone())
    }
}
