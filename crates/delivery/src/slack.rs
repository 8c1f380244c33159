//! Slack Web API implementation of [`Conversation`].
//!
//! Posts through `chat.postMessage` with a bot token. Slack reports most
//! failures as HTTP 200 with `{"ok": false, "error": "..."}`, so the body is
//! checked as well as the status.

use std::time::Duration;

use assist_core::config::SlackConfig;
use serde::Deserialize;

use crate::conversation::{Conversation, ConversationError, DeliveryAck, OutboundMessage};

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SlackConversation {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
}

impl SlackConversation {
    /// Build a client from config. Fails when no bot token is configured.
    pub fn new(config: &SlackConfig, timeout: Duration) -> Result<Self, ConversationError> {
        let bot_token = config
            .bot_token
            .clone()
            .ok_or(ConversationError::MissingToken)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bot_token,
        })
    }

    fn post_message_url(&self) -> String {
        format!("{}/chat.postMessage", self.api_url)
    }
}

impl Conversation for SlackConversation {
    async fn send(&self, message: &OutboundMessage) -> Result<DeliveryAck, ConversationError> {
        let response = self
            .client
            .post(self.post_message_url())
            .bearer_auth(&self.bot_token)
            .json(message)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConversationError::HttpStatus(response.status().as_u16()));
        }

        let body: PostMessageResponse = response.json().await?;
        if !body.ok {
            return Err(ConversationError::Rejected(
                body.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        Ok(DeliveryAck { ts: body.ts })
    }
}
