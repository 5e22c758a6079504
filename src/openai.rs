//! Utilities for querying an OpenAI compatible API via the chat completions endpoint.
//!
//! For specific details on request/response schemas, see the [OpenAI API chat completions docs](https://platform.openai.com/docs/api-reference/chat/create).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::TesterError;
use crate::options::{Connection, RequestOptions};

/// Author of a `messages` item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A `chat/completions` `messages` item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A `chat/completions` request body
#[derive(Serialize)]
pub struct ChatRequest<'a> {
    #[serde(flatten)]
    pub options: &'a RequestOptions,
    pub messages: &'a [ChatMessage],
}

/// The message of a `chat/completions` response choice. `content` is `null`
/// for some refusals and tool calls.
#[derive(Deserialize)]
pub struct ResponseMessage {
    pub role: Role,
    pub content: Option<String>,
}

/// A `chat/completions` response choice
#[derive(Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

/// A `chat/completions` response
#[derive(Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

impl ChatResponse {
    /// The top choice's message.
    pub fn into_message(self) -> Result<ChatMessage, TesterError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or(TesterError::EmptyResponse)?;
        Ok(ChatMessage {
            role: choice.message.role,
            content: choice.message.content.unwrap_or_default(),
        })
    }
}

/// Something that can answer a conversation.
pub trait ChatClient {
    /// Send the whole ordered history and return the top reply.
    fn complete(
        &self,
        options: &RequestOptions,
        messages: &[ChatMessage],
    ) -> Result<ChatMessage, TesterError>;
}

/// Blocking client for the chat completions endpoint.
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(connection: &Connection) -> Result<Self, TesterError> {
        // Requests may take as long as the model needs.
        let http = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()?;
        Ok(OpenAiClient {
            http,
            url: completions_url(&connection.base_url),
            api_key: connection.api_key.clone(),
        })
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

impl ChatClient for OpenAiClient {
    fn complete(
        &self,
        options: &RequestOptions,
        messages: &[ChatMessage],
    ) -> Result<ChatMessage, TesterError> {
        let req_body = ChatRequest { options, messages };
        log::debug!(
            "POST {} (model {}, {} messages)",
            self.url,
            options.model,
            messages.len()
        );

        let body = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&req_body)
            .send()?
            .error_for_status()?
            .text()?;
        log::debug!("received {} bytes", body.len());

        let response: ChatResponse = serde_json::from_str(&body)?;
        response.into_message()
    }
}
