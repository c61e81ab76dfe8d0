use crate::{
    errors::ProviderError,
    providers::ai::{ChatMessage, ClassificationProvider, ClassificationRequest},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The version tag sent when none is configured.
pub const DEFAULT_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

// --- Messages API request and response structures ---

#[derive(Serialize)]
struct MessagesRequest<'a> {
    anthropic_version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    max_tokens: u32,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize, Debug)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

// --- Messages Provider implementation ---

/// A provider for Anthropic-style messages endpoints.
#[derive(Clone, Debug)]
pub struct MessagesProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: Option<String>,
    anthropic_version: String,
}

impl MessagesProvider {
    /// Creates a new `MessagesProvider`.
    pub fn new(
        api_url: String,
        api_key: Option<String>,
        model: Option<String>,
        anthropic_version: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(ProviderError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            anthropic_version: anthropic_version
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_VERSION.to_string()),
        })
    }
}

#[async_trait]
impl ClassificationProvider for MessagesProvider {
    async fn invoke(&self, request: &ClassificationRequest) -> Result<String, ProviderError> {
        let request_body = MessagesRequest {
            anthropic_version: &self.anthropic_version,
            model: self.model.as_deref(),
            max_tokens: request.max_tokens,
            messages: &request.messages,
            temperature: request.temperature,
        };

        let mut request_builder = self.client.post(&self.api_url);
        if let Some(key) = &self.api_key {
            request_builder = request_builder.header("x-api-key", key);
        }

        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(ProviderError::AiRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::AiApi(error_text));
        }

        let messages_response: MessagesResponse = response
            .json()
            .await
            .map_err(ProviderError::AiDeserialization)?;

        messages_response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or(ProviderError::EmptyReply)
    }
}
