pub mod local;
pub mod messages;

use crate::errors::ProviderError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// One turn of the conversation sent to the classification service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A single classification call: a token budget, the message list and a temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// A trait for interacting with a text-classification service.
///
/// Implementations make exactly one synchronous round trip and return the primary
/// text content of the reply. Interpreting that text is left to the caller.
#[async_trait]
pub trait ClassificationProvider: Send + Sync + Debug + DynClone {
    async fn invoke(&self, request: &ClassificationRequest) -> Result<String, ProviderError>;
}

dyn_clone::clone_trait_object!(ClassificationProvider);
