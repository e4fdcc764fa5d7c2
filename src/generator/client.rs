//! Inference endpoint client
//!
//! Blocking client for an OpenAI-compatible chat completions endpoint
//! (the Hugging Face router by default).

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::error::{GenerationError, Result};
use super::models::GenerationParams;

pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co";

/// A model that turns one prompt into one completion.
///
/// This is the seam between generation logic and the network.
pub trait ChatModel: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat client bound to one model and parameter set
#[derive(Debug, Clone)]
pub struct HfChatClient {
    client: Client,
    endpoint: Url,
    token: String,
    params: GenerationParams,
}

impl HfChatClient {
    pub fn new(
        base_url: &str,
        token: &str,
        params: GenerationParams,
        timeout_secs: u64,
    ) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(GenerationError::MissingToken);
        }

        let endpoint = Url::parse(base_url)?.join("/v1/chat/completions")?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            token: token.to_string(),
            params,
        })
    }
}

impl ChatModel for HfChatClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.params.repo_id,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
            stream: false,
        };

        debug!(endpoint = %self.endpoint, model = %self.params.repo_id, "sending chat completion");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(GenerationError::from_status(status.as_u16(), body));
        }

        parse_completion(&body)
    }
}

/// Pull the first choice's text out of a chat completion body
fn parse_completion(body: &str) -> Result<String> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GenerationError::Malformed("response has no choices".to_string()))
}
