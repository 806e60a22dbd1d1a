//! Article generation via an OpenAI-compatible chat-completions API.
//!
//! The request is fixed apart from the topic: one system prompt casting the
//! model as a blog writer, one user prompt asking for an HTML article about
//! the chosen topic, and pinned decoding parameters (bounded output length,
//! fixed temperature and penalties). The endpoint base is configurable so
//! the generator also works against self-hosted OpenAI-compatible gateways.
//!
//! One attempt per invocation. A transport failure, a non-success status,
//! or an empty `choices` array aborts the pipeline.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument};
use url::Url;

use crate::errors::PipelineError;
use crate::models::{Article, Topic};
use crate::utils::truncate_for_log;

const MODEL: &str = "gpt-4o-mini";
const SYSTEM_PROMPT: &str = "You are a world class technology blog writer.";
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.7;
const PRESENCE_PENALTY: f32 = 0.0;
const FREQUENCY_PENALTY: f32 = 0.3;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Client for the generative-text service.
pub struct ArticleGenerator {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl ArticleGenerator {
    pub fn new(
        client: reqwest::Client,
        api_base: &str,
        api_key: String,
    ) -> Result<Self, PipelineError> {
        let endpoint = Url::parse(api_base)
            .and_then(|base| base.join("v1/chat/completions"))
            .map_err(|e| PipelineError::ConfigFetch {
                name: "generation_api_base".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Generate an HTML article for `topic`, returning the first
    /// completion's text.
    #[instrument(level = "info", skip_all, fields(%topic))]
    pub async fn generate(&self, topic: &Topic) -> Result<Article, PipelineError> {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Please write an article I can post on Medium about {topic}. \
                         Format it in HTML, including a <title> element."
                    ),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            presence_penalty: PRESENCE_PENALTY,
            frequency_penalty: FREQUENCY_PENALTY,
        };

        info!(model = MODEL, "Requesting article generation");
        let t0 = Instant::now();
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Generation(format!(
                "service returned {status}: {}",
                truncate_for_log(&body, 300)
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Generation(format!("malformed response: {e}")))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Generation("service returned no completions".to_string()))?;

        debug!(
            bytes = choice.message.content.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Generated article body"
        );
        Ok(Article {
            topic: topic.clone(),
            html: choice.message.content,
            title: String::new(),
        })
    }
}
