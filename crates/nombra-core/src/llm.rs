//! Title generation through an OpenAI-compatible chat completions API.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const TEMPERATURE: f32 = 0.3;

/// Instruction sent as the system turn of every request.
pub const SYSTEM_PROMPT: &str = "You are a professional document curator. Analyze the provided \
document for any dates in the format YYYY.MM.DD that indicate the document's creation or \
signature date. If one or more valid dates are found, use the latest date and generate a title \
in the following format: 'YYYY.MM.DD - Entity - Document Description - Recipient'. If no valid \
date is found, omit the date and generate the title as 'Entity - Document Description - \
Recipient'. Likewise, if the document lacks a recipient, omit that segment entirely; do not use \
any placeholder text such as 'Recipient'. Respond with only the title, in the same language as \
the document. For example, if the document contains the date '2024.03.31', the title should be \
'2024.03.31 - John Doe - Lohnabrechnung - Zürich'. If no date is found, then it should be \
'John Doe - Lohnabrechnung - Zürich'.";

#[derive(Error, Debug)]
pub enum TitleError {
    #[error("empty content provided for title generation")]
    EmptyContent,
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    #[error("empty response from API")]
    EmptyResponse,
}

/// Something that can turn document text into a raw title.
pub trait TitleGenerator: Send + Sync {
    /// Ask for a title for `content`. The answer is returned unprocessed;
    /// see [`clean_title`](crate::title::clean_title).
    fn generate<'a>(
        &'a self,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, TitleError>> + Send + 'a>>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

fn build_request<'a>(model: &'a str, content: &'a str) -> ChatCompletionRequest<'a> {
    ChatCompletionRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content,
            },
        ],
        temperature: TEMPERATURE,
    }
}

/// Pull the first non-empty answer out of a completion response.
fn first_answer(response: ChatCompletionResponse) -> Result<String, TitleError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(TitleError::EmptyResponse)
}

/// Best-effort extraction of `error.message` from a failed response body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Chat completions client for OpenAI or any API speaking the same protocol.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: &str, base_url: &str, model: &str) -> Result<Self, TitleError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("nombra/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn request_title(&self, content: &str) -> Result<String, TitleError> {
        if content.trim().is_empty() {
            return Err(TitleError::EmptyContent);
        }

        let url = format!("{}/chat/completions", self.base_url);
        let body = build_request(&self.model, content);

        tracing::debug!(%url, model = %self.model, "requesting title");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(TitleError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let data: ChatCompletionResponse = resp.json().await?;
        first_answer(data)
    }
}

impl TitleGenerator for OpenAiClient {
    fn generate<'a>(
        &'a self,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, TitleError>> + Send + 'a>> {
        Box::pin(self.request_title(content))
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}
