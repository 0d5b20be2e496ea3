/// LLM Client — the single point of entry for all completion calls in jobad.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
/// Everything else talks to the `CompletionService` trait, so tests can swap in a fake.
///
/// Model: gpt-4o-mini (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for all completion calls in jobad.
pub const MODEL: &str = "gpt-4o-mini";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Response does not match the '{schema}' schema: {reason}")]
    Schema { schema: String, reason: String },
}

/// Token accounting reported by the service for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, other: Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// One structured-output request: system instructions, user input and the
/// JSON schema the answer must follow.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub name: String,
    pub instructions: String,
    pub input: String,
    pub schema: serde_json::Value,
    pub strict: bool,
    pub temperature: f32,
}

/// Parsed JSON answer plus its token usage.
#[derive(Debug, Clone)]
pub struct Completion {
    pub value: serde_json::Value,
    pub usage: Usage,
}

/// The completion service seam. `LlmClient` is the production backend.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

/// Calls the service and deserializes the structured answer into `T`.
pub async fn complete_json<T: DeserializeOwned>(
    service: &dyn CompletionService,
    request: &CompletionRequest,
) -> Result<(T, Usage), LlmError> {
    let completion = service.complete(request).await?;
    let parsed = serde_json::from_value(completion.value).map_err(|e| LlmError::Schema {
        schema: request.name.clone(),
        reason: e.to_string(),
    })?;
    Ok((parsed, completion.usage))
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
    pub refusal: Option<String>,
}

impl ChatResponse {
    /// Extracts the text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// The HTTP-backed completion service.
/// Wraps the Chat Completions API with retry logic and structured output.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_key,
        })
    }

    /// Makes a raw call to the API, returning the full response object.
    /// Retries on 429 (rate limit), 5xx and transport errors with exponential backoff.
    pub async fn call(&self, request: &CompletionRequest) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.instructions,
                },
                ChatMessage {
                    role: "user",
                    content: &request.input,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &request.name,
                    strict: request.strict,
                    schema: &request.schema,
                },
            },
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(OPENAI_API_URL)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OpenAiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat_response: ChatResponse = response.json().await?;

            debug!(
                "LLM call '{}' succeeded: prompt_tokens={}, completion_tokens={}",
                request.name, chat_response.usage.prompt_tokens, chat_response.usage.completion_tokens
            );

            return Ok(chat_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl CompletionService for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let response = self.call(request).await?;
        if let Some(refusal) = response.choices.first().and_then(|c| c.message.refusal.as_deref()) {
            warn!("LLM refused '{}': {}", request.name, refusal);
        }
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        let value = serde_json::from_str(strip_json_fences(text))?;
        Ok(Completion {
            value,
            usage: response.usage,
        })
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct CannedService(serde_json::Value);

    #[async_trait]
    impl CompletionService for CannedService {
        async fn complete(&self, _request: &CompletionRequest) -> Result<Completion, LlmError> {
            Ok(Completion {
                value: self.0.clone(),
                usage: Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                },
            })
        }
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            name: "answer_check".to_string(),
            instructions: "answer".to_string(),
            input: "input".to_string(),
            schema: json!({"type": "object"}),
            strict: false,
            temperature: 0.0,
        }
    }

    #[derive(Debug, Deserialize)]
    struct Answer {
        answer: u32,
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_chat_response_text_and_usage() {
        let body = json!({
            "choices": [{"message": {"content": "{\"answer\": 42}", "refusal": null}}],
            "usage": {"prompt_tokens": 4206, "completion_tokens": 106, "total_tokens": 4312}
        });
        let response: ChatResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.text(), Some("{\"answer\": 42}"));
        assert_eq!(response.usage.total_tokens, 4312);
    }

    #[test]
    fn test_chat_response_blank_content_is_none() {
        let body = json!({"choices": [{"message": {"content": "  "}}]});
        let response: ChatResponse = serde_json::from_value(body).unwrap();
        assert!(response.text().is_none());
        assert_eq!(response.usage, Usage::default());
    }

    #[test]
    fn test_usage_add_assign() {
        let mut total = Usage::default();
        total += Usage {
            prompt_tokens: 1,
            completion_tokens: 2,
            total_tokens: 3,
        };
        total += Usage {
            prompt_tokens: 1,
            completion_tokens: 2,
            total_tokens: 3,
        };
        assert_eq!(total.total_tokens, 6);
        assert_eq!(total.prompt_tokens, 2);
    }

    #[tokio::test]
    async fn test_complete_json_deserializes() {
        let service = CannedService(json!({"answer": 42}));
        let (parsed, usage): (Answer, Usage) = complete_json(&service, &request()).await.unwrap();
        assert_eq!(parsed.answer, 42);
        assert_eq!(usage.total_tokens, 15);
    }

    #[tokio::test]
    async fn test_complete_json_shape_mismatch_is_schema_error() {
        let service = CannedService(json!({"wrong": true}));
        let err = complete_json::<Answer>(&service, &request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Schema { .. }));
    }
}
