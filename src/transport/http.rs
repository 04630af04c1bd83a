use crate::context::RequestContext;
use crate::{Error, ErrorContext, Result};
use reqwest::Proxy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Endpoint used when the configuration leaves the base URL empty.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// A single chat message on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

/// OpenAI-compatible chat completion request.
///
/// `chat_id` is the FastGPT session routing field; it is omitted from the
/// body when absent so plain OpenAI endpoints accept the request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(rename = "chatId", skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first returned choice; later choices are ignored.
    pub fn into_first_content(self) -> std::result::Result<String, TransportError> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(TransportError::EmptyChoices)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Connection handle to an OpenAI-compatible completion endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Build a connection authenticated with `api_key`. An empty or missing
    /// `base_url` selects [`DEFAULT_BASE_URL`]. No network I/O happens here.
    pub fn new(api_key: &str, base_url: Option<&str>) -> Result<Self> {
        let base_url = match base_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => {
                url::Url::parse(url).map_err(|e| {
                    Error::connection_with_context(
                        format!("invalid base URL: {}", e),
                        ErrorContext::new()
                            .with_field_path("config.base_url")
                            .with_details(url.to_string())
                            .with_source("http_transport"),
                    )
                })?;
                url.trim_end_matches('/').to_string()
            }
            None => DEFAULT_BASE_URL.to_string(),
        };

        // Minimal production-friendly defaults (env-overridable).
        let timeout_secs = env::var("AI_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_max_idle_per_host(
                env::var("AI_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("AI_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build().map_err(|e| {
            Error::connection_with_context(
                format!("error creating HTTP client: {}", e),
                ErrorContext::new().with_source("http_transport"),
            )
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one chat completion request, bounded by `ctx`. Single attempt.
    pub async fn create_chat_completion(
        &self,
        ctx: &RequestContext,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        ctx.run(self.send_chat_completion(request)).await
    }

    async fn send_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(TransportError::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(TransportError::Http)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        serde_json::from_str(&body)
            .map_err(|e| TransportError::Decode(e.to_string()).into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed completion response: {0}")]
    Decode(String),

    #[error("Completion response contained no choices")]
    EmptyChoices,

    #[error("Request cancelled")]
    Cancelled,

    #[error("Request deadline exceeded")]
    DeadlineExceeded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_chat_id() {
        let req = ChatCompletionRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![ChatMessage::user("hello")],
            chat_id: Some("chat-42".to_string()),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["chatId"], "chat-42");
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_request_omits_missing_chat_id() {
        let req = ChatCompletionRequest {
            model: "gpt-4o".to_string(),
            messages: vec![ChatMessage::user("hi")],
            chat_id: None,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("chatId").is_none());
    }

    #[test]
    fn test_first_choice_wins() {
        let resp: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "first"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "second"}}
            ]
        }))
        .unwrap();
        assert_eq!(resp.into_first_content().unwrap(), "first");
    }

    #[test]
    fn test_empty_choices_is_error() {
        let resp: ChatCompletionResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();
        assert!(matches!(
            resp.into_first_content(),
            Err(TransportError::EmptyChoices)
        ));
    }

    #[test]
    fn test_base_url_defaults_and_trims() {
        let t = HttpTransport::new("tok", None).unwrap();
        assert_eq!(t.base_url(), DEFAULT_BASE_URL);
        let t = HttpTransport::new("tok", Some("")).unwrap();
        assert_eq!(t.base_url(), DEFAULT_BASE_URL);
        let t = HttpTransport::new("tok", Some("https://fastgpt.example.com/api/v1/")).unwrap();
        assert_eq!(t.base_url(), "https://fastgpt.example.com/api/v1");
    }

    #[test]
    fn test_invalid_base_url_is_connection_error() {
        let err = HttpTransport::new("tok", Some("not a url")).unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
    }
}
