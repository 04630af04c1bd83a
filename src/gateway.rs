//! Remote completion gateway: one formatted prompt in, one completion out.

use crate::context::RequestContext;
use crate::prompt;
use crate::transport::{ChatCompletionRequest, ChatMessage, HttpTransport};
use crate::Result;

/// A configured connection plus the per-adapter request settings.
#[derive(Debug, Clone)]
pub struct CompletionGateway {
    transport: HttpTransport,
    language: String,
    model: String,
    routing_id: Option<String>,
}

impl CompletionGateway {
    pub fn new(transport: HttpTransport, language: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            transport,
            language: language.into(),
            model: model.into(),
            routing_id: None,
        }
    }

    /// Session routing identifier sent with every request (FastGPT `chatId`).
    pub fn with_routing_id(mut self, routing_id: impl Into<String>) -> Self {
        self.routing_id = Some(routing_id.into());
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn routing_id(&self) -> Option<&str> {
        self.routing_id.as_deref()
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// The single-message request `complete` would send.
    pub fn build_request(&self, prompt: &str, template: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt::render(template, &self.language, prompt))],
            chat_id: self.routing_id.clone(),
        }
    }

    /// Send one request and return the first choice's text. No retries.
    pub async fn complete(&self, ctx: &RequestContext, prompt: &str, template: &str) -> Result<String> {
        let request = self.build_request(prompt, template);
        tracing::debug!(
            model = %self.model,
            base_url = %self.transport.base_url(),
            "sending completion request"
        );
        let response = self.transport.create_chat_completion(ctx, &request).await?;
        Ok(response.into_first_content()?)
    }
}
