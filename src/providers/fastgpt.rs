//! FastGPT adapter.
//!
//! FastGPT speaks the OpenAI chat-completion protocol but routes requests to
//! a chat session, so its secret is compound: `chatId:accessToken`.

use async_trait::async_trait;
use std::sync::Arc;

use super::AiProvider;
use crate::config::AiConfig;
use crate::context::RequestContext;
use crate::gateway::CompletionGateway;
use crate::observer::{tracing_observer, CacheObserver};
use crate::transport::HttpTransport;
use crate::{Error, ErrorContext, Result};

pub const NAME: &str = "fastgpt";

const SECRET_SEPARATOR: char = ':';

#[derive(Clone)]
pub struct FastGptClient {
    gateway: Option<CompletionGateway>,
    observer: Arc<dyn CacheObserver>,
}

impl FastGptClient {
    pub fn new() -> Self {
        Self {
            gateway: None,
            observer: tracing_observer(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.gateway.as_ref().and_then(|g| g.routing_id())
    }

    pub fn model(&self) -> Option<&str> {
        self.gateway.as_ref().map(|g| g.model())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.gateway.as_ref().map(|g| g.transport().base_url())
    }
}

impl Default for FastGptClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FastGptClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastGptClient")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

/// Split `chatId:accessToken`. The token keeps any further colons.
pub fn split_secret(secret: &str) -> Result<(&str, &str)> {
    secret.split_once(SECRET_SEPARATOR).ok_or_else(|| {
        Error::configuration_with_context(
            "password must be in the form <chatId>:<token>",
            ErrorContext::new()
                .with_field_path("config.password")
                .with_source(NAME),
        )
    })
}

#[async_trait]
impl AiProvider for FastGptClient {
    fn configure(&mut self, config: &dyn AiConfig, language: &str) -> Result<()> {
        if self.gateway.is_some() {
            return Err(Error::configuration_with_context(
                "client is already configured",
                ErrorContext::new().with_source(NAME),
            ));
        }

        let (chat_id, token) = split_secret(config.password())?;
        let transport = HttpTransport::new(token, Some(config.base_url()))?;

        self.gateway = Some(
            CompletionGateway::new(transport, language, config.model()).with_routing_id(chat_id),
        );
        Ok(())
    }

    async fn get_completion(&self, ctx: &RequestContext, prompt: &str, template: &str) -> Result<String> {
        let gateway = self.gateway.as_ref().ok_or_else(|| {
            Error::configuration_with_context(
                "completion requested before configure",
                ErrorContext::new().with_source(NAME),
            )
        })?;
        gateway.complete(ctx, prompt, template).await
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn language(&self) -> &str {
        self.gateway.as_ref().map(|g| g.language()).unwrap_or("")
    }

    fn observer(&self) -> Arc<dyn CacheObserver> {
        self.observer.clone()
    }
}
