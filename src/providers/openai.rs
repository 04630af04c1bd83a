//! OpenAI adapter: plain API key, no session routing.

use async_trait::async_trait;
use std::sync::Arc;

use super::AiProvider;
use crate::config::AiConfig;
use crate::context::RequestContext;
use crate::gateway::CompletionGateway;
use crate::observer::{tracing_observer, CacheObserver};
use crate::transport::HttpTransport;
use crate::{Error, ErrorContext, Result};

pub const NAME: &str = "openai";

#[derive(Clone)]
pub struct OpenAiClient {
    gateway: Option<CompletionGateway>,
    observer: Arc<dyn CacheObserver>,
}

impl OpenAiClient {
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
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AiProvider for OpenAiClient {
    fn configure(&mut self, config: &dyn AiConfig, language: &str) -> Result<()> {
        if self.gateway.is_some() {
            return Err(Error::configuration_with_context(
                "client is already configured",
                ErrorContext::new().with_source(NAME),
            ));
        }
        if config.password().is_empty() {
            return Err(Error::configuration_with_context(
                "API key is empty",
                ErrorContext::new()
                    .with_field_path("config.password")
                    .with_source(NAME),
            ));
        }

        let transport = HttpTransport::new(config.password(), Some(config.base_url()))?;
        self.gateway = Some(CompletionGateway::new(transport, language, config.model()));
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
