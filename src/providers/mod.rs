//! Provider adapters.
//!
//! Every remote provider implements [`AiProvider`]. Only `configure` and
//! `get_completion` differ between them; `parse` is the shared caching
//! pipeline and should not be overridden.

pub mod fastgpt;
pub mod openai;

use async_trait::async_trait;
use std::sync::Arc;

use crate::cache::CacheStore;
use crate::config::AiConfig;
use crate::context::RequestContext;
use crate::observer::CacheObserver;
use crate::Result;

pub use fastgpt::FastGptClient;
pub use openai::OpenAiClient;

/// Names accepted by [`new_client`].
pub const PROVIDER_NAMES: &[&str] = &[fastgpt::NAME, openai::NAME];

#[async_trait]
pub trait AiProvider: Send + Sync + std::fmt::Debug {
    /// Set the adapter up from `config`. Must succeed exactly once before
    /// any completion is requested. Performs no network I/O.
    fn configure(&mut self, config: &dyn AiConfig, language: &str) -> Result<()>;

    /// One remote completion for `prompt` rendered into `template`
    /// (empty selects the default template).
    async fn get_completion(&self, ctx: &RequestContext, prompt: &str, template: &str) -> Result<String>;

    /// Fixed identity; namespaces this adapter's cache keys.
    fn name(&self) -> &'static str;

    /// Configured output language (empty until configured).
    fn language(&self) -> &str;

    fn observer(&self) -> Arc<dyn CacheObserver>;

    /// Answer `prompt` from `cache` when possible, otherwise ask the provider
    /// and remember the answer.
    async fn parse(
        &self,
        ctx: &RequestContext,
        prompt: &[String],
        cache: &dyn CacheStore,
        template: &str,
    ) -> Result<String> {
        crate::pipeline::parse(self, ctx, prompt, cache, template).await
    }
}

/// Unconfigured adapter for `name`, or `None` for an unknown provider.
pub fn new_client(name: &str) -> Option<Box<dyn AiProvider>> {
    match name {
        fastgpt::NAME => Some(Box::new(FastGptClient::new())),
        openai::NAME => Some(Box::new(OpenAiClient::new())),
        _ => None,
    }
}
