//! # ai-explain
//!
//! Cached natural-language explanations for diagnostic prompts.
//!
//! ## Overview
//!
//! A diagnostic tool hands an adapter the fragments of a technical message
//! (for example a Kubernetes error) and gets back an explanation from a remote
//! chat-completion service. Answers are cached under a content-addressed key,
//! so asking the same question twice costs one network call.
//!
//! ```text
//! parse(fragments) ─► derive_key(provider, language, prompt)
//!                        │
//!            ┌── hit ────┴──── miss ──┐
//!            ▼                        ▼
//!      decode entry          get_completion ─► encode + store
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_explain::cache::FileCache;
//! use ai_explain::config::ProviderConfig;
//! use ai_explain::providers::{AiProvider, FastGptClient};
//! use ai_explain::RequestContext;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> ai_explain::Result<()> {
//!     let config = ProviderConfig::new("fastgpt")
//!         .with_password("chat-123:fastgpt-token")
//!         .with_model("gpt-3.5-turbo");
//!
//!     let mut client = FastGptClient::new();
//!     client.configure(&config, "english")?;
//!
//!     let cache = FileCache::new("/tmp/ai-explain");
//!     let ctx = RequestContext::new().with_timeout(Duration::from_secs(60));
//!     let prompt = vec!["pod".to_string(), "CrashLoopBackOff".to_string()];
//!     let answer = client.parse(&ctx, &prompt, &cache, "").await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`providers`] | `AiProvider` trait, FastGPT and OpenAI adapters, registry |
//! | [`pipeline`] | Shared cache-then-call request pipeline |
//! | [`gateway`] | Prompt rendering and the single remote call |
//! | [`transport`] | OpenAI-compatible HTTP wire layer |
//! | [`cache`] | Cache store trait, memory and file stores, key and codec |
//! | [`observer`] | Cache event hook (tracing by default) |
//! | [`config`] | `AiConfig` contract and YAML configuration |
//! | [`prompt`] | Prompt templates |

pub mod cache;
pub mod config;
pub mod context;
pub mod gateway;
pub mod observer;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod transport;

pub use context::RequestContext;
pub use providers::{new_client, AiProvider, FastGptClient, OpenAiClient, PROVIDER_NAMES};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
