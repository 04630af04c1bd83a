//! Provider configuration.
//!
//! Adapters only see the [`AiConfig`] trait. [`AiConfiguration`] is the
//! YAML-backed convenience layer the CLI uses to produce one.

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PASSWORD: &str = "AI_EXPLAIN_PASSWORD";
pub const ENV_BASE_URL: &str = "AI_EXPLAIN_BASE_URL";
pub const ENV_MODEL: &str = "AI_EXPLAIN_MODEL";

/// What an adapter needs to configure itself.
pub trait AiConfig {
    /// Provider secret; `routingId:accessToken` for FastGPT.
    fn password(&self) -> &str;
    /// Endpoint override; empty selects the provider default.
    fn base_url(&self) -> &str;
    fn model(&self) -> &str;
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, alias = "baseurl")]
    pub base_url: String,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overlay non-empty values from `lookup` (normally the process environment).
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| lookup(k).filter(|v| !v.is_empty());
        if let Some(v) = get(ENV_PASSWORD) {
            self.password = v;
        }
        if let Some(v) = get(ENV_BASE_URL) {
            self.base_url = v;
        }
        if let Some(v) = get(ENV_MODEL) {
            self.model = v;
        }
        self
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|k| std::env::var(k).ok())
    }
}

// Keep secrets out of logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AiConfig for ProviderConfig {
    fn password(&self) -> &str {
        &self.password
    }
    fn base_url(&self) -> &str {
        &self.base_url
    }
    fn model(&self) -> &str {
        &self.model
    }
}

/// Configuration file layout:
///
/// ```yaml
/// default_provider: fastgpt
/// providers:
///   - name: fastgpt
///     model: gpt-3.5-turbo
///     password: "chat-123:fastgpt-xxxx"
///     base_url: https://fastgpt.example.com/api/v1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiConfiguration {
    #[serde(default, alias = "defaultprovider")]
    pub default_provider: Option<String>,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

impl AiConfiguration {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).map_err(|e| {
            Error::configuration_with_context(
                "invalid configuration",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("config"),
            )
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            Error::Configuration { message, context } => Error::Configuration {
                message,
                context: context.with_field_path(path.display().to_string()),
            },
            other => other,
        })
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Pick `name`, else the default provider, else the only configured one.
    pub fn resolve(&self, name: Option<&str>) -> Result<ProviderConfig> {
        let wanted = name.or(self.default_provider.as_deref());
        let found = match wanted {
            Some(n) => self.provider(n),
            None if self.providers.len() == 1 => self.providers.first(),
            None => None,
        };
        found.cloned().ok_or_else(|| {
            Error::configuration_with_context(
                match wanted {
                    Some(n) => format!("provider {} is not configured", n),
                    None => "no provider selected and no default configured".to_string(),
                },
                ErrorContext::new()
                    .with_field_path("providers")
                    .with_source("config"),
            )
        })
    }
}
