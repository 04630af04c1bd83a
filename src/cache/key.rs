//! Cache key generation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content address of one (provider, language, prompt) request.
///
/// `hash` is the lowercase hex SHA-256 of `"{provider}-{language}-{prompt}"`.
/// Entries persist across runs, so this format must stay byte-stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub hash: String,
    pub provider: Option<String>,
    pub language: Option<String>,
}

impl CacheKey {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into(), provider: None, language: None }
    }
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self { self.provider = Some(provider.into()); self }
    pub fn with_language(mut self, language: impl Into<String>) -> Self { self.language = Some(language.into()); self }
    pub fn as_str(&self) -> &str { &self.hash }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.hash) }
}

impl From<&str> for CacheKey { fn from(s: &str) -> Self { Self::new(s) } }
impl From<String> for CacheKey { fn from(s: String) -> Self { Self::new(s) } }

/// Derive the cache key for a request. Pure and deterministic.
pub fn derive_key(provider: &str, language: &str, prompt: &str) -> CacheKey {
    let data = format!("{}-{}-{}", provider, language, prompt);
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    let hash: String = hasher.finalize().iter().map(|b| format!("{:02x}", b)).collect();
    CacheKey::new(hash).with_provider(provider).with_language(language)
}
