//! Cache store contract and the in-process implementation.

use super::key::CacheKey;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Opaque, possibly shared key/value text store consulted by the pipeline.
///
/// Implementations own their concurrency discipline; the pipeline takes no
/// locks around `exists`/`load`/`store`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads are skipped entirely when this returns true; writes still happen.
    fn is_cache_disabled(&self) -> bool;
    async fn exists(&self, key: &CacheKey) -> Result<bool>;
    async fn load(&self, key: &CacheKey) -> Result<String>;
    async fn store(&self, key: &CacheKey, value: &str) -> Result<()>;
    fn name(&self) -> &'static str;
}

#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
    no_cache: bool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that still records writes but reports itself disabled.
    pub fn disabled() -> Self {
        Self { no_cache: true, ..Self::default() }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw stored text for `key`, as written by the pipeline.
    pub fn raw(&self, key: &CacheKey) -> Option<String> {
        self.entries.read().ok()?.get(key.as_str()).cloned()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    fn poisoned() -> ErrorContext {
        ErrorContext::new().with_details("lock poisoned").with_source("memory_cache")
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    fn is_cache_disabled(&self) -> bool {
        self.no_cache
    }
    async fn exists(&self, key: &CacheKey) -> Result<bool> {
        let entries = self
            .entries
            .read()
            .map_err(|_| Error::cache_read_with_context("cannot read entries", Self::poisoned()))?;
        Ok(entries.contains_key(key.as_str()))
    }
    async fn load(&self, key: &CacheKey) -> Result<String> {
        let entries = self
            .entries
            .read()
            .map_err(|_| Error::cache_read_with_context("cannot read entries", Self::poisoned()))?;
        entries.get(key.as_str()).cloned().ok_or_else(|| {
            Error::cache_read_with_context(
                format!("no entry for key {}", key),
                ErrorContext::new().with_source("memory_cache"),
            )
        })
    }
    async fn store(&self, key: &CacheKey, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| Error::cache_write_with_context("cannot write entries", Self::poisoned()))?;
        entries.insert(key.as_str().to_string(), value.to_string());
        Ok(())
    }
    fn name(&self) -> &'static str {
        "memory"
    }
}
