//! Cache observability hook.
//!
//! The pipeline reports every cache decision as a [`CacheEvent`]. The default
//! [`TracingObserver`] turns them into `tracing` events; [`InMemoryObserver`]
//! keeps them so tests can assert on warnings.

use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// Stored entry decoded and returned; no remote call.
    Hit { provider: String, key: String },
    /// No usable entry; a live call follows.
    Miss { provider: String, key: String },
    /// The store reports caching disabled; lookup skipped.
    Bypassed { provider: String, key: String },
    /// Stored entry could not be decoded; an empty answer was returned.
    DecodeFailed { provider: String, key: String, error: String },
    /// Live completion succeeded but writing it back failed.
    StoreFailed { provider: String, key: String, error: String },
}

impl CacheEvent {
    pub fn key(&self) -> &str {
        match self {
            CacheEvent::Hit { key, .. }
            | CacheEvent::Miss { key, .. }
            | CacheEvent::Bypassed { key, .. }
            | CacheEvent::DecodeFailed { key, .. }
            | CacheEvent::StoreFailed { key, .. } => key,
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, CacheEvent::DecodeFailed { .. } | CacheEvent::StoreFailed { .. })
    }
}

pub trait CacheObserver: Send + Sync {
    fn on_event(&self, event: &CacheEvent);
}

/// Emits cache events through `tracing`: warnings at WARN, the rest at DEBUG.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CacheObserver for TracingObserver {
    fn on_event(&self, event: &CacheEvent) {
        match event {
            CacheEvent::Hit { provider, key } => {
                tracing::debug!(provider = %provider, key = %key, "cache hit")
            }
            CacheEvent::Miss { provider, key } => {
                tracing::debug!(provider = %provider, key = %key, "cache miss")
            }
            CacheEvent::Bypassed { provider, key } => {
                tracing::debug!(provider = %provider, key = %key, "cache disabled, calling provider")
            }
            CacheEvent::DecodeFailed { provider, key, error } => tracing::warn!(
                provider = %provider,
                key = %key,
                "error decoding cached data: {}",
                error
            ),
            CacheEvent::StoreFailed { provider, key, error } => tracing::warn!(
                provider = %provider,
                key = %key,
                "error storing value to cache: {}",
                error
            ),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CacheObserver for NoopObserver {
    fn on_event(&self, _event: &CacheEvent) {}
}

/// In-memory observer for testing.
#[derive(Debug, Default)]
pub struct InMemoryObserver {
    events: RwLock<Vec<CacheEvent>>,
}

impl InMemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn events(&self) -> Vec<CacheEvent> {
        self.events.read().map(|e| e.clone()).unwrap_or_default()
    }
    pub fn warnings(&self) -> Vec<CacheEvent> {
        self.events().into_iter().filter(CacheEvent::is_warning).collect()
    }
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }
    pub fn len(&self) -> usize {
        self.events.read().map(|e| e.len()).unwrap_or(0)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheObserver for InMemoryObserver {
    fn on_event(&self, event: &CacheEvent) {
        if let Ok(mut events) = self.events.write() {
            events.push(event.clone());
        }
    }
}

pub fn tracing_observer() -> Arc<dyn CacheObserver> {
    Arc::new(TracingObserver)
}
