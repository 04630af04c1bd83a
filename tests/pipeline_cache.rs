//! Caching pipeline behavior, exercised through call-counting fakes.

use ai_explain::cache::{derive_key, encode_entry, CacheKey, CacheStore, MemoryCache};
use ai_explain::config::AiConfig;
use ai_explain::observer::{CacheEvent, CacheObserver, InMemoryObserver};
use ai_explain::transport::TransportError;
use ai_explain::{AiProvider, Error, RequestContext, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Provider that answers from a fixed string and counts calls.
#[derive(Debug)]
struct FakeProvider {
    language: String,
    answer: std::result::Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, String)>>,
    observer: Arc<InMemoryObserver>,
}

impl FakeProvider {
    fn answering(answer: &str) -> Self {
        Self {
            language: "english".to_string(),
            answer: Ok(answer.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            observer: Arc::new(InMemoryObserver::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            ..Self::answering("")
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiProvider for FakeProvider {
    fn configure(&mut self, _config: &dyn AiConfig, language: &str) -> Result<()> {
        self.language = language.to_string();
        Ok(())
    }

    async fn get_completion(&self, _ctx: &RequestContext, prompt: &str, template: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), template.to_string()));
        match &self.answer {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(TransportError::Status { status: 503, message: message.clone() }.into()),
        }
    }

    fn name(&self) -> &'static str {
        "fastgpt"
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn observer(&self) -> Arc<dyn CacheObserver> {
        self.observer.clone()
    }
}

/// Store wrapper that counts operations and can be told to fail.
#[derive(Default)]
struct CountingCache {
    inner: MemoryCache,
    disabled: bool,
    fail_exists: bool,
    fail_load: bool,
    fail_store: bool,
    exists_keys: Mutex<Vec<String>>,
    stored_keys: Mutex<Vec<String>>,
    loads: AtomicUsize,
}

impl CountingCache {
    fn stores(&self) -> usize {
        self.stored_keys.lock().unwrap().len()
    }
}

#[async_trait]
impl CacheStore for CountingCache {
    fn is_cache_disabled(&self) -> bool {
        self.disabled
    }
    async fn exists(&self, key: &CacheKey) -> Result<bool> {
        self.exists_keys.lock().unwrap().push(key.hash.clone());
        if self.fail_exists {
            return Err(Error::cache_read("store offline"));
        }
        self.inner.exists(key).await
    }
    async fn load(&self, key: &CacheKey) -> Result<String> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_load {
            return Err(Error::cache_read("corrupt index"));
        }
        self.inner.load(key).await
    }
    async fn store(&self, key: &CacheKey, value: &str) -> Result<()> {
        self.stored_keys.lock().unwrap().push(key.hash.clone());
        if self.fail_store {
            return Err(Error::cache_write("disk full"));
        }
        self.inner.store(key, value).await
    }
    fn name(&self) -> &'static str {
        "counting"
    }
}

fn fragments(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

const ANSWER: &str = "Container keeps crashing; check its logs.";

#[tokio::test]
async fn test_miss_then_hit_scenario() {
    let provider = FakeProvider::answering(ANSWER);
    let cache = CountingCache::default();
    let ctx = RequestContext::new();
    let prompt = fragments(&["pod", "CrashLoopBackOff"]);
    let key = derive_key("fastgpt", "english", "pod CrashLoopBackOff");

    let first = provider.parse(&ctx, &prompt, &cache, "").await.unwrap();
    assert_eq!(first, ANSWER);
    assert_eq!(provider.calls(), 1);
    assert_eq!(provider.prompts.lock().unwrap()[0].0, "pod CrashLoopBackOff");
    assert_eq!(*cache.stored_keys.lock().unwrap(), vec![key.hash.clone()]);
    assert_eq!(*cache.exists_keys.lock().unwrap(), vec![key.hash.clone()]);
    assert_eq!(cache.inner.raw(&key).as_deref(), Some(encode_entry(ANSWER).as_str()));

    let second = provider.parse(&ctx, &prompt, &cache, "").await.unwrap();
    assert_eq!(second, ANSWER);
    assert_eq!(provider.calls(), 1, "hit must not reach the provider");
    assert_eq!(cache.stores(), 1);

    let events = provider.observer.events();
    assert!(matches!(events[0], CacheEvent::Miss { .. }));
    assert!(matches!(events[1], CacheEvent::Hit { .. }));
    assert!(provider.observer.warnings().is_empty());
}

#[tokio::test]
async fn test_template_is_forwarded() {
    let provider = FakeProvider::answering("ok");
    let cache = CountingCache::default();
    provider
        .parse(&RequestContext::new(), &fragments(&["x"]), &cache, "Explain in %s: %s")
        .await
        .unwrap();
    assert_eq!(provider.prompts.lock().unwrap()[0].1, "Explain in %s: %s");
}

#[tokio::test]
async fn test_awkward_text_round_trips_through_cache() {
    let text = "line1\nline2\0tail — Größe ✓";
    let provider = FakeProvider::answering(text);
    let cache = CountingCache::default();
    let ctx = RequestContext::new();
    let prompt = fragments(&["node", "NotReady"]);

    assert_eq!(provider.parse(&ctx, &prompt, &cache, "").await.unwrap(), text);
    assert_eq!(provider.parse(&ctx, &prompt, &cache, "").await.unwrap(), text);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_corrupt_entry_fails_soft_without_refetch() {
    let provider = FakeProvider::answering(ANSWER);
    let cache = CountingCache::default();
    let key = derive_key("fastgpt", "english", "pod CrashLoopBackOff");
    cache.inner.store(&key, "%%% not base64 %%%").await.unwrap();

    let out = provider
        .parse(&RequestContext::new(), &fragments(&["pod", "CrashLoopBackOff"]), &cache, "")
        .await
        .unwrap();

    assert_eq!(out, "");
    assert_eq!(provider.calls(), 0);
    assert_eq!(cache.stores(), 0);
    let warnings = provider.observer.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(&warnings[0], CacheEvent::DecodeFailed { key: k, .. } if *k == key.hash));
}

#[tokio::test]
async fn test_empty_entry_falls_through_to_live_call() {
    let provider = FakeProvider::answering(ANSWER);
    let cache = CountingCache::default();
    let key = derive_key("fastgpt", "english", "pod CrashLoopBackOff");
    cache.inner.store(&key, "").await.unwrap();

    let out = provider
        .parse(&RequestContext::new(), &fragments(&["pod", "CrashLoopBackOff"]), &cache, "")
        .await
        .unwrap();
    assert_eq!(out, ANSWER);
    assert_eq!(provider.calls(), 1);
    assert_eq!(cache.stores(), 1);
}

#[tokio::test]
async fn test_store_failure_still_returns_completion() {
    let provider = FakeProvider::answering(ANSWER);
    let cache = CountingCache {
        fail_store: true,
        ..CountingCache::default()
    };

    let out = provider
        .parse(&RequestContext::new(), &fragments(&["pod"]), &cache, "")
        .await
        .unwrap();
    assert_eq!(out, ANSWER);
    assert_eq!(cache.stores(), 1);
    let warnings = provider.observer.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(&warnings[0], CacheEvent::StoreFailed { error, .. } if error.contains("disk full")));
}

#[tokio::test]
async fn test_disabled_cache_always_calls_and_still_stores() {
    let provider = FakeProvider::answering(ANSWER);
    let cache = CountingCache {
        disabled: true,
        ..CountingCache::default()
    };
    let key = derive_key("fastgpt", "english", "pod");
    cache.inner.store(&key, &encode_entry("stale answer")).await.unwrap();
    let ctx = RequestContext::new();

    for _ in 0..2 {
        let out = provider.parse(&ctx, &fragments(&["pod"]), &cache, "").await.unwrap();
        assert_eq!(out, ANSWER);
    }
    assert_eq!(provider.calls(), 2);
    assert_eq!(cache.stores(), 2);
    assert!(cache.exists_keys.lock().unwrap().is_empty());
    assert_eq!(cache.inner.raw(&key).as_deref(), Some(encode_entry(ANSWER).as_str()));
    assert!(matches!(provider.observer.events()[0], CacheEvent::Bypassed { .. }));
}

#[tokio::test]
async fn test_live_failure_propagates_and_stores_nothing() {
    let provider = FakeProvider::failing("upstream overloaded");
    let cache = CountingCache::default();

    let err = provider
        .parse(&RequestContext::new(), &fragments(&["pod"]), &cache, "")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Request(TransportError::Status { status: 503, .. })));
    assert_eq!(cache.stores(), 0);
}

#[tokio::test]
async fn test_exists_failure_is_fatal() {
    let provider = FakeProvider::answering(ANSWER);
    let cache = CountingCache {
        fail_exists: true,
        ..CountingCache::default()
    };
    let err = provider
        .parse(&RequestContext::new(), &fragments(&["pod"]), &cache, "")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CacheRead { .. }));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_load_failure_is_fatal() {
    let provider = FakeProvider::answering(ANSWER);
    let cache = CountingCache {
        fail_load: true,
        ..CountingCache::default()
    };
    let key = derive_key("fastgpt", "english", "pod");
    cache.inner.store(&key, &encode_entry(ANSWER)).await.unwrap();

    let err = provider
        .parse(&RequestContext::new(), &fragments(&["pod"]), &cache, "")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CacheRead { .. }));
    assert_eq!(cache.loads.load(Ordering::SeqCst), 1);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_empty_fragment_list_is_valid() {
    let provider = FakeProvider::answering("nothing to explain");
    let cache = CountingCache::default();
    let out = provider
        .parse(&RequestContext::new(), &[], &cache, "")
        .await
        .unwrap();
    assert_eq!(out, "nothing to explain");
    assert_eq!(provider.prompts.lock().unwrap()[0].0, "");
    assert_eq!(
        *cache.stored_keys.lock().unwrap(),
        vec![derive_key("fastgpt", "english", "").hash]
    );
}

#[tokio::test]
async fn test_language_partitions_cache() {
    let mut german = FakeProvider::answering("Antwort");
    german
        .configure(&ai_explain::config::ProviderConfig::new("fastgpt"), "german")
        .unwrap();
    let english = FakeProvider::answering("answer");
    let cache = CountingCache::default();
    let ctx = RequestContext::new();
    let prompt = fragments(&["pod"]);

    assert_eq!(english.parse(&ctx, &prompt, &cache, "").await.unwrap(), "answer");
    assert_eq!(german.parse(&ctx, &prompt, &cache, "").await.unwrap(), "Antwort");
    assert_eq!(english.calls() + german.calls(), 2);
}

#[tokio::test]
async fn test_concurrent_parses_share_cache() {
    let provider = Arc::new(FakeProvider::answering(ANSWER));
    let cache = Arc::new(MemoryCache::new());
    let mut handles = Vec::new();
    for i in 0..8 {
        let provider = provider.clone();
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            let prompt = vec![format!("pod-{}", i % 4)];
            provider
                .parse(&RequestContext::new(), &prompt, cache.as_ref(), "")
                .await
        }));
    }
    for h in handles {
        assert_eq!(h.await.unwrap().unwrap(), ANSWER);
    }
    assert_eq!(cache.len(), 4);
    assert!(provider.calls() >= 4 && provider.calls() <= 8);
}
