//! Caching request pipeline shared by every provider.
//!
//! `parse` joins the prompt fragments, derives the cache key and either
//! answers from the store or makes exactly one live call and writes the
//! result back. Decode and write failures are reported to the provider's
//! observer and never surface as errors; read failures and live-call
//! failures always do.

use crate::cache::{decode_entry, derive_key, encode_entry, CacheStore};
use crate::context::RequestContext;
use crate::observer::CacheEvent;
use crate::providers::AiProvider;
use crate::Result;

/// Fragments joined with single spaces; an empty list joins to `""`.
pub fn join_prompt<S: AsRef<str>>(fragments: &[S]) -> String {
    let mut out = String::new();
    for (i, f) in fragments.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(f.as_ref());
    }
    out
}

pub async fn parse<P>(
    provider: &P,
    ctx: &RequestContext,
    fragments: &[String],
    cache: &dyn CacheStore,
    template: &str,
) -> Result<String>
where
    P: AiProvider + ?Sized,
{
    let input = join_prompt(fragments);
    let key = derive_key(provider.name(), provider.language(), &input);
    let observer = provider.observer();
    let name = provider.name().to_string();

    if cache.is_cache_disabled() {
        observer.on_event(&CacheEvent::Bypassed { provider: name.clone(), key: key.hash.clone() });
    } else if cache.exists(&key).await? {
        let stored = cache.load(&key).await?;
        if !stored.is_empty() {
            return match decode_entry(&stored) {
                Ok(text) => {
                    observer.on_event(&CacheEvent::Hit { provider: name, key: key.hash });
                    Ok(text)
                }
                Err(e) => {
                    // A corrupt entry yields an empty answer, not a refetch.
                    observer.on_event(&CacheEvent::DecodeFailed {
                        provider: name,
                        key: key.hash,
                        error: e.to_string(),
                    });
                    Ok(String::new())
                }
            };
        }
        observer.on_event(&CacheEvent::Miss { provider: name.clone(), key: key.hash.clone() });
    } else {
        observer.on_event(&CacheEvent::Miss { provider: name.clone(), key: key.hash.clone() });
    }

    let response = provider.get_completion(ctx, &input, template).await?;

    if let Err(e) = cache.store(&key, &encode_entry(&response)).await {
        observer.on_event(&CacheEvent::StoreFailed {
            provider: name,
            key: key.hash,
            error: e.to_string(),
        });
    }

    Ok(response)
}
