//! Content-addressed response cache.
//!
//! Completions are stored under a key derived from the adapter name, the
//! output language and the joined prompt, so the same question asked of the
//! same provider in the same language is answered locally the second time.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheStore`] | Trait the pipeline consults (`exists` / `load` / `store`) |
//! | [`MemoryCache`] | In-process store, shared between clones |
//! | [`FileCache`] | One file per key, persists between runs |
//! | [`derive_key`] | SHA-256 key over (provider, language, prompt) |
//! | [`encode_entry`] / [`decode_entry`] | base64 entry codec |

mod backend;
mod codec;
mod file;
mod key;

pub use backend::{CacheStore, MemoryCache};
pub use codec::{decode_entry, encode_entry, DecodeError};
pub use file::FileCache;
pub use key::{derive_key, CacheKey};
