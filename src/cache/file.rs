//! On-disk cache: one file per key under a cache directory.

use super::backend::CacheStore;
use super::key::CacheKey;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "ai-explain";

#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
    no_cache: bool,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), no_cache: false }
    }

    /// `<user cache dir>/ai-explain`, or `None` when the platform has no cache dir.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join(CACHE_DIR_NAME))
    }

    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys currently on disk, sorted. A missing directory lists as empty.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut read_dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.read_error("cannot list cache directory", &self.dir, e)),
        };
        let mut keys = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| self.read_error("cannot list cache directory", &self.dir, e))?
        {
            if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                keys.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Delete one entry; returns whether it existed.
    pub async fn remove(&self, key: &CacheKey) -> Result<bool> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::cache_write_with_context(
                format!("cannot remove entry: {}", e),
                self.context(&path),
            )),
        }
    }

    fn path_for(&self, key: &CacheKey) -> Result<PathBuf> {
        let name = key.as_str();
        // Keys become file names; refuse anything that could escape the directory.
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::cache_read_with_context(
                "cache key is not a valid file name",
                ErrorContext::new().with_details(name.to_string()).with_source("file_cache"),
            ));
        }
        Ok(self.dir.join(name))
    }

    fn context(&self, path: &Path) -> ErrorContext {
        ErrorContext::new()
            .with_field_path(path.display().to_string())
            .with_source("file_cache")
    }

    fn read_error(&self, msg: &str, path: &Path, e: std::io::Error) -> Error {
        Error::cache_read_with_context(format!("{}: {}", msg, e), self.context(path))
    }
}

#[async_trait]
impl CacheStore for FileCache {
    fn is_cache_disabled(&self) -> bool {
        self.no_cache
    }

    async fn exists(&self, key: &CacheKey) -> Result<bool> {
        let path = self.path_for(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| self.read_error("cannot stat entry", &path, e))
    }

    async fn load(&self, key: &CacheKey) -> Result<String> {
        let path = self.path_for(key)?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| self.read_error("cannot read entry", &path, e))
    }

    async fn store(&self, key: &CacheKey, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::cache_write_with_context(
                format!("cannot create cache directory: {}", e),
                self.context(&self.dir),
            )
        })?;
        tokio::fs::write(&path, value).await.map_err(|e| {
            Error::cache_write_with_context(format!("cannot write entry: {}", e), self.context(&path))
        })
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
