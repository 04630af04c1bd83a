use crate::transport::TransportError;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.password", "config.base_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., the offending value with secrets redacted)
    pub details: Option<String>,
    /// Source of the error (e.g., "fastgpt", "file_cache")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the explanation adapters.
///
/// Setup failures (`Configuration`, `Connection`) abort adapter initialization.
/// Per-call failures (`Request`, `CacheRead`) are returned from `parse` and
/// left to the caller to log.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Connection error: {message}{}", format_context(.context))]
    Connection {
        message: String,
        context: ErrorContext,
    },

    #[error("Completion request failed: {0}")]
    Request(#[from] TransportError),

    #[error("Cache read error: {message}{}", format_context(.context))]
    CacheRead {
        message: String,
        context: ErrorContext,
    },

    #[error("Cache write error: {message}{}", format_context(.context))]
    CacheWrite {
        message: String,
        context: ErrorContext,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new connection error with structured context
    pub fn connection_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Connection {
            message: msg.into(),
            context,
        }
    }

    pub fn cache_read(msg: impl Into<String>) -> Self {
        Self::cache_read_with_context(msg, ErrorContext::new())
    }

    pub fn cache_read_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::CacheRead {
            message: msg.into(),
            context,
        }
    }

    pub fn cache_write(msg: impl Into<String>) -> Self {
        Self::cache_write_with_context(msg, ErrorContext::new())
    }

    pub fn cache_write_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::CacheWrite {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Connection { context, .. }
            | Error::CacheRead { context, .. }
            | Error::CacheWrite { context, .. } => Some(context),
            _ => None,
        }
    }

    /// True when the error happened while setting an adapter up.
    pub fn is_setup_error(&self) -> bool {
        matches!(self, Error::Configuration { .. } | Error::Connection { .. })
    }
}
