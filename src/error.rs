use crate::transport::TransportError;
use crate::types::ApiError;
use bytes::Bytes;
use thiserror::Error;

/// Structured error context for configuration and decoding failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "config.base_url", "RESELLER_OIDC_AUTHORITY")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected shape, offending value)
    pub details: Option<String>,
    /// Source of the error (e.g., "client_builder", "app_config")
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

/// Unified error type for the API access layer.
///
/// Every failure a request can produce lands in exactly one of these categories; none of them
/// are swallowed by the client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// Non-2xx response from the gateway. `api_error` is populated when the body matches the
    /// standard error shape. `raw_body` holds the bytes exactly as received; `body` is their
    /// (lossy) UTF-8 text.
    #[error("Remote error: HTTP {status}{}", format_api_error(.api_error))]
    Remote {
        status: u16,
        api_error: Option<ApiError>,
        body: String,
        raw_body: Bytes,
        request_id: String,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Response decode error: {message}{}", format_context(.context))]
    Decode {
        message: String,
        context: ErrorContext,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

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

fn format_api_error(api_error: &Option<ApiError>) -> String {
    match api_error {
        Some(e) => format!(" {}: {}", e.code, e.message),
        None => String::new(),
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    /// Create a new decode error with structured context
    pub fn decode_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Decode {
            message: msg.into(),
            context,
        }
    }

    /// HTTP status of a remote failure, if the gateway answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a gateway response with HTTP 401.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport(t) if t.is_timeout())
    }

    /// The parsed error body of a remote failure, when it matched the standard shape.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Remote { api_error, .. } => api_error.as_ref(),
            _ => None,
        }
    }

    /// Body text of a remote failure. Invalid UTF-8 is replaced; see [`Error::raw_body`].
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Remote { body, .. } => Some(body.as_str()),
            _ => None,
        }
    }

    /// Body bytes of a remote failure, exactly as received.
    pub fn raw_body(&self) -> Option<&[u8]> {
        match self {
            Error::Remote { raw_body, .. } => Some(&raw_body[..]),
            _ => None,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Decode { context, .. } => Some(context),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(status: u16, body: &str) -> Error {
        Error::Remote {
            status,
            api_error: ApiError::from_body(body),
            body: body.to_string(),
            raw_body: Bytes::copy_from_slice(body.as_bytes()),
            request_id: "req-1".to_string(),
        }
    }

    #[test]
    fn test_unauthorized_only_for_401() {
        assert!(remote(401, "").is_unauthorized());
        assert!(!remote(403, "").is_unauthorized());
        assert!(!Error::configuration("x").is_unauthorized());
    }

    #[test]
    fn test_display_includes_api_error() {
        let err = remote(500, r#"{"code":"INTERNAL","message":"boom"}"#);
        assert_eq!(err.to_string(), "Remote error: HTTP 500 INTERNAL: boom");
        assert_eq!(err.api_error().map(|e| e.code.as_str()), Some("INTERNAL"));
    }

    #[test]
    fn test_display_without_api_error() {
        let err = remote(502, "<html>bad gateway</html>");
        assert_eq!(err.to_string(), "Remote error: HTTP 502");
        assert_eq!(err.body(), Some("<html>bad gateway</html>"));
    }

    #[test]
    fn test_configuration_context_formatting() {
        let err = Error::configuration_with_context(
            "base URL must be absolute",
            ErrorContext::new()
                .with_field_path("config.base_url")
                .with_source("client_builder"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: base URL must be absolute (field: config.base_url, source: client_builder)"
        );
        assert!(err.context().is_some());
    }
}
