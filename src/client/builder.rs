use crate::client::core::ApiClient;
use crate::config::require_absolute;
use crate::interceptors::Interceptor;
use crate::session::{CredentialSupplier, UnauthorizedHandler};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use url::Url;

/// Immutable per-application client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Absolute http(s) URL every request path is appended to.
    pub base_url: Url,
    /// Pulled once per request; never cached by the client.
    pub credentials: Arc<dyn CredentialSupplier>,
    pub on_unauthorized: Option<Arc<dyn UnauthorizedHandler>>,
}

impl ClientConfig {
    pub fn new(base_url: Url, credentials: Arc<dyn CredentialSupplier>) -> Self {
        Self {
            base_url,
            credentials,
            on_unauthorized: None,
        }
    }

    pub fn with_unauthorized_handler(mut self, handler: Arc<dyn UnauthorizedHandler>) -> Self {
        self.on_unauthorized = Some(handler);
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("on_unauthorized", &self.on_unauthorized.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`].
///
/// Keep this surface area small and predictable: a base URL, a credential supplier, an optional
/// 401 handler, and optional extra interceptors.
pub struct ApiClientBuilder {
    base_url: Option<String>,
    credentials: Option<Arc<dyn CredentialSupplier>>,
    on_unauthorized: Option<Arc<dyn UnauthorizedHandler>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            credentials: None,
            on_unauthorized: None,
            interceptors: Vec::new(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Source of the bearer token. Accepts closures `Fn() -> Option<String>` as well as
    /// session providers such as [`crate::session::Session`].
    pub fn credential_supplier<S: CredentialSupplier + 'static>(mut self, supplier: S) -> Self {
        self.credentials = Some(Arc::new(supplier));
        self
    }

    pub fn shared_credential_supplier(mut self, supplier: Arc<dyn CredentialSupplier>) -> Self {
        self.credentials = Some(supplier);
        self
    }

    /// Infallible 401 callback.
    pub fn on_unauthorized<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_unauthorized = Some(Arc::new(callback));
        self
    }

    /// Fallible 401 handler; errors are logged and never replace the original failure.
    pub fn unauthorized_handler<H: UnauthorizedHandler + 'static>(mut self, handler: H) -> Self {
        self.on_unauthorized = Some(Arc::new(handler));
        self
    }

    /// Add an application interceptor. Runs after credential attachment and before the 401
    /// notification, in registration order.
    pub fn interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Validate the configuration and build the client. Fails fast on a missing or relative base
    /// URL or a missing credential supplier; performs no network activity.
    pub fn build(self) -> Result<ApiClient> {
        let raw = self.base_url.ok_or_else(|| {
            Error::configuration_with_context(
                "base URL is required",
                ErrorContext::new()
                    .with_field_path("config.base_url")
                    .with_source("client_builder"),
            )
        })?;
        let base_url = require_absolute(&raw, "config.base_url")?;

        let credentials = self.credentials.ok_or_else(|| {
            Error::configuration_with_context(
                "credential supplier is required",
                ErrorContext::new()
                    .with_field_path("config.credentials")
                    .with_source("client_builder"),
            )
        })?;

        let config = ClientConfig {
            base_url,
            credentials,
            on_unauthorized: self.on_unauthorized,
        };
        ApiClient::with_interceptors(config, self.interceptors)
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_base_url() {
        let err = ApiClientBuilder::new()
            .credential_supplier(|| None::<String>)
            .build()
            .unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("config.base_url")
        );
    }

    #[test]
    fn test_build_requires_absolute_base_url() {
        for bad in ["/api", "gw.example.com", "ftp://gw.example.com", ""] {
            let result = ApiClientBuilder::new()
                .base_url(bad)
                .credential_supplier(|| None::<String>)
                .build();
            assert!(
                matches!(result, Err(Error::Configuration { .. })),
                "base URL {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_build_requires_credential_supplier() {
        let err = ApiClientBuilder::new()
            .base_url("https://gw.example.com")
            .build()
            .unwrap_err();
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("config.credentials")
        );
    }

    #[test]
    fn test_build_succeeds_without_network() {
        let client = ApiClientBuilder::new()
            .base_url("http://127.0.0.1:9/api")
            .credential_supplier(|| Some("tok".to_string()))
            .on_unauthorized(|| {})
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:9/api");
        assert_eq!(
            client.interceptor_names(),
            vec!["bearer_auth", "unauthorized_notifier"]
        );
    }

    #[test]
    fn test_config_debug_hides_supplier() {
        let config = ClientConfig::new(
            Url::parse("https://gw.example.com").unwrap(),
            Arc::new(|| Some("secret".to_string())),
        );
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("gw.example.com"));
    }
}
