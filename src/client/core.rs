use crate::client::builder::{ApiClientBuilder, ClientConfig};
use crate::config::require_absolute;
use crate::interceptors::{BearerAuth, Interceptor, InterceptorPipeline, UnauthorizedNotifier};
use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;
use url::Url;

/// Authenticated client for the reseller gateway.
///
/// Holds no per-request state: every call builds its own request, pulls its own credential, and
/// runs through the same immutable interceptor pipeline. Clones share the underlying connection
/// pool.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) pipeline: Arc<InterceptorPipeline>,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Construct a client from a ready configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_interceptors(config, Vec::new())
    }

    pub(crate) fn with_interceptors(
        config: ClientConfig,
        extra: Vec<Arc<dyn Interceptor>>,
    ) -> Result<Self> {
        require_absolute(config.base_url.as_str(), "config.base_url")?;

        let mut pipeline =
            InterceptorPipeline::new().with(BearerAuth::new(config.credentials.clone()));
        for interceptor in extra {
            pipeline = pipeline.with_shared(interceptor);
        }
        if let Some(handler) = &config.on_unauthorized {
            pipeline = pipeline.with(UnauthorizedNotifier::new(handler.clone()));
        }

        let transport = Arc::new(HttpTransport::new(config.base_url.clone())?);

        Ok(Self {
            config: Arc::new(config),
            transport,
            pipeline: Arc::new(pipeline),
        })
    }

    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Interceptor names in execution order.
    pub fn interceptor_names(&self) -> Vec<&str> {
        self.pipeline.names()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("interceptors", &self.pipeline.names())
            .finish()
    }
}
