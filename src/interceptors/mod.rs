//! Request/response interceptors.
//!
//! Every call runs through an explicit, ordered list of steps:
//!
//! 1. `on_request` for each interceptor, in order, against that call's own [`HttpRequest`]
//! 2. transmission
//! 3. `on_response` (any HTTP status) or `on_error` (transport failure), in the same order
//!
//! The client installs [`BearerAuth`] first and [`UnauthorizedNotifier`] last; application
//! interceptors registered on the builder run between them.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use tracing::warn;

use crate::session::{CredentialSupplier, UnauthorizedHandler};
use crate::transport::{HttpRequest, HttpResponse};
use crate::{Error, ErrorContext, Result};

/// Per-call context shared by all interceptors of that call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Client-generated correlation id, also sent as `x-client-request-id`.
    pub request_id: String,
    pub method: Method,
    pub path: String,
}

#[async_trait]
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &str {
        "unnamed"
    }

    /// Decorate the outgoing request. An error aborts the call before transmission.
    async fn on_request(&self, _ctx: &RequestContext, _req: &mut HttpRequest) -> Result<()> {
        Ok(())
    }

    /// Observe a received response, whatever its status.
    async fn on_response(&self, _ctx: &RequestContext, _resp: &HttpResponse) {}

    /// Observe a transport failure.
    async fn on_error(&self, _ctx: &RequestContext, _err: &Error) {}
}

/// Runs interceptors in order around a transmission function.
pub struct InterceptorPipeline {
    pub(crate) interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorPipeline {
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    pub fn with<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn with_shared(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|ic| ic.name()).collect()
    }

    pub async fn execute<F, Fut>(
        &self,
        ctx: &RequestContext,
        mut req: HttpRequest,
        transmit: F,
    ) -> Result<HttpResponse>
    where
        F: FnOnce(HttpRequest) -> Fut,
        Fut: std::future::Future<Output = Result<HttpResponse>>,
    {
        for ic in &self.interceptors {
            ic.on_request(ctx, &mut req).await?;
        }

        match transmit(req).await {
            Ok(resp) => {
                for ic in &self.interceptors {
                    ic.on_response(ctx, &resp).await;
                }
                Ok(resp)
            }
            Err(err) => {
                for ic in &self.interceptors {
                    ic.on_error(ctx, &err).await;
                }
                Err(err)
            }
        }
    }
}

impl Default for InterceptorPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Attaches `Authorization: Bearer <token>` from the credential supplier.
///
/// The supplier is asked exactly once per request. No token, or an empty one, leaves the
/// request without an `Authorization` header.
pub struct BearerAuth {
    supplier: Arc<dyn CredentialSupplier>,
}

impl BearerAuth {
    pub fn new(supplier: Arc<dyn CredentialSupplier>) -> Self {
        Self { supplier }
    }
}

#[async_trait]
impl Interceptor for BearerAuth {
    fn name(&self) -> &str {
        "bearer_auth"
    }

    async fn on_request(&self, _ctx: &RequestContext, req: &mut HttpRequest) -> Result<()> {
        let token = match self.supplier.access_token() {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(()),
        };

        let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            Error::configuration_with_context(
                "access token contains characters not allowed in a header",
                ErrorContext::new()
                    .with_field_path("Authorization")
                    .with_source("bearer_auth"),
            )
        })?;
        value.set_sensitive(true);
        req.headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

/// Notifies the session provider when the gateway answers 401.
pub struct UnauthorizedNotifier {
    handler: Arc<dyn UnauthorizedHandler>,
}

impl UnauthorizedNotifier {
    pub fn new(handler: Arc<dyn UnauthorizedHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl Interceptor for UnauthorizedNotifier {
    fn name(&self) -> &str {
        "unauthorized_notifier"
    }

    async fn on_response(&self, ctx: &RequestContext, resp: &HttpResponse) {
        if resp.status != StatusCode::UNAUTHORIZED {
            return;
        }
        if let Err(e) = self.handler.on_unauthorized() {
            warn!(
                request_id = ctx.request_id.as_str(),
                path = ctx.path.as_str(),
                error = %e,
                "unauthorized handler failed"
            );
        }
    }
}
