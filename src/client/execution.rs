//! Request execution: dispatch, transmission, and response classification.

use crate::interceptors::RequestContext;
use crate::transport::{HttpRequest, HttpResponse};
use crate::types::{ApiError, Envelope, PageRequest, PaginatedEnvelope};
use crate::{Error, ErrorContext, Result};
use reqwest::header::HeaderValue;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::core::ApiClient;

const HEADER_CLIENT_REQUEST_ID: &str = "x-client-request-id";

impl ApiClient {
    /// Send one request and return the response if its status is 2xx.
    ///
    /// Non-2xx statuses become [`Error::Remote`] carrying the raw body (and the parsed
    /// [`ApiError`] when it matches). A 401 additionally notifies the unauthorized handler, once,
    /// before the error is returned. Nothing is retried.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse> {
        let request_id = Uuid::new_v4().to_string();
        let ctx = RequestContext {
            request_id: request_id.clone(),
            method: method.clone(),
            path: path.to_string(),
        };

        let url = self.transport.resolve(path)?;
        let mut request = HttpRequest::new(method, url);
        request.query = query.to_vec();
        request.body = body;
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            request.headers.insert(HEADER_CLIENT_REQUEST_ID, value);
        }

        debug!(
            method = ctx.method.as_str(),
            path = path,
            request_id = request_id.as_str(),
            "dispatching request"
        );

        let start = std::time::Instant::now();
        let transport = &self.transport;
        let outcome = self
            .pipeline
            .execute(&ctx, request, |req| async move {
                transport.execute(req).await.map_err(Error::from)
            })
            .await;

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                info!(
                    method = ctx.method.as_str(),
                    path = path,
                    request_id = request_id.as_str(),
                    timeout = err.is_timeout(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    error = %err,
                    "request failed before a response was received"
                );
                return Err(err);
            }
        };

        let status = response.status.as_u16();
        if !response.status.is_success() {
            let body = response.text();
            let api_error = ApiError::from_body(&body);
            info!(
                http_status = status,
                error_code = api_error.as_ref().map(|e| e.code.as_str()).unwrap_or(""),
                method = ctx.method.as_str(),
                path = path,
                request_id = request_id.as_str(),
                duration_ms = start.elapsed().as_millis() as u64,
                "request failed"
            );
            return Err(Error::Remote {
                status,
                api_error,
                body,
                raw_body: response.body,
                request_id,
            });
        }

        debug!(
            http_status = status,
            path = path,
            request_id = request_id.as_str(),
            duration_ms = start.elapsed().as_millis() as u64,
            "request succeeded"
        );
        Ok(response)
    }

    /// Send a request and decode the 2xx body into `T`.
    ///
    /// The body is decoded exactly as received; envelopes are not stripped. An empty body
    /// decodes as JSON `null` (so `()` and `Option<_>` accept 204 responses).
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body.map(serde_json::to_value).transpose()?;
        let response = self.execute(method, path, query, body).await?;
        decode_body(path, &response)
    }

    /// GET a path and return the body as raw JSON, untouched.
    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        self.get(path).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send::<(), T>(Method::GET, path, &[], None).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        self.send::<(), T>(Method::GET, path, query, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send::<(), T>(Method::DELETE, path, &[], None).await
    }

    /// GET a single resource wrapped in the standard envelope.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>> {
        self.get(path).await
    }

    /// GET one page of a collection.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        page: PageRequest,
    ) -> Result<PaginatedEnvelope<T>> {
        self.get_with_query(path, &page.to_query()).await
    }

    /// POST a new resource and return the created one.
    pub async fn create<B, T>(&self, path: &str, body: &B) -> Result<Envelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(path, body).await
    }
}

fn decode_body<T: DeserializeOwned>(path: &str, response: &HttpResponse) -> Result<T> {
    let bytes: &[u8] = if response.body.is_empty() {
        b"null"
    } else {
        &response.body
    };
    serde_json::from_slice(bytes).map_err(|e| {
        Error::decode_with_context(
            "response body does not match the expected shape",
            ErrorContext::new()
                .with_field_path(path)
                .with_details(e.to_string())
                .with_source("response_decode"),
        )
    })
}
