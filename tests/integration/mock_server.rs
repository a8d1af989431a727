//! Mock gateway setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use reseller_api::{ApiClient, CredentialSupplier};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const META: &str = r#"{"requestId":"req-123","timestamp":"2025-06-01T10:00:00Z"}"#;

/// Test fixture that manages a mock gateway
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

/// Counts 401 notifications delivered to the client's handler.
#[derive(Clone, Default)]
pub struct UnauthorizedCounter(Arc<AtomicUsize>);

impl UnauthorizedCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Client against the mock gateway with a counting 401 handler.
    pub fn client<S>(&self, supplier: S) -> (ApiClient, UnauthorizedCounter)
    where
        S: CredentialSupplier + 'static,
    {
        let counter = UnauthorizedCounter::default();
        let hits = counter.0.clone();
        let client = ApiClient::builder()
            .base_url(&self.base_url)
            .credential_supplier(supplier)
            .on_unauthorized(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .expect("client should build against mock server");
        (client, counter)
    }

    /// JSON response for a request carrying exactly `Authorization: Bearer <token>`.
    pub async fn mock_with_token(&self, method: &str, path: &str, token: &str, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .match_header("authorization", format!("Bearer {}", token).as_str())
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }

    /// JSON response for a request carrying no `Authorization` header at all.
    pub async fn mock_without_token(&self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .match_header("authorization", Matcher::Missing)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }

    /// JSON response for any request to `path`, regardless of headers.
    pub async fn mock_json_response(&self, method: &str, path: &str, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock(method, path)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}

pub fn vm_json(id: &str) -> String {
    format!(
        r#"{{"id":"{id}","vmId":101,"name":"web-{id}","tenantId":"t-1","nodeId":"pve-1","status":"running","type":"qemu","config":{{"cores":2,"memory":2048,"disk":20,"os":"debian","template":"debian-12"}},"ipAddresses":["10.0.0.5"],"createdAt":"2025-06-01T09:00:00Z","updatedAt":"2025-06-01T09:30:00Z"}}"#
    )
}
