use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::ClientConfig,
    credentials::TokenStore,
    error::Result,
    headers::build_headers,
    logging::{log_request, log_response, logged, RequestId},
};

pub mod election;
pub mod student;

pub use election::Elections;
pub use student::Students;

/// An authenticated handle on the backend API.
///
/// Cheap to clone; clones share the connection pool and the token store.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: Arc<ClientConfig>,
    store: Arc<dyn TokenStore>,
}

impl Debug for ApiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig, store: impl TokenStore + 'static) -> Self {
        Self::with_http_client(Client::new(), config, store)
    }

    /// Use a preconfigured `reqwest` client, e.g. one with a proxy.
    pub fn with_http_client(
        http: Client,
        config: ClientConfig,
        store: impl TokenStore + 'static,
    ) -> Self {
        Self {
            http,
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Election operations.
    pub fn elections(&self) -> Elections<'_> {
        Elections::new(self)
    }

    /// Student operations.
    pub fn students(&self) -> Students<'_> {
        Students::new(self)
    }

    pub(crate) async fn get<T>(&self, operation: &'static str, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.call::<(), T>(operation, Method::GET, path, None).await
    }

    pub(crate) async fn post<B, T>(&self, operation: &'static str, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(operation, Method::POST, path, Some(body)).await
    }

    /// Perform one API call. Any failure is logged once and returned as-is;
    /// nothing is retried.
    async fn call<B, T>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let id = RequestId::next();
        logged(id, operation, self.exchange(id, operation, method, path, body)).await
    }

    /// Exactly one authenticated request/response exchange, decoding the
    /// JSON body of a successful response.
    async fn exchange<B, T>(
        &self,
        id: RequestId,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        // Credentials first: without them no request is sent at all.
        let headers = build_headers(self.store.as_ref())?;
        let url = self.config.api_url(path);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .headers(headers.into_header_map());
        if let Some(body) = body {
            request = request.json(body);
        }

        log_request(id, &method, &url);
        let response = request.send().await?;
        log_response(id, response.status(), operation);

        Ok(response.error_for_status()?.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::credentials::{AuthenticationError, MemoryStore, AUTH_TOKEN_KEY};
    use crate::error::Error;
    use crate::mock::MockBackend;

    #[backend_test(token)]
    async fn get_sends_bearer_and_json_headers(backend: MockBackend, client: ApiClient) {
        backend.respond(Method::GET, "/ping", StatusCode::OK, json!({ "pong": true }));

        let body: serde_json::Value = client.get("ping", "/ping").await.unwrap();
        assert_eq!(body, json!({ "pong": true }));

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].path, "/api/ping");
        assert_eq!(
            requests[0].authorization.as_deref(),
            Some("Bearer abc123")
        );
        assert_eq!(
            requests[0].content_type.as_deref(),
            Some("application/json")
        );
    }

    #[backend_test]
    async fn unauthenticated_calls_never_reach_the_network(backend: MockBackend, client: ApiClient) {
        let err = client
            .get::<serde_json::Value>("ping", "/ping")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Auth(AuthenticationError::NotFound { .. })
        ));
        assert!(err.is_unauthenticated());
        assert!(backend.requests().is_empty());
    }

    #[backend_test(token)]
    async fn logout_is_seen_by_the_next_call(
        backend: MockBackend,
        client: ApiClient,
        store: MemoryStore,
    ) {
        backend.respond(Method::GET, "/ping", StatusCode::OK, json!(null));

        client.get::<serde_json::Value>("ping", "/ping").await.unwrap();
        store.remove(AUTH_TOKEN_KEY);
        assert!(client
            .get::<serde_json::Value>("ping", "/ping")
            .await
            .unwrap_err()
            .is_unauthenticated());

        store.set(AUTH_TOKEN_KEY, "fresh");
        client.get::<serde_json::Value>("ping", "/ping").await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].authorization.as_deref(), Some("Bearer fresh"));
    }

    #[backend_test(token)]
    async fn undecodable_body_is_a_decode_error(backend: MockBackend, client: ApiClient) {
        backend.respond(Method::GET, "/ping", StatusCode::OK, json!("not a number"));

        let err = client.get::<u32>("ping", "/ping").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "{err:?}");
    }

    #[backend_test(token)]
    async fn unreachable_backend_is_a_network_error(backend: MockBackend, store: MemoryStore) {
        // Nothing listens on the discard port.
        let config = ClientConfig::new("http://127.0.0.1:9").unwrap();
        let client = ApiClient::new(config, store);

        let err = client
            .get::<serde_json::Value>("ping", "/ping")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)), "{err:?}");
        assert_eq!(err.status(), None);
        assert!(backend.requests().is_empty());
    }

    #[test]
    fn clients_share_the_store() {
        let store = MemoryStore::default();
        let client = ApiClient::new(
            ClientConfig::new("http://localhost").unwrap(),
            Arc::new(store.clone()),
        );
        let clone = client.clone();
        store.set(AUTH_TOKEN_KEY, "abc123");
        assert!(build_headers(clone.store.as_ref()).is_ok());
        assert!(format!("{client:?}").contains("http://localhost"));
    }
}
