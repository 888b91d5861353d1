//! An in-process stand-in for the election backend, served by rocket on an
//! ephemeral local port. It records every request it receives and answers
//! with whatever response the test programmed for that method and path.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::{Method, StatusCode};
use rocket::{
    config::LogLevel,
    fairing::AdHoc,
    get,
    http::Status,
    post,
    request::{FromRequest, Outcome},
    routes,
    serde::json::{serde_json::json, Json, Value},
    tokio::sync::oneshot,
    Request, Shutdown, State,
};

use crate::config::ClientConfig;

/// Everything the mock saw of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    /// Full request path, including the `/api` prefix.
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<String>,
}

#[derive(Default)]
struct MockState {
    responses: HashMap<(String, String), (u16, Value)>,
    requests: Vec<RecordedRequest>,
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<MockState>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Request guard capturing what the client actually put on the wire.
struct Observed {
    method: String,
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Observed {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let headers = req.headers();
        Outcome::Success(Observed {
            method: req.method().as_str().to_string(),
            path: req.uri().path().to_string(),
            authorization: headers.get_one("Authorization").map(str::to_string),
            content_type: headers.get_one("Content-Type").map(str::to_string),
        })
    }
}

/// Trailing slashes are not significant when matching programmed responses.
fn route_key(path: &str) -> String {
    path.trim_end_matches('/').to_string()
}

fn answer(state: &Shared, observed: Observed, body: Option<String>) -> (Status, Json<Value>) {
    let mut state = state.lock();
    let resource = route_key(observed.path.strip_prefix("/api").unwrap_or(&observed.path));
    let response = state
        .responses
        .get(&(observed.method.clone(), resource))
        .cloned();
    state.requests.push(RecordedRequest {
        method: observed.method,
        path: observed.path,
        authorization: observed.authorization,
        content_type: observed.content_type,
        body,
    });

    match response {
        Some((code, body)) => (Status::new(code), Json(body)),
        None => (
            Status::NotFound,
            Json(json!({ "message": "no response programmed" })),
        ),
    }
}

#[get("/<_..>")]
fn get_any(observed: Observed, state: &State<Shared>) -> (Status, Json<Value>) {
    answer(state, observed, None)
}

#[post("/<_..>", data = "<body>")]
fn post_any(observed: Observed, body: String, state: &State<Shared>) -> (Status, Json<Value>) {
    answer(state, observed, Some(body))
}

/// A running mock backend. Shuts down when dropped.
pub struct MockBackend {
    config: ClientConfig,
    shared: Shared,
    shutdown: Shutdown,
}

impl MockBackend {
    pub async fn launch() -> Self {
        // Port 0: rocket binds a free port itself and reports it at liftoff.
        let config = rocket::Config {
            address: Ipv4Addr::LOCALHOST.into(),
            port: 0,
            log_level: LogLevel::Off,
            ..rocket::Config::debug_default()
        };

        let shared = Shared::default();
        let (ready_tx, ready_rx) = oneshot::channel();
        let rocket = rocket::custom(config)
            .mount("/api", routes![get_any, post_any])
            .manage(shared.clone())
            .attach(AdHoc::on_liftoff("Mock ready", move |rocket| {
                let port = rocket.config().port;
                Box::pin(async move {
                    let _ = ready_tx.send(port);
                })
            }))
            .ignite()
            .await
            .expect("mock backend failed to ignite");
        let shutdown = rocket.shutdown();
        rocket::tokio::spawn(rocket.launch());
        let port = ready_rx.await.expect("mock backend failed to launch");

        Self {
            config: ClientConfig::new(format!("http://127.0.0.1:{port}"))
                .expect("mock URL is valid"),
            shared,
            shutdown,
        }
    }

    /// Client configuration pointing at this backend.
    pub fn config(&self) -> ClientConfig {
        self.config.clone()
    }

    /// Answer `method path` (relative to `/api`) with `status` and `body`.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.shared.lock().responses.insert(
            (method.as_str().to_string(), route_key(path)),
            (status.as_u16(), body),
        );
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.lock().requests.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.clone().notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[backend_test]
    async fn each_backend_gets_its_own_port(backend: MockBackend) {
        let other = MockBackend::launch().await;
        assert_ne!(backend.config().base_url(), other.config().base_url());
        assert!(!backend.config().base_url().ends_with(":0"));
        assert!(!other.config().base_url().ends_with(":0"));
    }
}
