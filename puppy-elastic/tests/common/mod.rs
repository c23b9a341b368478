//! Stub search engine for integration tests.
//!
//! The stub runs an Axum server on its own thread and runtime, so tests that
//! block a runtime thread (the sync bridge) cannot starve it.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::Router;
use parking_lot::Mutex;
use puppy_elastic::{ClientConfig, ElasticClient, ElasticMapped, EntityMapping, MappingResolver};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: f64,
}

impl ElasticMapped for Product {
    fn entity_mapping() -> Option<EntityMapping> {
        Some(EntityMapping::new("products", "product"))
    }
}

/// A type without a mapping
#[derive(Debug, Deserialize)]
pub struct Unmapped {}

impl ElasticMapped for Unmapped {}

/// One request as seen by the stub
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path_and_query: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Responder = dyn Fn(&Recorded) -> Reply + Send + Sync;

struct StubState {
    requests: Mutex<Vec<Recorded>>,
    responder: Box<Responder>,
}

pub struct StubEngine {
    pub base_url: String,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl StubEngine {
    pub fn start(responder: impl Fn(&Recorded) -> Reply + Send + Sync + 'static) -> Self {
        let state = Arc::new(StubState {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        });

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let router = Router::new()
            .fallback(handle)
            .with_state(state.clone());

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, router)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .unwrap();
            });
        });

        Self {
            base_url,
            state,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::with_url(self.base_url.clone())
    }

    pub fn client(&self) -> ElasticClient {
        ElasticClient::with_resolver(self.config(), Arc::new(MappingResolver::new())).unwrap()
    }
}

impl Drop for StubEngine {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, String) {
    let recorded = Recorded {
        method,
        path_and_query: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    let reply = (state.responder)(&recorded);
    state.requests.lock().push(recorded);

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }
    (
        StatusCode::from_u16(reply.status).unwrap(),
        reply.body,
    )
}

/// A search response with the given hits and optional scroll id
pub fn search_page(hits: &[(&str, &str, f64)], scroll_id: Option<&str>) -> serde_json::Value {
    let hits: Vec<serde_json::Value> = hits
        .iter()
        .map(|(id, name, price)| {
            serde_json::json!({
                "_index": "products",
                "_type": "product",
                "_id": id,
                "_score": 1.0,
                "_source": {"name": name, "price": price}
            })
        })
        .collect();
    let mut page = serde_json::json!({
        "took": 1,
        "timed_out": false,
        "_shards": {"total": 1, "successful": 1, "failed": 0},
        "hits": {"total": hits.len(), "max_score": 1.0, "hits": hits}
    });
    if let Some(id) = scroll_id {
        page["_scroll_id"] = serde_json::Value::from(id);
    }
    page
}
