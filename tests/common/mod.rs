//! Stub server for integration tests.
//!
//! An axum router on `127.0.0.1:0` that records every request and answers
//! through a handler closure. Streaming replies are sent chunk by chunk and
//! may pause after the first chunk to keep the body open.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use futures_util::stream::{self, StreamExt};
use serde_json::Value as JsonValue;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string
    pub target: String,
    /// Header names lower-cased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn json(&self) -> JsonValue {
        serde_json::from_str(&self.body).unwrap_or(JsonValue::Null)
    }

    /// The `ksql` field of a statement body
    pub fn ksql(&self) -> String {
        self.json()["ksql"].as_str().unwrap_or_default().to_string()
    }
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    body: ReplyBody,
}

#[derive(Debug, Clone)]
enum ReplyBody {
    Fixed(String),
    Chunked {
        chunks: Vec<String>,
        pause_after_first: Option<Duration>,
    },
}

impl Reply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: ReplyBody::Fixed(body.into()),
        }
    }

    /// Streaming body, one chunk per entry
    pub fn stream(chunks: &[&str]) -> Self {
        Self {
            status: 200,
            body: ReplyBody::Chunked {
                chunks: chunks.iter().map(|c| c.to_string()).collect(),
                pause_after_first: None,
            },
        }
    }

    /// Hold the body open for `pause` after sending the first chunk
    pub fn pause_after_first(mut self, pause: Duration) -> Self {
        if let ReplyBody::Chunked {
            pause_after_first, ..
        } = &mut self.body
        {
            *pause_after_first = Some(pause);
        }
        self
    }

    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let content_type = [(CONTENT_TYPE, "application/json")];
        match self.body {
            ReplyBody::Fixed(text) => (status, content_type, text).into_response(),
            ReplyBody::Chunked {
                chunks,
                pause_after_first,
            } => {
                let chunks = stream::iter(chunks.into_iter().enumerate()).then(
                    move |(index, chunk)| async move {
                        if index == 1 {
                            if let Some(pause) = pause_after_first {
                                tokio::time::sleep(pause).await;
                            }
                        }
                        Ok::<_, Infallible>(chunk)
                    },
                );
                (status, content_type, Body::from_stream(chunks)).into_response()
            }
        }
    }
}

type Handler = Arc<dyn Fn(&RecordedRequest) -> Reply + Send + Sync>;

#[derive(Clone)]
struct StubState {
    handler: Handler,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    serve_task: JoinHandle<()>,
}

impl StubServer {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            handler: Arc::new(handler),
            requests: requests.clone(),
        };

        let app = Router::new().fallback(handle).with_state(state);
        let serve_task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
            serve_task,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.serve_task.abort();
    }
}

async fn handle(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = RecordedRequest {
        method: method.to_string(),
        target: uri.to_string(),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).to_string(),
    };
    let reply = (state.handler)(&request);
    state.requests.lock().unwrap().push(request);
    reply.into_response()
}

/// `currentStatus` entity acknowledging `statement` at `sequence`
pub fn current_status(statement: &str, sequence: i64) -> String {
    serde_json::json!([{
        "@type": "currentStatus",
        "statementText": statement,
        "commandId": format!("stream/{}/cmd", sequence),
        "commandStatus": { "status": "SUCCESS", "message": "done" },
        "commandSequenceNumber": sequence,
    }])
    .to_string()
}

/// `sourceDescription` entity with the given readers and writers, each a
/// `(query id, sink)` pair
pub fn source_description(
    name: &str,
    readers: &[(&str, &str)],
    writers: &[(&str, &str)],
) -> String {
    serde_json::json!([{
        "@type": "sourceDescription",
        "statementText": format!("DESCRIBE {};", name),
        "sourceDescription": {
            "name": name,
            "type": "STREAM",
            "readQueries": query_refs(readers),
            "writeQueries": query_refs(writers),
            "fields": [],
            "format": "JSON",
            "topic": name.to_lowercase(),
        }
    }])
    .to_string()
}

fn query_refs(list: &[(&str, &str)]) -> Vec<JsonValue> {
    list.iter()
        .map(|(id, sink)| {
            serde_json::json!({
                "id": id,
                "queryString": format!("CREATE STREAM ... /* {} */", id),
                "sinks": [sink],
            })
        })
        .collect()
}
