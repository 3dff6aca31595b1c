//! In-memory transport for testing code built on this crate.
//!
//! [`RecordingTransport`] replays scripted responses in order and records
//! every [`WireRequest`] it receives, so a test can assert on exactly what
//! would have gone over the wire, identity endpoint calls included.
//!
//! # Example
//!
//! ```rust
//! use hmrc_mtd_core::hello::HelloWorldRequest;
//! use hmrc_mtd_core::test_client::RecordingTransport;
//! use hmrc_mtd_core::MtdClient;
//! use http::StatusCode;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = RecordingTransport::new();
//! transport.respond_json(StatusCode::OK, serde_json::json!({ "message": "Hello World" }));
//!
//! let client = MtdClient::builder().with_transport(transport.clone()).build()?;
//! let response = client.request(HelloWorldRequest::new()).await?;
//!
//! assert_eq!(response.status(), StatusCode::OK);
//! let request = transport.last_request().expect("one request");
//! assert_eq!(request.path(), "/hello/world");
//! assert_eq!(request.header("accept"), Some("application/vnd.hmrc.1.0+json"));
//! # Ok(())
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use http::StatusCode;
use tracing::debug;

use crate::client::{Transport, TransportError, TransportFuture, WireRequest, WireResponse};

#[derive(Debug, Default)]
struct Recording {
    responses: VecDeque<Result<WireResponse, String>>,
    requests: Vec<WireRequest>,
}

/// A [`Transport`] replaying scripted responses and recording requests.
///
/// Clones share the same script and history: keep one clone in the test and
/// hand the other to the client.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    recording: Arc<Mutex<Recording>>,
}

impl RecordingTransport {
    /// Creates a transport with no scripted response.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.recording.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a response.
    pub fn push_response(&self, response: WireResponse) {
        self.lock().responses.push_back(Ok(response));
    }

    /// Queues a JSON response.
    pub fn respond_json(&self, status: StatusCode, body: serde_json::Value) {
        self.push_response(WireResponse::json(status, &body));
    }

    /// Queues a transport failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.lock().responses.push_back(Err(message.into()));
    }

    /// Returns the number of responses not consumed yet.
    pub fn pending_responses(&self) -> usize {
        self.lock().responses.len()
    }

    /// Returns every request received so far, in order.
    pub fn requests(&self) -> Vec<WireRequest> {
        self.lock().requests.clone()
    }

    /// Returns the number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Returns the last request received.
    pub fn last_request(&self) -> Option<WireRequest> {
        self.lock().requests.last().cloned()
    }

    /// Forgets recorded requests and pending responses.
    pub fn reset(&self) {
        let mut recording = self.lock();
        recording.requests.clear();
        recording.responses.clear();
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: WireRequest) -> TransportFuture<'_> {
        let next = {
            let mut recording = self.lock();
            debug!(method = %request.method(), url = %request.url(), "recording request");
            recording.requests.push(request);
            recording.responses.pop_front()
        };

        Box::pin(async move {
            match next {
                Some(Ok(response)) => Ok(response),
                Some(Err(message)) => Err(TransportError::other(message)),
                None => Err(TransportError::other("no scripted response left")),
            }
        })
    }
}
