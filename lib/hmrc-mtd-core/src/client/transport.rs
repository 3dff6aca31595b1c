use std::fmt;
use std::future::Future;
use std::pin::Pin;

use http::header::{AsHeaderName, HeaderMap};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::MtdError;

const BODY_MAX_LENGTH: usize = 1024;

/// The future returned by [`Transport::send`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<WireResponse, TransportError>> + Send + 'a>>;

/// The HTTP-sending capability used to fire requests.
///
/// The default is [`ReqwestTransport`]; tests inject
/// [`RecordingTransport`](crate::test_client::RecordingTransport).
pub trait Transport: fmt::Debug + Send + Sync {
    /// Sends a wire request and returns the raw response.
    fn send(&self, request: WireRequest) -> TransportFuture<'_>;
}

/// Failure reaching an endpoint.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum TransportError {
    /// Error raised by the reqwest client (connection, TLS, body read, ...).
    Reqwest(reqwest::Error),

    /// Error raised by another transport implementation.
    #[display("Transport failure: {message}")]
    #[from(skip)]
    Other {
        /// Description of the failure.
        message: String,
    },
}

impl TransportError {
    /// Creates an error for a custom transport.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// A fully serialised HTTP request.
#[derive(Clone)]
pub struct WireRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl WireRequest {
    /// Creates a wire request without headers and body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Sets the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the full URL, query included.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the URL path.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Returns the raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    /// Returns the decoded query pairs, in order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url.query_pairs().into_owned().collect()
    }

    /// Returns the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as text, if present and visible ASCII.
    pub fn header(&self, name: impl AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns the body bytes.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Returns the body as UTF-8 text.
    pub fn body_text(&self) -> Option<&str> {
        self.body().and_then(|body| std::str::from_utf8(body).ok())
    }

    fn into_reqwest(self) -> reqwest::Request {
        let mut request = reqwest::Request::new(self.method, self.url);
        *request.headers_mut() = self.headers;
        if let Some(body) = self.body {
            *request.body_mut() = Some(reqwest::Body::from(body));
        }
        request
    }
}

impl fmt::Debug for WireRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("body_length", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

/// A raw HTTP response.
///
/// Interpreting the body is left to the caller: [`as_text`](Self::as_text),
/// [`as_json`](Self::as_json) and [`error_for_status`](Self::error_for_status)
/// cover the common cases.
#[derive(Debug, Clone)]
pub struct WireResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl WireResponse {
    /// Creates a response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Creates a JSON response.
    pub fn json(status: StatusCode, body: &serde_json::Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        Self::new(status, headers, body.to_string())
    }

    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(Self::new(status, headers, body.to_vec()))
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialises the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`MtdError::JsonError`] with the path of the failing field.
    pub fn as_json<T>(&self) -> Result<T, MtdError>
    where
        T: DeserializeOwned,
    {
        let deserializer = &mut serde_json::Deserializer::from_slice(&self.body);
        serde_path_to_error::deserialize(deserializer).map_err(|err| {
            let path = err.path().to_string();
            let body = self.as_text();
            warn!(%path, "failed to deserialize response body");
            MtdError::JsonError {
                path,
                error: err.into_inner(),
                body,
            }
        })
    }

    /// Fails with [`MtdError::UnexpectedStatusCode`] unless the status is 2xx.
    pub fn error_for_status(self) -> Result<Self, MtdError> {
        if self.status.is_success() {
            return Ok(self);
        }

        let text = self.as_text();
        let body = if text.len() > BODY_MAX_LENGTH {
            let mut cut = BODY_MAX_LENGTH;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}... (truncated)", &text[..cut])
        } else {
            text
        };
        Err(MtdError::UnexpectedStatusCode {
            status_code: self.status.as_u16(),
            body,
        })
    }
}

/// The production transport, backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default reqwest client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport from a configured reqwest client (proxy, timeouts, TLS, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: WireRequest) -> TransportFuture<'_> {
        Box::pin(async move {
            let request = request.into_reqwest();
            debug!(?request, "sending...");
            let response = self.client.execute(request).await?;
            debug!(?response, "...receiving");
            let response = WireResponse::from_reqwest(response).await?;
            Ok(response)
        })
    }
}
