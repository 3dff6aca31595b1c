use std::fmt::Debug;

use super::oauth2::OAuthError;
use super::transport::TransportError;
use crate::enumeration::InvalidFieldValue;

/// Errors that can occur when building or firing an API request.
///
/// Variants are grouped by how the caller should react:
/// fix the input ([`InvalidFieldValue`](Self::InvalidFieldValue)),
/// authenticate again ([`NoToken`](Self::NoToken), [`Unauthenticated`](Self::Unauthenticated),
/// [`AuthProvider`](Self::AuthProvider)) or retry later ([`Transport`](Self::Transport)).
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum MtdError {
    /// A request field was given an illegal value.
    ///
    /// Raised at construction or setter time, never by `fire`.
    InvalidFieldValue(InvalidFieldValue),

    /// The token store holds no access token.
    #[display("No access token is stored")]
    #[from(skip)]
    NoToken,

    /// A request that needs authorisation was fired before any token was stored.
    #[display("Request to '{path}' requires an access token: authenticate first")]
    #[from(skip)]
    Unauthenticated {
        /// Path template of the rejected request.
        path: String,
    },

    /// The identity endpoint failed while acquiring or refreshing a token.
    AuthProvider(OAuthError),

    /// The resource endpoint could not be reached.
    Transport(TransportError),

    /// URL parsing error when joining the environment base URL and the request path.
    UrlError(url::ParseError),

    /// Invalid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// JSON serialization error for request bodies.
    JsonValueError(serde_json::Error),

    /// Query parameter serialization error.
    QuerySerializationError(serde_urlencoded::ser::Error),

    /// The API version cannot be expressed as an `Accept` media type.
    #[display("Invalid API version '{version}'")]
    #[from(skip)]
    InvalidApiVersion {
        /// The rejected version.
        version: String,
    },

    /// Bearer token contains characters that are not legal in a header.
    #[display("Bearer token contains invalid characters: {message}")]
    #[from(skip)]
    InvalidBearerToken {
        /// Description of the invalid characters.
        message: String,
    },

    /// Path template contains unresolved parameters.
    #[display("Path '{path}' is missing required arguments: {missings:?}")]
    #[from(skip)]
    PathUnresolved {
        /// The path template that couldn't be resolved.
        path: String,
        /// List of missing parameter names.
        missings: Vec<String>,
    },

    /// A path argument would be read as a `.` or `..` segment.
    #[display("Path argument '{name}' cannot be '{value}'")]
    #[from(skip)]
    InvalidPathArgument {
        /// Name of the parameter.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// JSON response deserialization failure.
    #[display("Failed to deserialize JSON at '{path}': {error}\n{body}")]
    #[from(skip)]
    JsonError {
        /// Location of the failure inside the document.
        path: String,
        /// The underlying JSON parsing error.
        error: serde_json::Error,
        /// The response body that failed to parse.
        body: String,
    },

    /// The endpoint answered with a non-success status.
    #[display("Unexpected status code {status_code}: {body}")]
    #[from(skip)]
    UnexpectedStatusCode {
        /// The unexpected HTTP status code received.
        status_code: u16,
        /// The response body for debugging.
        body: String,
    },
}

impl MtdError {
    /// Returns `true` when the caller has to go through the OAuth login again.
    pub fn requires_authentication(&self) -> bool {
        match self {
            Self::NoToken | Self::Unauthenticated { .. } => true,
            Self::AuthProvider(error) => !error.is_retryable(),
            _ => false,
        }
    }
}
