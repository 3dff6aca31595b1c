use std::fmt::Debug;

use super::{CallBody, CallHeaders, CallPath, CallQuery, MtdError};
use crate::enumeration::InvalidFieldValue;

crate::validated_enum! {
    /// HTTP methods used by the MTD APIs.
    pub enum RequestMethod("method") {
        /// `GET`
        Get => "GET",
        /// `POST`
        Post => "POST",
        /// `PUT`
        Put => "PUT",
        /// `DELETE`
        Delete => "DELETE",
    }
}

impl From<RequestMethod> for http::Method {
    fn from(method: RequestMethod) -> Self {
        match method {
            RequestMethod::Get => Self::GET,
            RequestMethod::Post => Self::POST,
            RequestMethod::Put => Self::PUT,
            RequestMethod::Delete => Self::DELETE,
        }
    }
}

/// One HMRC endpoint call.
///
/// Implementations are plain data: every field is validated when it is
/// constructed or set, so the methods below only describe the call. The
/// client pipeline ([`ApiCall`](crate::ApiCall)) turns them into a wire request.
pub trait ApiRequest: Debug + Send + Sync {
    /// The HTTP method.
    fn method(&self) -> RequestMethod;

    /// The path template with its bound parameters.
    fn path(&self) -> CallPath;

    /// Query parameters that were explicitly set.
    fn query(&self) -> CallQuery {
        CallQuery::default()
    }

    /// Request-specific headers (test scenario, ...).
    fn headers(&self) -> CallHeaders {
        CallHeaders::default()
    }

    /// The request body, if any.
    fn body(&self) -> Result<Option<CallBody>, MtdError> {
        Ok(None)
    }

    /// Re-checks cross-field rules before the request is fired.
    ///
    /// Field values are already validated on assignment.
    fn validate(&self) -> Result<(), InvalidFieldValue> {
        Ok(())
    }

    /// Whether the endpoint needs a user access token.
    fn requires_auth(&self) -> bool {
        true
    }

    /// The API version for the `Accept` header, `None` for the client default.
    fn api_version(&self) -> Option<&str> {
        None
    }
}
