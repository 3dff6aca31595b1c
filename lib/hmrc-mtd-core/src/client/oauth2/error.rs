//! Identity endpoint error types.

use std::fmt;

/// Errors that can occur while talking to the HMRC identity endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthError {
    /// An identity URL (callback, authorize, token) is invalid.
    InvalidEndpoint {
        /// The invalid URL that was provided.
        url: String,
        /// Description of why the URL is invalid.
        reason: String,
    },

    /// Exchanging an authorization code failed.
    TokenAcquisitionFailed {
        /// Description of the failure.
        reason: String,
    },

    /// Exchanging a refresh token failed.
    TokenRefreshFailed {
        /// Description of the failure.
        reason: String,
    },

    /// The stored token has expired and cannot be refreshed here.
    TokenExpired,

    /// The stored token has expired and carries no refresh token.
    MissingRefreshToken,

    /// The identity endpoint answered with a server error.
    IdentityUnavailable {
        /// HTTP status returned by the identity endpoint.
        status: u16,
        /// Response body, or a description of it.
        reason: String,
    },

    /// The identity endpoint returned a body that is not a token response.
    InvalidTokenResponse {
        /// Description of what was invalid.
        reason: String,
    },

    /// Network error during the token request.
    NetworkError {
        /// Description of the network error.
        reason: String,
    },

    /// Configuration error.
    ConfigurationError {
        /// Description of the configuration issue.
        reason: String,
    },
}

impl OAuthError {
    /// Returns `true` for transient failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::IdentityUnavailable { .. }
        )
    }
}

impl std::error::Error for OAuthError {}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint { url, reason } => {
                write!(f, "Invalid identity URL '{url}': {reason}")
            }
            Self::TokenAcquisitionFailed { reason } => {
                write!(f, "Authorization code exchange failed: {reason}")
            }
            Self::TokenRefreshFailed { reason } => {
                write!(f, "Token refresh failed: {reason}")
            }
            Self::TokenExpired => {
                write!(
                    f,
                    "Access token has expired and no OAuth provider is configured to refresh it"
                )
            }
            Self::MissingRefreshToken => {
                write!(f, "Access token has expired and no refresh token is available")
            }
            Self::IdentityUnavailable { status, reason } => {
                write!(f, "Identity endpoint unavailable ({status}): {reason}")
            }
            Self::InvalidTokenResponse { reason } => {
                write!(f, "Invalid OAuth2 token response: {reason}")
            }
            Self::NetworkError { reason } => {
                write!(f, "Network error during OAuth2 request: {reason}")
            }
            Self::ConfigurationError { reason } => {
                write!(f, "OAuth2 configuration error: {reason}")
            }
        }
    }
}
