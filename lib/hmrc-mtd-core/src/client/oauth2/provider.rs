//! OAuth2 provider for the HMRC identity endpoint.

use std::fmt;
use std::sync::Arc;

use headers::{ContentType, HeaderMapExt};
use http::header::{ACCEPT, HeaderMap, HeaderValue};
use http::{Method, StatusCode};
use oauth2::basic::{BasicErrorResponse, BasicTokenResponse};
use oauth2::{CsrfToken, TokenResponse as _};
use tracing::{debug, info, warn};
use url::Url;

use super::config::OAuthConfig;
use super::error::OAuthError;
use super::token::AccessToken;
use crate::client::{CallBody, Transport, WireRequest, WireResponse};

/// Exchanges authorization codes and refresh tokens for access tokens.
///
/// The provider never touches the [`TokenStore`](super::TokenStore): storing
/// the returned token is the caller's job (or the refresh guard's).
#[derive(Clone)]
pub struct OAuthProvider {
    config: Arc<OAuthConfig>,
    transport: Arc<dyn Transport>,
}

impl OAuthProvider {
    /// Creates a provider sending its token requests through `transport`.
    pub fn new(config: OAuthConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Builds the login redirect URL with a random CSRF `state`.
    ///
    /// The returned state must be kept by the caller and compared with the
    /// one echoed back on the callback.
    pub fn authorization_url(&self) -> Result<(Url, CsrfToken), OAuthError> {
        let state = CsrfToken::new_random();
        let url = self.authorization_url_with_state(&state)?;
        Ok((url, state))
    }

    /// Builds the login redirect URL with a caller-chosen `state`.
    pub fn authorization_url_with_state(&self, state: &CsrfToken) -> Result<Url, OAuthError> {
        let credentials = self.config.credentials();
        let scope = self.config.scopes().collect::<Vec<_>>().join(" ");

        let mut url = self.config.authorize_url()?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", credentials.client_id())
            .append_pair("scope", &scope)
            .append_pair("state", state.secret())
            .append_pair("redirect_uri", credentials.callback_uri());
        Ok(url)
    }

    /// Exchanges the authorization code received on the callback for a token.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TokenAcquisitionFailed`] when the code is rejected,
    /// and a network, availability or response error otherwise.
    pub async fn exchange_authorization_code(&self, code: &str) -> Result<AccessToken, OAuthError> {
        info!("exchanging authorization code");
        let form = [("grant_type", "authorization_code"), ("code", code)];
        self.request_token(&form, |reason| OAuthError::TokenAcquisitionFailed { reason })
            .await
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// When the identity endpoint does not rotate the refresh token, the one
    /// used for the exchange is kept on the returned token.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TokenRefreshFailed`] when the refresh token is rejected,
    /// and a network, availability or response error otherwise.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, OAuthError> {
        info!("refreshing access token");
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let token = self
            .request_token(&form, |reason| OAuthError::TokenRefreshFailed { reason })
            .await?;

        if token.refresh_token().is_some() {
            Ok(token)
        } else {
            Ok(token.with_refresh_token(refresh_token))
        }
    }

    async fn request_token(
        &self,
        grant: &[(&str, &str)],
        rejected: fn(String) -> OAuthError,
    ) -> Result<AccessToken, OAuthError> {
        let request = self.token_request(grant)?;
        debug!(url = %request.url(), "calling identity endpoint");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| OAuthError::NetworkError {
                reason: err.to_string(),
            })?;

        let status = response.status();
        if status.is_server_error() {
            warn!(%status, "identity endpoint unavailable");
            return Err(OAuthError::IdentityUnavailable {
                status: status.as_u16(),
                reason: response.as_text(),
            });
        }
        if !status.is_success() {
            warn!(%status, "identity endpoint rejected the grant");
            return Err(rejected(Self::rejection_reason(status, &response)));
        }

        let token_response: BasicTokenResponse = serde_json::from_slice(response.body())
            .map_err(|err| OAuthError::InvalidTokenResponse {
                reason: err.to_string(),
            })?;
        Ok(Self::convert_token_response(&token_response))
    }

    fn token_request(&self, grant: &[(&str, &str)]) -> Result<WireRequest, OAuthError> {
        let credentials = self.config.credentials();
        let mut form = grant.to_vec();
        form.extend([
            ("client_id", credentials.client_id()),
            ("client_secret", credentials.client_secret().as_str()),
            ("redirect_uri", credentials.callback_uri()),
        ]);

        let body = CallBody::form(&form).map_err(|err| OAuthError::ConfigurationError {
            reason: err.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.typed_insert(ContentType::form_url_encoded());
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let request = WireRequest::new(Method::POST, self.config.token_url()?)
            .with_headers(headers)
            .with_body(body.data);
        Ok(request)
    }

    fn rejection_reason(status: StatusCode, response: &WireResponse) -> String {
        match serde_json::from_slice::<BasicErrorResponse>(response.body()) {
            Ok(error) => error.to_string(),
            Err(_) if response.body().is_empty() => status.to_string(),
            Err(_) => response.as_text(),
        }
    }

    fn convert_token_response(response: &BasicTokenResponse) -> AccessToken {
        let access_token = response.access_token().secret().clone();
        let token = match response.expires_in() {
            Some(duration) => AccessToken::expiring_in(access_token, duration),
            None => AccessToken::new(access_token),
        };
        match response.refresh_token() {
            Some(refresh_token) => token.with_refresh_token(refresh_token.secret().clone()),
            None => token,
        }
    }
}

impl fmt::Debug for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthProvider")
            .field("config", &self.config)
            .field("transport", &self.transport)
            .finish()
    }
}
