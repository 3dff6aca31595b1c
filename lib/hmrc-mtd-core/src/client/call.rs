use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;

use headers::HeaderMapExt;
use http::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use mime::Mime;
use tracing::debug;

use super::oauth2::{AccessToken, OAuthError, TokenRefreshGuard, TokenStore};
use super::{ApiRequest, Environment, MtdError, Transport, WireRequest, WireResponse};

/// Builds the `Accept` media type for an API version, e.g. `application/vnd.hmrc.1.0+json`.
pub(super) fn accept_media_type(version: &str) -> Result<Mime, MtdError> {
    let valid = !version.is_empty()
        && version
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '.');
    if !valid {
        return Err(MtdError::InvalidApiVersion {
            version: version.to_string(),
        });
    }

    format!("application/vnd.hmrc.{version}+json")
        .parse()
        .map_err(|_| MtdError::InvalidApiVersion {
            version: version.to_string(),
        })
}

/// A request bound to a client, ready to be fired.
///
/// Created by [`MtdClient::request`](crate::MtdClient::request). Awaiting the
/// call (or calling [`fire`](Self::fire)) runs, in order:
///
/// 1. the [`TokenRefreshGuard`], when the endpoint needs authorisation,
/// 2. the serialisation into a [`WireRequest`] with the bearer token,
/// 3. the [`Transport`].
///
/// The raw [`WireResponse`] is returned whatever its status.
#[derive(derive_more::Debug)]
pub struct ApiCall<R> {
    request: R,
    environment: Environment,
    transport: Arc<dyn Transport>,
    #[debug(ignore)]
    token_store: TokenStore,
    #[debug(ignore)]
    refresh_guard: Option<TokenRefreshGuard>,
    api_version: String,
}

impl<R> ApiCall<R>
where
    R: ApiRequest,
{
    pub(super) fn new(
        request: R,
        environment: Environment,
        transport: Arc<dyn Transport>,
        token_store: TokenStore,
        refresh_guard: Option<TokenRefreshGuard>,
        api_version: String,
    ) -> Self {
        Self {
            request,
            environment,
            transport,
            token_store,
            refresh_guard,
            api_version,
        }
    }

    /// Sends this call through another transport.
    #[must_use]
    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        self.with_shared_transport(Arc::new(transport))
    }

    /// Sends this call through a shared transport.
    #[must_use]
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Returns the request.
    pub fn request(&self) -> &R {
        &self.request
    }

    /// Serialises the request, with `token` as bearer when provided.
    ///
    /// Only explicitly set query parameters are sent. The `Accept` header
    /// carries the request version, or the client default.
    ///
    /// # Errors
    ///
    /// Fails when the path has unbound parameters or a header value is not legal.
    pub fn to_wire_request(&self, token: Option<&AccessToken>) -> Result<WireRequest, MtdError> {
        let path = self.request.path().resolve()?;
        let mut url = self.environment.join(&path)?;

        let query = self.request.query();
        if !query.is_empty() {
            let query_string = query.to_query_string()?;
            url.set_query(Some(&query_string));
        }

        let version = self.request.api_version().unwrap_or(&self.api_version);
        let accept = accept_media_type(version)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_str(accept.as_ref())?);
        if let Some(token) = token {
            headers.insert(AUTHORIZATION, token.to_bearer_header()?);
        }
        self.request.headers().apply(&mut headers)?;

        let mut wire = WireRequest::new(self.request.method().into(), url);
        if let Some(body) = self.request.body()? {
            headers.typed_insert(body.content_type);
            wire = wire.with_body(body.data);
        }

        Ok(wire.with_headers(headers))
    }

    /// Runs the refresh guard, serialises the request and sends it.
    ///
    /// # Errors
    ///
    /// - [`MtdError::Unauthenticated`] when the endpoint needs a token and none is stored,
    /// - [`MtdError::AuthProvider`] when the expired token could not be refreshed,
    /// - [`MtdError::Transport`] when the endpoint could not be reached.
    pub async fn fire(self) -> Result<WireResponse, MtdError> {
        self.request.validate()?;

        let token = if self.request.requires_auth() {
            Some(self.current_token().await?)
        } else {
            None
        };

        let request = self.to_wire_request(token.as_ref())?;
        debug!(?request, "firing...");
        let response = self.transport.send(request).await?;
        debug!(status = %response.status(), "...received");

        Ok(response)
    }

    async fn current_token(&self) -> Result<AccessToken, MtdError> {
        let token = match &self.refresh_guard {
            Some(guard) => guard.ensure_fresh().await?,
            None => self.token_store.try_get().await,
        };

        match token {
            Some(token) if self.refresh_guard.is_none() && token.has_expired() => {
                Err(OAuthError::TokenExpired.into())
            }
            Some(token) => Ok(token),
            None => Err(MtdError::Unauthenticated {
                path: self.request.path().template().to_string(),
            }),
        }
    }
}

impl<R> IntoFuture for ApiCall<R>
where
    R: ApiRequest + 'static,
{
    type Output = Result<WireResponse, MtdError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.fire())
    }
}
