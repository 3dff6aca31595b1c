use std::sync::Arc;

mod auth;
pub use self::auth::SecureString;

mod builder;
pub use self::builder::{DEFAULT_API_VERSION, MtdClientBuilder};

mod call;
pub use self::call::ApiCall;

mod environment;
pub use self::environment::Environment;

mod error;
pub use self::error::MtdError;

pub mod oauth2;
use self::oauth2::{OAuthProvider, TokenRefreshGuard, TokenStore};

mod parameters;
pub use self::parameters::{CallBody, CallHeaders, CallPath, CallQuery, GOV_TEST_SCENARIO};

mod request;
pub use self::request::{ApiRequest, RequestMethod};

mod transport;
pub use self::transport::{
    ReqwestTransport, Transport, TransportError, TransportFuture, WireRequest, WireResponse,
};

/// Client for the HMRC Making Tax Digital APIs.
///
/// Holds what every request of a session shares: the [`Environment`], the
/// [`Transport`], the [`TokenStore`] and, when OAuth is configured, the
/// [`TokenRefreshGuard`]. Cloning the client shares all of them.
///
/// Use [`MtdClient::builder`] to create instances.
#[derive(Debug, Clone)]
pub struct MtdClient {
    pub(super) environment: Environment,
    pub(super) transport: Arc<dyn Transport>,
    pub(super) token_store: TokenStore,
    pub(super) refresh_guard: Option<TokenRefreshGuard>,
    pub(super) api_version: String,
}

impl MtdClient {
    /// Creates a builder.
    pub fn builder() -> MtdClientBuilder {
        MtdClientBuilder::default()
    }

    /// Returns the environment.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Returns the default API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Returns the token store shared by every request.
    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    /// Returns the refresh guard, when OAuth is configured.
    pub fn refresh_guard(&self) -> Option<&TokenRefreshGuard> {
        self.refresh_guard.as_ref()
    }

    /// Returns the OAuth provider, when OAuth is configured.
    pub fn oauth_provider(&self) -> Option<&OAuthProvider> {
        self.refresh_guard.as_ref().map(TokenRefreshGuard::provider)
    }

    /// Binds a request to this client.
    ///
    /// The returned [`ApiCall`] can be awaited directly, or given another
    /// transport first with [`ApiCall::with_transport`].
    pub fn request<R>(&self, request: R) -> ApiCall<R>
    where
        R: ApiRequest,
    {
        ApiCall::new(
            request,
            self.environment.clone(),
            Arc::clone(&self.transport),
            self.token_store.clone(),
            self.refresh_guard.clone(),
            self.api_version.clone(),
        )
    }

    /// Fires a request and returns the raw response.
    ///
    /// Shorthand for `client.request(request).fire().await`.
    pub async fn fire<R>(&self, request: R) -> Result<WireResponse, MtdError>
    where
        R: ApiRequest,
    {
        self.request(request).fire().await
    }
}
