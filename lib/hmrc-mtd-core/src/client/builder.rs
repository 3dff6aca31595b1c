use std::sync::Arc;

use tracing::debug;

use super::call::accept_media_type;
use super::oauth2::{OAuthConfig, OAuthProvider, TokenRefreshGuard, TokenStore};
use super::{Environment, MtdClient, MtdError, ReqwestTransport, Transport};

/// API version sent in the `Accept` header when a request does not pick one.
pub const DEFAULT_API_VERSION: &str = "1.0";

/// Builder for [`MtdClient`].
///
/// ```rust
/// use hmrc_mtd_core::{Environment, MtdClient};
/// use hmrc_mtd_core::test_client::RecordingTransport;
///
/// let client = MtdClient::builder()
///     .with_environment(Environment::Sandbox)
///     .with_transport(RecordingTransport::new())
///     .with_api_version("1.0")
///     .build()?;
/// assert!(client.oauth_provider().is_none());
/// # Ok::<(), hmrc_mtd_core::MtdError>(())
/// ```
#[derive(Debug, Default)]
pub struct MtdClientBuilder {
    environment: Environment,
    transport: Option<Arc<dyn Transport>>,
    token_store: Option<TokenStore>,
    oauth: Option<OAuthConfig>,
    api_version: Option<String>,
}

impl MtdClientBuilder {
    /// Sets the environment. Defaults to [`Environment::Sandbox`].
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the transport. Defaults to a [`ReqwestTransport`].
    #[must_use]
    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        self.with_shared_transport(Arc::new(transport))
    }

    /// Sets a shared transport.
    #[must_use]
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Uses an existing token store, e.g. one restored from a user session.
    #[must_use]
    pub fn with_token_store(mut self, token_store: TokenStore) -> Self {
        self.token_store = Some(token_store);
        self
    }

    /// Enables the OAuth provider and the refresh guard.
    ///
    /// The identity endpoint follows the client environment.
    #[must_use]
    pub fn with_oauth(mut self, config: OAuthConfig) -> Self {
        self.oauth = Some(config);
        self
    }

    /// Sets the default API version. Defaults to [`DEFAULT_API_VERSION`].
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`MtdError::InvalidApiVersion`] when the version cannot be used in a media type.
    pub fn build(self) -> Result<MtdClient, MtdError> {
        let Self {
            environment,
            transport,
            token_store,
            oauth,
            api_version,
        } = self;

        let api_version = api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        accept_media_type(&api_version)?;

        let transport = transport.unwrap_or_else(|| Arc::new(ReqwestTransport::new()));
        let token_store = token_store.unwrap_or_default();

        let refresh_guard = oauth.map(|mut config| {
            config.set_environment(environment.clone());
            let provider = OAuthProvider::new(config, Arc::clone(&transport));
            TokenRefreshGuard::new(provider, token_store.clone())
        });

        debug!(%environment, %api_version, oauth = refresh_guard.is_some(), "building MTD client");
        Ok(MtdClient {
            environment,
            transport,
            token_store,
            refresh_guard,
            api_version,
        })
    }
}
