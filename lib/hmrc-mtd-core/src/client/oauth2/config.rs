//! OAuth2 credentials, configuration and builder.

use std::fmt;
use std::time::Duration;

use oauth2::{ClientId, RedirectUrl, Scope};
use url::Url;

use super::error::OAuthError;
use crate::client::{Environment, SecureString};

/// Scopes requested when none are configured.
pub const DEFAULT_SCOPES: [&str; 3] = ["hello", "read:vat", "write:vat"];

const DEFAULT_MAX_REFRESH_ATTEMPTS: usize = 1;
const DEFAULT_REFRESH_MIN_DELAY: Duration = Duration::from_millis(200);
const DEFAULT_REFRESH_MAX_DELAY: Duration = Duration::from_secs(5);

const CLIENT_ID_VAR: &str = "HMRC_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "HMRC_CLIENT_SECRET";
const CALLBACK_URI_VAR: &str = "HMRC_CALLBACK_URI";

/// The application credentials registered with HMRC.
///
/// Immutable once built; supplied by the caller or the process environment.
#[derive(Clone)]
pub struct OAuthCredentials {
    client_id: ClientId,
    client_secret: SecureString,
    callback_uri: RedirectUrl,
}

impl OAuthCredentials {
    /// Creates credentials, validating the callback URI.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidEndpoint`] when the callback URI is not an absolute URL.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<SecureString>,
        callback_uri: impl Into<String>,
    ) -> Result<Self, OAuthError> {
        let callback_uri = callback_uri.into();
        let callback_uri =
            RedirectUrl::new(callback_uri.clone()).map_err(|err| OAuthError::InvalidEndpoint {
                url: callback_uri,
                reason: err.to_string(),
            })?;

        Ok(Self {
            client_id: ClientId::new(client_id.into()),
            client_secret: client_secret.into(),
            callback_uri,
        })
    }

    /// Reads `HMRC_CLIENT_ID`, `HMRC_CLIENT_SECRET` and `HMRC_CALLBACK_URI`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::ConfigurationError`] when a variable is missing,
    /// or [`OAuthError::InvalidEndpoint`] when the callback URI is malformed.
    pub fn from_env() -> Result<Self, OAuthError> {
        Self::new(
            env_var(CLIENT_ID_VAR)?,
            env_var(CLIENT_SECRET_VAR)?,
            env_var(CALLBACK_URI_VAR)?,
        )
    }

    /// Returns the client identifier.
    pub fn client_id(&self) -> &str {
        self.client_id.as_str()
    }

    /// Returns the client secret.
    pub fn client_secret(&self) -> &SecureString {
        &self.client_secret
    }

    /// Returns the OAuth callback (redirect) URI.
    pub fn callback_uri(&self) -> &str {
        self.callback_uri.as_str()
    }
}

fn env_var(name: &str) -> Result<String, OAuthError> {
    std::env::var(name).map_err(|err| OAuthError::ConfigurationError {
        reason: format!("{name}: {err}"),
    })
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id.as_str())
            .field("client_secret", &"[REDACTED]")
            .field("callback_uri", &self.callback_uri.as_str())
            .finish()
    }
}

/// OAuth2 configuration for the authorization code flow against HMRC.
///
/// Use [`OAuthConfig::builder`] to create instances.
#[derive(Clone)]
pub struct OAuthConfig {
    pub(crate) credentials: OAuthCredentials,
    pub(crate) environment: Environment,
    pub(crate) scopes: Vec<Scope>,
    pub(crate) clock_skew: Duration,
    pub(crate) max_refresh_attempts: usize,
    pub(crate) refresh_min_delay: Duration,
    pub(crate) refresh_max_delay: Duration,
}

impl OAuthConfig {
    /// Creates a builder with the required credentials.
    pub fn builder(credentials: OAuthCredentials) -> OAuthConfigBuilder {
        OAuthConfigBuilder::new(credentials)
    }

    /// Returns the credentials.
    pub fn credentials(&self) -> &OAuthCredentials {
        &self.credentials
    }

    /// Returns the environment hosting the identity endpoint.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Returns the requested scopes.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(|scope| scope.as_str())
    }

    /// Returns the expiry tolerance applied by the refresh guard.
    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    /// Returns the maximum number of refresh attempts per request.
    pub fn max_refresh_attempts(&self) -> usize {
        self.max_refresh_attempts
    }

    /// The login redirect endpoint, `{base}/oauth/authorize`.
    pub fn authorize_url(&self) -> Result<Url, OAuthError> {
        self.endpoint("/oauth/authorize")
    }

    /// The token exchange endpoint, `{base}/oauth/token`.
    pub fn token_url(&self) -> Result<Url, OAuthError> {
        self.endpoint("/oauth/token")
    }

    fn endpoint(&self, path: &str) -> Result<Url, OAuthError> {
        self.environment
            .join(path)
            .map_err(|err| OAuthError::InvalidEndpoint {
                url: format!("{}{path}", self.environment.base_url()),
                reason: err.to_string(),
            })
    }

    pub(crate) fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("credentials", &self.credentials)
            .field("environment", &self.environment)
            .field("scopes", &self.scopes().collect::<Vec<_>>())
            .field("clock_skew", &self.clock_skew)
            .field("max_refresh_attempts", &self.max_refresh_attempts)
            .finish_non_exhaustive()
    }
}

/// Builder for [`OAuthConfig`].
#[derive(Debug, Clone)]
pub struct OAuthConfigBuilder {
    credentials: OAuthCredentials,
    environment: Environment,
    scopes: Vec<String>,
    clock_skew: Duration,
    max_refresh_attempts: usize,
    refresh_min_delay: Duration,
    refresh_max_delay: Duration,
}

impl OAuthConfigBuilder {
    /// Creates a new builder with required parameters.
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            credentials,
            environment: Environment::default(),
            scopes: Vec::new(),
            clock_skew: Duration::ZERO,
            max_refresh_attempts: DEFAULT_MAX_REFRESH_ATTEMPTS,
            refresh_min_delay: DEFAULT_REFRESH_MIN_DELAY,
            refresh_max_delay: DEFAULT_REFRESH_MAX_DELAY,
        }
    }

    /// Sets the environment hosting the identity endpoint.
    ///
    /// A client built with [`MtdClientBuilder::with_oauth`](crate::MtdClientBuilder::with_oauth)
    /// replaces it with the client environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Adds a scope.
    #[must_use]
    pub fn add_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    /// Adds multiple scopes.
    #[must_use]
    pub fn add_scopes(mut self, scopes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Treats tokens expiring within `clock_skew` as already expired.
    ///
    /// Defaults to zero: a token is expired exactly when `now >= expires_at`.
    #[must_use]
    pub fn with_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = clock_skew;
        self
    }

    /// Sets how many times a transient refresh failure is attempted. Defaults to 1.
    #[must_use]
    pub fn with_max_refresh_attempts(mut self, attempts: usize) -> Self {
        self.max_refresh_attempts = attempts;
        self
    }

    /// Sets the exponential backoff bounds between refresh attempts.
    #[must_use]
    pub fn with_refresh_backoff(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.refresh_min_delay = min_delay;
        self.refresh_max_delay = max_delay;
        self
    }

    /// Builds the OAuth2 configuration.
    pub fn build(self) -> Result<OAuthConfig, OAuthError> {
        if self.max_refresh_attempts == 0 {
            return Err(OAuthError::ConfigurationError {
                reason: "max_refresh_attempts must be at least 1".to_string(),
            });
        }
        if self.refresh_min_delay > self.refresh_max_delay {
            return Err(OAuthError::ConfigurationError {
                reason: "refresh backoff min delay exceeds max delay".to_string(),
            });
        }

        let scopes = if self.scopes.is_empty() {
            DEFAULT_SCOPES.iter().map(|scope| Scope::new((*scope).to_string())).collect()
        } else {
            self.scopes.into_iter().map(Scope::new).collect()
        };

        Ok(OAuthConfig {
            credentials: self.credentials,
            environment: self.environment,
            scopes,
            clock_skew: self.clock_skew,
            max_refresh_attempts: self.max_refresh_attempts,
            refresh_min_delay: self.refresh_min_delay,
            refresh_max_delay: self.refresh_max_delay,
        })
    }
}
