//! OAuth2 authorization code flow against the HMRC identity endpoint.
//!
//! User-restricted endpoints need an access token obtained with the
//! authorization code grant:
//!
//! 1. redirect the user to [`OAuthProvider::authorization_url`],
//! 2. exchange the code received on the callback with
//!    [`OAuthProvider::exchange_authorization_code`],
//! 3. keep the [`AccessToken`] in the client's [`TokenStore`].
//!
//! From then on the [`TokenRefreshGuard`] refreshes the stored token whenever
//! a request is fired with an expired one.
//!
//! # Example
//!
//! ```rust,no_run
//! use hmrc_mtd_core::MtdClient;
//! use hmrc_mtd_core::oauth2::{OAuthConfig, OAuthCredentials};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = OAuthCredentials::new(
//!     "client-id",
//!     "client-secret",
//!     "http://localhost:8080/oauth/callback",
//! )?;
//! let client = MtdClient::builder()
//!     .with_oauth(OAuthConfig::builder(credentials).add_scope("read:vat").build()?)
//!     .build()?;
//!
//! let Some(provider) = client.oauth_provider() else {
//!     unreachable!("OAuth is configured");
//! };
//! let (login_url, _state) = provider.authorization_url()?;
//! println!("Login at {login_url}");
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod guard;
mod provider;
mod token;

pub use self::config::{DEFAULT_SCOPES, OAuthConfig, OAuthConfigBuilder, OAuthCredentials};
pub use self::error::OAuthError;
pub use self::guard::TokenRefreshGuard;
pub use self::provider::OAuthProvider;
pub use self::token::{AccessToken, TokenStore};
pub use oauth2::CsrfToken;
