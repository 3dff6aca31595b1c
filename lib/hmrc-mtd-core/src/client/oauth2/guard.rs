//! Refreshes the stored token before a request is fired.

use std::sync::Arc;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::error::OAuthError;
use super::provider::OAuthProvider;
use super::token::{AccessToken, TokenStore};

/// Keeps the stored access token alive.
///
/// Runs before every request needing authorisation: an expired token is
/// exchanged for a new one through the [`OAuthProvider`] and the result
/// replaces it in the [`TokenStore`]. Concurrent callers sharing the guard
/// wait for a single refresh instead of racing each other.
///
/// A token stored or cleared while a refresh is in flight (a new login, a
/// logout) is kept: the refreshed token is then discarded.
#[derive(Debug, Clone)]
pub struct TokenRefreshGuard {
    provider: OAuthProvider,
    store: TokenStore,
    refreshing: Arc<Mutex<()>>,
}

impl TokenRefreshGuard {
    /// Creates a guard for `store`, refreshing through `provider`.
    pub fn new(provider: OAuthProvider, store: TokenStore) -> Self {
        Self {
            provider,
            store,
            refreshing: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the provider used to refresh tokens.
    pub fn provider(&self) -> &OAuthProvider {
        &self.provider
    }

    /// Returns the guarded store.
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Returns the token a request must use, refreshing it first if it has expired.
    ///
    /// Returns `Ok(None)` when no token is stored: the caller has to authenticate first.
    /// When the store changes during the refresh, its new content is returned.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MissingRefreshToken`] when the expired token cannot be
    /// refreshed, or the provider error once every refresh attempt failed.
    pub async fn ensure_fresh(&self) -> Result<Option<AccessToken>, OAuthError> {
        let Some(token) = self.store.try_get().await else {
            debug!("no stored token, nothing to refresh");
            return Ok(None);
        };
        if !self.needs_refresh(&token) {
            return Ok(Some(token));
        }

        let _refreshing = self.refreshing.lock().await;

        // another caller may have refreshed while we waited
        let Some(token) = self.store.try_get().await else {
            return Ok(None);
        };
        if !self.needs_refresh(&token) {
            debug!("token refreshed by a concurrent request");
            return Ok(Some(token));
        }

        let Some(refresh_token) = token.refresh_token() else {
            warn!("stored token has expired and has no refresh token");
            return Err(OAuthError::MissingRefreshToken);
        };

        let refreshed = self.refresh_with_retry(refresh_token).await?;
        Ok(self.store.replace_if_current(&token, refreshed).await)
    }

    fn needs_refresh(&self, token: &AccessToken) -> bool {
        token.expires_within(self.provider.config().clock_skew())
    }

    async fn refresh_with_retry(&self, refresh_token: &str) -> Result<AccessToken, OAuthError> {
        let config = self.provider.config();
        let backoff = ExponentialBuilder::default()
            .with_min_delay(config.refresh_min_delay)
            .with_max_delay(config.refresh_max_delay)
            .with_max_times(config.max_refresh_attempts.saturating_sub(1));

        let refresh = || self.provider.refresh(refresh_token);
        refresh
            .retry(backoff)
            .when(OAuthError::is_retryable)
            .notify(|error: &OAuthError, delay: Duration| {
                warn!(%error, ?delay, "token refresh failed, retrying");
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::oauth2::{OAuthConfig, OAuthCredentials};
    use crate::test_client::RecordingTransport;
    use crate::{Transport, TransportFuture, WireRequest};

    /// Stores a new login in `store` while the identity endpoint is being called.
    #[derive(Debug)]
    struct LoginDuringRefresh {
        store: TokenStore,
        login: Option<AccessToken>,
        inner: RecordingTransport,
    }

    impl Transport for LoginDuringRefresh {
        fn send(&self, request: WireRequest) -> TransportFuture<'_> {
            Box::pin(async move {
                match &self.login {
                    Some(token) => self.store.set(token.clone()).await,
                    None => self.store.clear().await,
                }
                self.inner.send(request).await
            })
        }
    }

    fn racing_guard(store: &TokenStore, login: Option<AccessToken>) -> TokenRefreshGuard {
        let transport = RecordingTransport::new();
        transport.respond_json(StatusCode::OK, refreshed_response());
        let credentials =
            OAuthCredentials::new("client-id", "client-secret", "http://localhost/callback")
                .expect("valid credentials");
        let config = OAuthConfig::builder(credentials).build().expect("valid config");
        let racing = LoginDuringRefresh {
            store: store.clone(),
            login,
            inner: transport,
        };
        TokenRefreshGuard::new(OAuthProvider::new(config, Arc::new(racing)), store.clone())
    }

    fn guard(transport: &RecordingTransport, store: TokenStore, attempts: usize) -> TokenRefreshGuard {
        let credentials =
            OAuthCredentials::new("client-id", "client-secret", "http://localhost/callback")
                .expect("valid credentials");
        let config = OAuthConfig::builder(credentials)
            .with_max_refresh_attempts(attempts)
            .with_refresh_backoff(Duration::from_millis(1), Duration::from_millis(5))
            .build()
            .expect("valid config");
        let provider = OAuthProvider::new(config, Arc::new(transport.clone()));
        TokenRefreshGuard::new(provider, store)
    }

    fn expired_token() -> AccessToken {
        AccessToken::expiring_in("expired-access", Duration::ZERO).with_refresh_token("refresh-1")
    }

    fn refreshed_response() -> serde_json::Value {
        json!({
            "access_token": "fresh-access",
            "refresh_token": "refresh-2",
            "expires_in": 14400,
            "token_type": "bearer"
        })
    }

    #[tokio::test]
    async fn should_do_nothing_without_token() {
        let transport = RecordingTransport::new();
        let guard = guard(&transport, TokenStore::new(), 1);

        let token = guard.ensure_fresh().await.expect("no error");

        assert!(token.is_none());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn should_keep_valid_token() {
        let transport = RecordingTransport::new();
        let store = TokenStore::with_token(AccessToken::expiring_in(
            "valid-access",
            Duration::from_secs(3600),
        ));
        let guard = guard(&transport, store, 1);

        let token = guard.ensure_fresh().await.expect("no error");

        assert_eq!(token.map(|token| token.access_token().to_string()).as_deref(), Some("valid-access"));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn should_refresh_and_store_expired_token() {
        let transport = RecordingTransport::new();
        transport.respond_json(StatusCode::OK, refreshed_response());
        let store = TokenStore::with_token(expired_token());
        let guard = guard(&transport, store.clone(), 1);

        let token = guard.ensure_fresh().await.expect("refreshed").expect("token");

        assert_eq!(token.access_token(), "fresh-access");
        assert_eq!(transport.request_count(), 1);
        let stored = store.get().await.expect("stored");
        assert_eq!(stored.access_token(), "fresh-access");
        assert_eq!(stored.refresh_token(), Some("refresh-2"));
    }

    #[tokio::test]
    async fn should_fail_without_refresh_token() {
        let transport = RecordingTransport::new();
        let store = TokenStore::with_token(AccessToken::expiring_in("expired", Duration::ZERO));
        let guard = guard(&transport, store, 1);

        let error = guard.ensure_fresh().await.expect_err("cannot refresh");

        assert_eq!(error, OAuthError::MissingRefreshToken);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn should_surface_refresh_failure_and_keep_old_token() {
        let transport = RecordingTransport::new();
        transport.respond_json(StatusCode::BAD_REQUEST, json!({ "error": "invalid_grant" }));
        let store = TokenStore::with_token(expired_token());
        let guard = guard(&transport, store.clone(), 3);

        let error = guard.ensure_fresh().await.expect_err("refresh rejected");

        assert!(matches!(error, OAuthError::TokenRefreshFailed { .. }));
        // rejected grants are not retried
        assert_eq!(transport.request_count(), 1);
        let stored = store.get().await.expect("still stored");
        assert_eq!(stored.access_token(), "expired-access");
    }

    #[tokio::test]
    async fn should_retry_transient_failures() {
        let transport = RecordingTransport::new();
        transport.push_failure("connection reset");
        transport.respond_json(StatusCode::OK, refreshed_response());
        let guard = guard(&transport, TokenStore::with_token(expired_token()), 2);

        let token = guard.ensure_fresh().await.expect("refreshed").expect("token");

        assert_eq!(token.access_token(), "fresh-access");
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn should_not_retry_by_default() {
        let transport = RecordingTransport::new();
        transport.push_failure("connection reset");
        transport.respond_json(StatusCode::OK, refreshed_response());
        let guard = guard(&transport, TokenStore::with_token(expired_token()), 1);

        let error = guard.ensure_fresh().await.expect_err("single attempt");

        assert!(matches!(error, OAuthError::NetworkError { .. }));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn should_refresh_early_with_clock_skew() {
        let transport = RecordingTransport::new();
        transport.respond_json(StatusCode::OK, refreshed_response());
        let credentials =
            OAuthCredentials::new("client-id", "client-secret", "http://localhost/callback")
                .expect("valid credentials");
        let config = OAuthConfig::builder(credentials)
            .with_clock_skew(Duration::from_secs(60))
            .build()
            .expect("valid config");
        let store = TokenStore::with_token(
            AccessToken::expiring_in("almost-expired", Duration::from_secs(30))
                .with_refresh_token("refresh-1"),
        );
        let guard = TokenRefreshGuard::new(
            OAuthProvider::new(config, Arc::new(transport.clone())),
            store,
        );

        let token = guard.ensure_fresh().await.expect("refreshed").expect("token");

        assert_eq!(token.access_token(), "fresh-access");
    }

    #[tokio::test]
    async fn should_refresh_once_for_concurrent_callers() {
        let transport = RecordingTransport::new();
        transport.respond_json(StatusCode::OK, refreshed_response());
        let guard = guard(&transport, TokenStore::with_token(expired_token()), 1);

        let (first, second) = tokio::join!(guard.ensure_fresh(), guard.ensure_fresh());

        assert_eq!(
            first.expect("refreshed").map(|token| token.access_token().to_string()),
            Some("fresh-access".to_string())
        );
        assert_eq!(
            second.expect("refreshed").map(|token| token.access_token().to_string()),
            Some("fresh-access".to_string())
        );
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn should_keep_token_stored_during_refresh() {
        let store = TokenStore::with_token(expired_token());
        let login = AccessToken::expiring_in("new-login", Duration::from_secs(3600));
        let guard = racing_guard(&store, Some(login));

        let token = guard.ensure_fresh().await.expect("refreshed").expect("token");

        assert_eq!(token.access_token(), "new-login");
        let stored = store.get().await.expect("stored");
        assert_eq!(stored.access_token(), "new-login");
    }

    #[tokio::test]
    async fn should_not_restore_token_after_logout_during_refresh() {
        let store = TokenStore::with_token(expired_token());
        let guard = racing_guard(&store, None);

        let token = guard.ensure_fresh().await.expect("no error");

        assert!(token.is_none());
        assert!(!store.is_authenticated().await);
    }
}
