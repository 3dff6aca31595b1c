//! Access tokens and the shared token store.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use http::HeaderValue;
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::client::{MtdError, SecureString};

/// An OAuth2 access token with its refresh token and expiry instant.
///
/// Serializes as `{ "access_token", "refresh_token", "expires" }` with `expires`
/// in Unix seconds, so it can be kept in a web session between requests.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
pub struct AccessToken {
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[zeroize(skip)]
    #[serde(
        rename = "expires",
        default,
        skip_serializing_if = "Option::is_none",
        with = "jiff::fmt::serde::timestamp::second::optional"
    )]
    expires_at: Option<Timestamp>,
}

impl AccessToken {
    /// Creates a token without expiry and without refresh token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Creates a token expiring `expires_in` from now, as returned by the identity endpoint.
    pub fn expiring_in(access_token: impl Into<String>, expires_in: Duration) -> Self {
        Self::new(access_token).with_expires_at(offset(Timestamp::now(), expires_in))
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Sets the expiry instant.
    #[must_use]
    pub fn with_expires_at(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns the bearer token value.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the refresh token if available.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns the expiry instant, `None` for a token that never expires.
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// Checks if the token is expired: `now >= expires_at`.
    ///
    /// Returns `false` if the token has no expiration time.
    pub fn has_expired(&self) -> bool {
        self.has_expired_at(Timestamp::now())
    }

    /// Checks if the token is expired at the given instant.
    pub fn has_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }

    /// Checks if the token expires within `skew` from now.
    ///
    /// With a zero skew this is exactly [`has_expired`](Self::has_expired).
    pub fn expires_within(&self, skew: Duration) -> bool {
        self.has_expired_at(offset(Timestamp::now(), skew))
    }

    /// Returns the time until expiration, `None` when expired or without expiry.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        let exp = self.expires_at?;
        Duration::try_from(exp.duration_since(Timestamp::now())).ok()
    }

    pub(crate) fn to_bearer_header(&self) -> Result<HeaderValue, MtdError> {
        SecureString::from(self.access_token.as_str()).to_bearer_header()
    }
}

fn offset(from: Timestamp, duration: Duration) -> Timestamp {
    SignedDuration::try_from(duration)
        .ok()
        .and_then(|duration| from.checked_add(duration).ok())
        .unwrap_or(Timestamp::MAX)
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// The current-token slot shared by every request of a session.
///
/// Cloning the store shares the slot. Exactly one token is active at a time:
/// [`set`](Self::set) replaces it, [`clear`](Self::clear) logs out.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<AccessToken>>>,
}

impl TokenStore {
    /// Creates a new empty token store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token store with an initial token.
    pub fn with_token(token: AccessToken) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(token))),
        }
    }

    /// Returns the stored token, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`MtdError::NoToken`] when no token is stored.
    pub async fn get(&self) -> Result<AccessToken, MtdError> {
        self.try_get().await.ok_or(MtdError::NoToken)
    }

    /// Returns the stored token if any.
    pub async fn try_get(&self) -> Option<AccessToken> {
        let guard = self.inner.read().await;
        guard.clone()
    }

    /// Replaces the stored token.
    pub async fn set(&self, token: AccessToken) {
        debug!(expires_at = ?token.expires_at(), "storing access token");
        let mut guard = self.inner.write().await;
        *guard = Some(token);
    }

    /// Stores `token` only if the slot still holds `expected`, and returns the token left in the slot.
    ///
    /// A token set or cleared since `expected` was read wins over `token`.
    pub(crate) async fn replace_if_current(
        &self,
        expected: &AccessToken,
        token: AccessToken,
    ) -> Option<AccessToken> {
        let mut guard = self.inner.write().await;
        if guard.as_ref() == Some(expected) {
            debug!(expires_at = ?token.expires_at(), "storing refreshed access token");
            *guard = Some(token);
        } else {
            debug!("stored token changed during refresh, keeping it");
        }
        guard.clone()
    }

    /// Removes the stored token.
    pub async fn clear(&self) {
        debug!("clearing access token");
        let mut guard = self.inner.write().await;
        *guard = None;
    }

    /// Returns `true` when a token is stored.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_token() {
        let token = AccessToken::new("access-token-123");
        assert_eq!(token.access_token(), "access-token-123");
        assert!(token.refresh_token().is_none());
        assert!(!token.has_expired());
        assert!(token.time_until_expiry().is_none());
    }

    #[test]
    fn should_create_token_with_expiry() {
        let token = AccessToken::expiring_in("token", Duration::from_secs(3600));
        assert!(!token.has_expired());
        assert!(token.time_until_expiry().is_some());
    }

    #[test]
    fn should_detect_expired_token() {
        let token = AccessToken::expiring_in("token", Duration::ZERO);
        assert!(token.has_expired());
    }

    #[test]
    fn should_compare_expiry_inclusively() {
        let expires_at = Timestamp::from_second(1_600_000_000).expect("valid timestamp");
        let token = AccessToken::new("token").with_expires_at(expires_at);

        let just_before = expires_at
            .checked_sub(SignedDuration::from_secs(1))
            .expect("valid timestamp");
        assert!(!token.has_expired_at(just_before));
        assert!(token.has_expired_at(expires_at));
    }

    #[test]
    fn should_detect_expiry_within_skew() {
        let token = AccessToken::expiring_in("token", Duration::from_secs(30));

        assert!(token.expires_within(Duration::from_secs(60)));
        assert!(!token.expires_within(Duration::from_secs(10)));
        assert!(!token.expires_within(Duration::ZERO));
    }

    #[test]
    fn should_saturate_huge_expiry() {
        let token = AccessToken::expiring_in("token", Duration::MAX);
        assert_eq!(token.expires_at(), Some(Timestamp::MAX));
        assert!(!token.has_expired());
    }

    #[test]
    fn should_add_refresh_token() {
        let token = AccessToken::new("access").with_refresh_token("refresh");
        assert_eq!(token.refresh_token(), Some("refresh"));
    }

    #[test]
    fn should_redact_debug_output() {
        let token = AccessToken::new("secret-token").with_refresh_token("secret-refresh");
        let debug_str = format!("{token:?}");
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret-token"));
        assert!(!debug_str.contains("secret-refresh"));
    }

    #[test]
    fn should_serialize_for_session_storage() {
        let expires_at = Timestamp::from_second(1_600_000_000).expect("valid timestamp");
        let token = AccessToken::new("abc")
            .with_refresh_token("def")
            .with_expires_at(expires_at);

        let json = serde_json::to_string(&token).expect("serialize");
        insta::assert_snapshot!(json, @r#"{"access_token":"abc","refresh_token":"def","expires":1600000000}"#);

        let restored: AccessToken = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, token);
    }

    #[test]
    fn should_deserialize_bare_token() {
        let token: AccessToken =
            serde_json::from_str(r#"{"access_token":"abc"}"#).expect("deserialize");
        assert_eq!(token, AccessToken::new("abc"));
    }

    #[tokio::test]
    async fn should_store_token() {
        let store = TokenStore::new();
        assert!(matches!(store.get().await, Err(MtdError::NoToken)));
        assert!(!store.is_authenticated().await);

        store.set(AccessToken::new("stored-token")).await;

        let stored = store.get().await.expect("Token should be stored");
        assert_eq!(stored.access_token(), "stored-token");
        assert!(store.is_authenticated().await);
    }

    #[tokio::test]
    async fn should_return_expired_token() {
        let store = TokenStore::with_token(AccessToken::expiring_in("expired", Duration::ZERO));

        let stored = store.get().await.expect("expired tokens are still returned");
        assert!(stored.has_expired());
    }

    #[tokio::test]
    async fn should_replace_token() {
        let store = TokenStore::with_token(AccessToken::new("first"));
        store.set(AccessToken::new("second")).await;

        let stored = store.get().await.expect("Token should be stored");
        assert_eq!(stored.access_token(), "second");
    }

    #[tokio::test]
    async fn should_clear_store() {
        let store = TokenStore::new();
        store.set(AccessToken::new("token")).await;
        assert!(store.try_get().await.is_some());

        store.clear().await;
        assert!(store.try_get().await.is_none());
    }

    #[tokio::test]
    async fn should_share_slot_between_clones() {
        let store = TokenStore::new();
        let other = store.clone();

        other.set(AccessToken::new("shared")).await;

        let stored = store.get().await.expect("clone shares the slot");
        assert_eq!(stored.access_token(), "shared");
    }
}
