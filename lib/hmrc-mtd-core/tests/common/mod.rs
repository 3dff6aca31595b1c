use std::time::Duration;

use hmrc_mtd_core::oauth2::{AccessToken, OAuthConfig, OAuthCredentials};
use hmrc_mtd_core::test_client::RecordingTransport;
use hmrc_mtd_core::{Environment, MtdClient};
use http::StatusCode;
use rstest::fixture;
use tracing::info;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

#[fixture]
pub fn transport() -> RecordingTransport {
    init_tracing();
    RecordingTransport::new()
}

pub fn credentials() -> OAuthCredentials {
    OAuthCredentials::new("client-id", "client-secret", "http://localhost:8080/callback")
        .expect("valid test credentials")
}

/// A sandbox client with OAuth enabled, sending everything through `transport`.
pub fn oauth_client(transport: &RecordingTransport) -> anyhow::Result<MtdClient> {
    let config = OAuthConfig::builder(credentials()).build()?;
    let client = MtdClient::builder()
        .with_environment(Environment::Sandbox)
        .with_transport(transport.clone())
        .with_oauth(config)
        .build()?;
    Ok(client)
}

/// A sandbox client without OAuth.
pub fn plain_client(transport: &RecordingTransport) -> anyhow::Result<MtdClient> {
    let client = MtdClient::builder()
        .with_transport(transport.clone())
        .build()?;
    Ok(client)
}

pub fn valid_token(access_token: &str) -> AccessToken {
    AccessToken::expiring_in(access_token, Duration::from_secs(4 * 3600))
        .with_refresh_token("refresh-token")
}

pub fn expired_token(access_token: &str) -> AccessToken {
    AccessToken::expiring_in(access_token, Duration::ZERO).with_refresh_token("refresh-token")
}

pub fn respond_token(transport: &RecordingTransport, access_token: &str) {
    transport.respond_json(
        StatusCode::OK,
        serde_json::json!({
            "access_token": access_token,
            "refresh_token": "rotated-refresh-token",
            "expires_in": 14400,
            "scope": "hello read:vat write:vat",
            "token_type": "bearer"
        }),
    );
}

pub fn respond_ok(transport: &RecordingTransport) {
    transport.respond_json(StatusCode::OK, serde_json::json!({}));
}
