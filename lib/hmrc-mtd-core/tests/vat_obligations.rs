#![allow(missing_docs)]

use hmrc_mtd_core::oauth2::{AccessToken, OAuthError};
use hmrc_mtd_core::test_client::RecordingTransport;
use hmrc_mtd_core::vat::{
    ObligationStatus, ObligationsGovTestScenario, RetrieveVatObligationsRequest, VatObligations,
};
use hmrc_mtd_core::{MtdError, TransportError, ValidatedEnum};
use http::{Method, StatusCode};
use rstest::rstest;

mod common;
pub use self::common::*;

const VRN: &str = "abc123";
const FROM: &str = "2018-01-01";
const TO: &str = "2019-01-01";

#[rstest]
#[tokio::test]
async fn test_calls_correct_endpoint(transport: RecordingTransport) -> anyhow::Result<()> {
    let client = plain_client(&transport)?;
    client.token_store().set(AccessToken::new("token-123")).await;
    respond_ok(&transport);

    let request = RetrieveVatObligationsRequest::new_with_status(VRN, FROM, TO, "O")?;
    let response = client.request(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(transport.request_count(), 1);
    let sent = transport.last_request().expect("one request");
    assert_eq!(sent.method(), &Method::GET);
    assert_eq!(sent.path(), "/organisations/vat/abc123/obligations");
    assert_eq!(sent.query(), Some("from=2018-01-01&to=2019-01-01&status=O"));
    assert_eq!(sent.header("authorization"), Some("Bearer token-123"));
    assert_eq!(sent.header("accept"), Some("application/vnd.hmrc.1.0+json"));
    assert_eq!(sent.header("gov-test-scenario"), None);
    assert_eq!(
        sent.url().as_str(),
        "https://test-api.service.hmrc.gov.uk/organisations/vat/abc123/obligations?from=2018-01-01&to=2019-01-01&status=O"
    );

    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_omits_unset_optional_fields(transport: RecordingTransport) -> anyhow::Result<()> {
    let client = plain_client(&transport)?;
    client.token_store().set(AccessToken::new("token-123")).await;
    respond_ok(&transport);

    let request = RetrieveVatObligationsRequest::new(VRN, FROM, TO)?;
    client.request(request).await?;

    let sent = transport.last_request().expect("one request");
    assert_eq!(
        sent.query_pairs(),
        vec![
            ("from".to_string(), FROM.to_string()),
            ("to".to_string(), TO.to_string())
        ]
    );
    assert!(sent.body().is_none());

    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_sends_gov_test_scenario(transport: RecordingTransport) -> anyhow::Result<()> {
    let client = plain_client(&transport)?;
    client.token_store().set(AccessToken::new("token-123")).await;
    respond_ok(&transport);

    let mut request = RetrieveVatObligationsRequest::new(VRN, FROM, TO)?;
    request.set_gov_test_scenario("MONTHLY_THREE_MET")?;
    client.request(request).await?;

    let sent = transport.last_request().expect("one request");
    assert_eq!(sent.header("Gov-Test-Scenario"), Some("MONTHLY_THREE_MET"));

    Ok(())
}

#[rstest]
#[case("A")]
#[case("1")]
#[case("o")]
#[case("OPEN")]
fn test_rejects_status_outside_enumeration(#[case] status: &str) {
    let result = RetrieveVatObligationsRequest::new_with_status(VRN, FROM, TO, status);

    let error = result.expect_err("invalid status");
    assert_eq!(error.field(), "status");
    assert_eq!(error.supplied(), status);
    assert_eq!(error.allowed(), ObligationStatus::values());
}

#[test]
fn test_accepts_every_status_in_enumeration() {
    for status in ObligationStatus::values() {
        assert!(
            RetrieveVatObligationsRequest::new_with_status(VRN, FROM, TO, status).is_ok(),
            "{status}"
        );
    }
}

#[rstest]
#[case(".")]
#[case("..")]
#[case("abc/123")]
fn test_rejects_vrn_escaping_its_path_segment(#[case] vrn: &str) {
    let error = RetrieveVatObligationsRequest::new(vrn, FROM, TO).expect_err("invalid VRN");

    assert_eq!(error.field(), "vrn");
    assert_eq!(error.supplied(), vrn);
}

#[test]
fn test_rejects_wrong_gov_test_scenario() {
    let mut request = RetrieveVatObligationsRequest::new(VRN, FROM, TO).expect("valid request");

    let error = request
        .set_gov_test_scenario("WRONG")
        .expect_err("invalid scenario");

    assert_eq!(error.field(), "Gov-Test-Scenario");
    assert_eq!(request.gov_test_scenario(), None);
}

#[rstest]
#[tokio::test]
async fn test_requires_a_token(transport: RecordingTransport) -> anyhow::Result<()> {
    let client = plain_client(&transport)?;

    let request = RetrieveVatObligationsRequest::new(VRN, FROM, TO)?;
    let error = client.request(request).await.expect_err("no token");

    match &error {
        MtdError::Unauthenticated { path } => {
            assert_eq!(path, "/organisations/vat/{vrn}/obligations");
        }
        other => anyhow::bail!("Expected Unauthenticated, got {other:?}"),
    }
    assert!(error.requires_authentication());
    assert_eq!(transport.request_count(), 0);

    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_rejects_expired_token_without_oauth(
    transport: RecordingTransport,
) -> anyhow::Result<()> {
    let client = plain_client(&transport)?;
    client.token_store().set(expired_token("expired")).await;

    let request = RetrieveVatObligationsRequest::new(VRN, FROM, TO)?;
    let error = client.request(request).await.expect_err("expired token");

    assert!(matches!(
        error,
        MtdError::AuthProvider(OAuthError::TokenExpired)
    ));
    assert_eq!(transport.request_count(), 0);

    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_propagates_transport_failure(transport: RecordingTransport) -> anyhow::Result<()> {
    let client = plain_client(&transport)?;
    client.token_store().set(AccessToken::new("token-123")).await;
    transport.push_failure("connection refused");

    let request = RetrieveVatObligationsRequest::new(VRN, FROM, TO)?;
    let error = client.request(request).await.expect_err("transport failure");

    assert!(matches!(
        error,
        MtdError::Transport(TransportError::Other { .. })
    ));
    assert!(!error.requires_authentication());

    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_uses_per_request_transport(transport: RecordingTransport) -> anyhow::Result<()> {
    let client = plain_client(&transport)?;
    client.token_store().set(AccessToken::new("token-123")).await;
    let other = RecordingTransport::new();
    respond_ok(&other);

    let request = RetrieveVatObligationsRequest::new(VRN, FROM, TO)?;
    client
        .request(request)
        .with_transport(other.clone())
        .fire()
        .await?;

    assert_eq!(transport.request_count(), 0);
    assert_eq!(other.request_count(), 1);

    Ok(())
}

#[rstest]
#[tokio::test]
async fn test_returns_raw_response(transport: RecordingTransport) -> anyhow::Result<()> {
    let client = plain_client(&transport)?;
    client.token_store().set(AccessToken::new("token-123")).await;
    transport.respond_json(
        StatusCode::OK,
        serde_json::json!({
            "obligations": [{
                "start": "2018-01-01",
                "end": "2018-03-31",
                "due": "2018-05-07",
                "status": "O",
                "periodKey": "18A1"
            }]
        }),
    );
    transport.respond_json(
        StatusCode::NOT_FOUND,
        serde_json::json!({ "code": "NOT_FOUND", "message": "The requested resource could not be found" }),
    );

    let request = RetrieveVatObligationsRequest::new(VRN, FROM, TO)?;
    let obligations: VatObligations = client
        .request(request)
        .await?
        .error_for_status()?
        .as_json()?;
    assert_eq!(obligations.obligations.len(), 1);
    assert_eq!(obligations.obligations[0].status, ObligationStatus::Open);

    let request = RetrieveVatObligationsRequest::new(VRN, FROM, TO)?
        .with_gov_test_scenario(ObligationsGovTestScenario::NotFound);
    let response = client.request(request).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = response.error_for_status().expect_err("not found");
    insta::assert_snapshot!(error, @r#"Unexpected status code 404: {"code":"NOT_FOUND","message":"The requested resource could not be found"}"#);

    Ok(())
}
