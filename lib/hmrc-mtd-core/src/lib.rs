//! # HMRC MTD Core
//!
//! Client for the HMRC Making Tax Digital REST APIs.
//!
//! The crate builds one HTTP call per endpoint, validates every enumerated or
//! formatted field when it is assigned, attaches the OAuth2 bearer token and
//! fires the call through a pluggable [`Transport`].
//!
//! - **[`MtdClient`]** - environment, transport, token store and refresh guard
//! - **[`ApiRequest`]** - one implementation per endpoint ([`vat`], [`hello`])
//! - **[`oauth2`]** - access tokens, the identity provider and the refresh guard
//! - **[`test_client`]** - a scripted transport for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hmrc_mtd_core::oauth2::{OAuthConfig, OAuthCredentials};
//! use hmrc_mtd_core::vat::{ObligationStatus, RetrieveVatObligationsRequest};
//! use hmrc_mtd_core::{Environment, MtdClient};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = OAuthCredentials::from_env()?;
//! let client = MtdClient::builder()
//!     .with_environment(Environment::Sandbox)
//!     .with_oauth(OAuthConfig::builder(credentials).build()?)
//!     .build()?;
//!
//! // Exchange the code received on the OAuth callback
//! let token = client
//!     .oauth_provider()
//!     .expect("OAuth is configured")
//!     .exchange_authorization_code("code-from-callback")
//!     .await?;
//! client.token_store().set(token).await;
//!
//! let request = RetrieveVatObligationsRequest::new("123456789", "2018-01-01", "2018-12-31")?
//!     .with_status(ObligationStatus::Open);
//! let obligations: hmrc_mtd_core::vat::VatObligations =
//!     client.request(request).await?.error_for_status()?.as_json()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Validation
//!
//! Invalid input is rejected where it enters a request, never at fire time:
//!
//! ```rust
//! use hmrc_mtd_core::vat::RetrieveVatObligationsRequest;
//!
//! let result = RetrieveVatObligationsRequest::new_with_status("abc123", "2018-01-01", "2019-01-01", "A");
//! assert!(result.is_err());
//!
//! let mut request = RetrieveVatObligationsRequest::new("abc123", "2018-01-01", "2019-01-01")?;
//! assert!(request.set_gov_test_scenario("WRONG").is_err());
//! request.set_gov_test_scenario("MONTHLY_THREE_MET")?;
//! # Ok::<(), hmrc_mtd_core::InvalidFieldValue>(())
//! ```

mod client;

pub mod enumeration;
pub mod hello;
pub mod test_client;
pub mod vat;

pub use self::client::oauth2;
pub use self::client::{
    ApiCall, ApiRequest, CallBody, CallHeaders, CallPath, CallQuery, DEFAULT_API_VERSION,
    Environment, GOV_TEST_SCENARIO, MtdClient, MtdClientBuilder, MtdError, RequestMethod, ReqwestTransport,
    SecureString, Transport, TransportError, TransportFuture, WireRequest, WireResponse,
};
pub use self::enumeration::{InvalidFieldValue, ValidatedEnum};

/// Declares a closed enumeration of wire codes and implements [`ValidatedEnum`] for it.
///
/// The generated type also implements [`Display`](std::fmt::Display) (the wire
/// code), [`FromStr`](std::str::FromStr) (validated parsing) and serde's
/// `Serialize`/`Deserialize` as the wire code.
///
/// # Example
///
/// ```rust
/// use hmrc_mtd_core::{ValidatedEnum, validated_enum};
///
/// validated_enum! {
///     /// Filing frequency.
///     pub enum Frequency("frequency") {
///         /// Every month.
///         Monthly => "M",
///         /// Every quarter.
///         Quarterly => "Q",
///     }
/// }
///
/// assert_eq!(Frequency::parse("Q"), Ok(Frequency::Quarterly));
/// assert!(Frequency::parse("Y").is_err());
/// assert_eq!(Frequency::values(), vec!["M", "Q"]);
/// ```
#[macro_export]
macro_rules! validated_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident($field:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $code:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $crate::ValidatedEnum for $name {
            const FIELD: &'static str = $field;
            const VALUES: &'static [Self] = &[$(Self::$variant),+];

            fn code(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::ValidatedEnum::code(self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::InvalidFieldValue;

            fn from_str(value: &str) -> ::std::result::Result<Self, Self::Err> {
                <Self as $crate::ValidatedEnum>::parse(value)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                serializer.serialize_str($crate::ValidatedEnum::code(self))
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let value = <::std::string::String as $crate::__private::serde::Deserialize>::deserialize(deserializer)?;
                <Self as $crate::ValidatedEnum>::parse(&value)
                    .map_err(<D::Error as $crate::__private::serde::de::Error>::custom)
            }
        }
    };
}

#[doc(hidden)]
pub mod __private {
    pub use serde;
}
