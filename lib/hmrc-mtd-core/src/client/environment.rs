use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use url::Url;

static SANDBOX_URL: LazyLock<Url> = LazyLock::new(|| {
    Url::parse("https://test-api.service.hmrc.gov.uk").expect("valid sandbox URL")
});

static PRODUCTION_URL: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://api.service.hmrc.gov.uk").expect("valid production URL"));

/// The HMRC platform a client talks to.
///
/// Both the resource endpoints and the identity endpoint (`/oauth/...`) live
/// under the environment base URL.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    /// The sandbox platform, with stateful test scenarios.
    #[default]
    Sandbox,
    /// The live platform.
    Production,
    /// Any other base URL, e.g. a local stub server.
    Custom(Url),
}

impl Environment {
    /// Returns the base URL of the environment.
    pub fn base_url(&self) -> &Url {
        match self {
            Self::Sandbox => &SANDBOX_URL,
            Self::Production => &PRODUCTION_URL,
            Self::Custom(url) => url,
        }
    }

    /// Returns `true` for the sandbox platform.
    pub fn is_sandbox(&self) -> bool {
        matches!(self, Self::Sandbox)
    }

    /// Joins an absolute API path to the base URL, keeping any base path prefix.
    pub(crate) fn join(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url().as_str();
        let url = format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&url)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sandbox => f.write_str("sandbox"),
            Self::Production => f.write_str("production"),
            Self::Custom(url) => write!(f, "{url}"),
        }
    }
}

impl FromStr for Environment {
    type Err = url::ParseError;

    /// Parses `sandbox`, `production` or a base URL.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "sandbox" | "test" => Ok(Self::Sandbox),
            "production" | "live" => Ok(Self::Production),
            _ => Url::parse(value).map(Self::Custom),
        }
    }
}

impl From<Url> for Environment {
    fn from(url: Url) -> Self {
        Self::Custom(url)
    }
}
