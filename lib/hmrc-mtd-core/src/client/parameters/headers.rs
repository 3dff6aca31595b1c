use http::header::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;

use crate::client::MtdError;

/// Header selecting a stateful sandbox test scenario.
pub const GOV_TEST_SCENARIO: &str = "Gov-Test-Scenario";

/// Request-specific headers, kept in insertion order.
///
/// `Accept` and `Authorization` are set by the client pipeline, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallHeaders {
    headers: IndexMap<String, String>,
}

impl CallHeaders {
    /// Creates an empty set of headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header, replacing any previous value for the name.
    #[must_use]
    pub fn add_header(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.headers.insert(name.into(), value.to_string());
        self
    }

    /// Adds a header only when a value is present.
    #[must_use]
    pub fn add_optional(self, name: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.add_header(name, value),
            None => self,
        }
    }

    /// Merges another set of headers, `other` wins on conflicts.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.headers.extend(other.headers);
        self
    }

    /// Returns `true` when no header was added.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Returns the number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Returns the value of a header, matched case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub(in crate::client) fn apply(&self, target: &mut HeaderMap) -> Result<(), MtdError> {
        for (name, value) in &self.headers {
            target.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        Ok(())
    }
}
