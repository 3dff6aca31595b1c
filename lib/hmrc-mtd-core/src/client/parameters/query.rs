use indexmap::IndexMap;

use crate::client::MtdError;

/// Query parameters of a call, kept in insertion order.
///
/// Only parameters explicitly added are serialised: optional fields left unset
/// never show up, not even as empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallQuery {
    params: IndexMap<String, String>,
}

impl CallQuery {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, replacing any previous value for the name.
    #[must_use]
    pub fn add_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Adds a parameter only when a value is present.
    #[must_use]
    pub fn add_optional(self, name: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.add_param(name, value),
            None => self,
        }
    }

    /// Returns `true` when no parameter was added.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Serialises the parameters as `application/x-www-form-urlencoded`.
    pub fn to_query_string(&self) -> Result<String, MtdError> {
        let pairs: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let query = serde_urlencoded::to_string(pairs)?;
        Ok(query)
    }
}
