use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use tracing::warn;

use crate::client::MtdError;

/// Regular expression for matching path parameters in the format `{param_name}`.
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>\w+)}").expect("a valid regex"));

/// Everything but RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn replace_path_param(path: &str, param_name: &str, value: &str) -> String {
    let pattern = ["{", param_name, "}"].concat();
    path.replace(&pattern, value)
}

fn encode_path_param_value(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

// URL parsers normalize these segments away, even percent-encoded.
fn is_dot_segment(value: &str) -> bool {
    value == "." || value == ".."
}

/// An endpoint path template with its bound parameters.
///
/// ```rust
/// use hmrc_mtd_core::CallPath;
///
/// let path = CallPath::from("/organisations/vat/{vrn}/obligations").add_param("vrn", "abc123");
/// assert_eq!(path.template(), "/organisations/vat/{vrn}/obligations");
/// assert_eq!(path.resolve()?, "/organisations/vat/abc123/obligations");
/// # Ok::<(), hmrc_mtd_core::MtdError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPath {
    template: String,
    args: IndexMap<String, String>,
}

impl CallPath {
    /// Binds a path parameter, replacing any previous value.
    #[must_use]
    pub fn add_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Returns the template, placeholders included.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substitutes every bound parameter, percent-encoded, into the template.
    ///
    /// Bound values are inserted verbatim when they only hold unreserved characters.
    ///
    /// # Errors
    ///
    /// Returns [`MtdError::PathUnresolved`] listing the placeholders without a value,
    /// and [`MtdError::InvalidPathArgument`] for a `.` or `..` value.
    pub fn resolve(&self) -> Result<String, MtdError> {
        let mut path = self.template.clone();
        let mut names: HashSet<&str> = RE
            .captures_iter(&self.template)
            .filter_map(|caps| caps.name("name"))
            .map(|name| name.as_str())
            .collect();

        for (name, value) in &self.args {
            if !names.remove(name.as_str()) {
                warn!(?name, "argument name not found");
                continue;
            }
            if is_dot_segment(value) {
                return Err(MtdError::InvalidPathArgument {
                    name: name.clone(),
                    value: value.clone(),
                });
            }
            path = replace_path_param(&path, name, &encode_path_param_value(value));
        }

        if names.is_empty() {
            return Ok(path);
        }

        let mut missings: Vec<String> = names.into_iter().map(str::to_string).collect();
        missings.sort();
        Err(MtdError::PathUnresolved {
            path: self.template.clone(),
            missings,
        })
    }
}

impl From<&str> for CallPath {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<String> for CallPath {
    fn from(template: String) -> Self {
        Self {
            template,
            args: IndexMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn should_resolve_static_path() {
        let path = CallPath::from("/hello/world");
        assert_eq!(path.resolve().expect("resolved"), "/hello/world");
    }

    #[test]
    fn should_resolve_multiple_parameters() {
        let path = CallPath::from("/organisations/vat/{vrn}/returns/{periodKey}")
            .add_param("vrn", "123456789")
            .add_param("periodKey", "18A1");

        assert_eq!(
            path.resolve().expect("resolved"),
            "/organisations/vat/123456789/returns/18A1"
        );
    }

    #[test]
    fn should_report_missing_parameters() {
        let path = CallPath::from("/organisations/vat/{vrn}/returns/{periodKey}");

        match path.resolve() {
            Err(MtdError::PathUnresolved { path, missings }) => {
                assert_eq!(path, "/organisations/vat/{vrn}/returns/{periodKey}");
                assert_eq!(missings, vec!["periodKey", "vrn"]);
            }
            other => panic!("Expected PathUnresolved, got {other:?}"),
        }
    }

    #[rstest]
    #[case("#001", "%23001")]
    #[case("a/b", "a%2Fb")]
    #[case("a b", "a%20b")]
    #[case("A1-B_2.~", "A1-B_2.~")]
    fn should_encode_path_values(#[case] value: &str, #[case] expected: &str) {
        let path = CallPath::from("/returns/{periodKey}").add_param("periodKey", value);
        assert_eq!(
            path.resolve().expect("resolved"),
            format!("/returns/{expected}")
        );
    }

    #[rstest]
    #[case(".")]
    #[case("..")]
    fn should_reject_dot_segments(#[case] value: &str) {
        let path = CallPath::from("/organisations/vat/{vrn}/obligations").add_param("vrn", value);

        match path.resolve() {
            Err(MtdError::InvalidPathArgument { name, value: rejected }) => {
                assert_eq!(name, "vrn");
                assert_eq!(rejected, value);
            }
            other => panic!("Expected InvalidPathArgument, got {other:?}"),
        }
    }

    #[test]
    fn should_ignore_unknown_arguments() {
        let path = CallPath::from("/hello/user").add_param("vrn", "123");
        assert_eq!(path.resolve().expect("resolved"), "/hello/user");
    }

    #[test]
    fn should_overwrite_existing_argument() {
        let path = CallPath::from("/vat/{vrn}")
            .add_param("vrn", "first")
            .add_param("vrn", "second");
        assert_eq!(path.resolve().expect("resolved"), "/vat/second");
    }

    #[test]
    fn test_replace_path_param_substring_collision() {
        let result = replace_path_param("/{vrn}/{vrn_id}", "vrn", "123");
        assert_eq!(result, "/123/{vrn_id}");
    }
}
