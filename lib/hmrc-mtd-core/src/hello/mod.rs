//! The "Hello World" endpoints, used to check connectivity and credentials.

use crate::{ApiRequest, CallPath, RequestMethod};

/// `GET /hello/world`: open access, no token needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HelloWorldRequest;

impl HelloWorldRequest {
    /// Creates the request.
    pub fn new() -> Self {
        Self
    }
}

impl ApiRequest for HelloWorldRequest {
    fn method(&self) -> RequestMethod {
        RequestMethod::Get
    }

    fn path(&self) -> CallPath {
        CallPath::from("/hello/world")
    }

    fn requires_auth(&self) -> bool {
        false
    }
}

/// `GET /hello/user`: user-restricted, needs an access token with the `hello` scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HelloUserRequest;

impl HelloUserRequest {
    /// Creates the request.
    pub fn new() -> Self {
        Self
    }
}

impl ApiRequest for HelloUserRequest {
    fn method(&self) -> RequestMethod {
        RequestMethod::Get
    }

    fn path(&self) -> CallPath {
        CallPath::from("/hello/user")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_describe_open_endpoint() {
        let request = HelloWorldRequest::new();
        assert_eq!(request.path().resolve().expect("resolved"), "/hello/world");
        assert!(!request.requires_auth());
    }

    #[test]
    fn should_describe_user_endpoint() {
        let request = HelloUserRequest::new();
        assert_eq!(request.path().resolve().expect("resolved"), "/hello/user");
        assert!(request.requires_auth());
        assert!(request.query().is_empty());
    }
}
