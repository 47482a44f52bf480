//! Response validation and assertion utilities

use reqwest::{Response, StatusCode};

/// Response validation helpers
pub trait ResponseAssertions {
    /// Assert response has expected status code
    fn assert_status(&self, expected: StatusCode) -> &Self;

    /// Assert response contains expected header
    fn assert_header(&self, name: &str, expected: &str) -> &Self;

    fn assert_no_header(&self, name: &str) -> &Self;

    fn assert_content_type(&self, expected: &str) -> &Self;

    /// Content-Length as sent on the wire, also for HEAD replies.
    fn declared_length(&self) -> Option<u64>;
}

impl ResponseAssertions for Response {
    fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status(),
            expected,
            "Expected status {}, got {}",
            expected,
            self.status()
        );
        self
    }

    fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let header_value = self
            .headers()
            .get(name)
            .unwrap_or_else(|| panic!("Header '{}' not found", name))
            .to_str()
            .unwrap_or_else(|_| panic!("Header '{}' contains invalid characters", name));

        assert_eq!(
            header_value, expected,
            "Expected header '{}' to be '{}', got '{}'",
            name, expected, header_value
        );
        self
    }

    fn assert_no_header(&self, name: &str) -> &Self {
        assert!(
            self.headers().get(name).is_none(),
            "Header '{}' should be absent",
            name
        );
        self
    }

    fn assert_content_type(&self, expected: &str) -> &Self {
        self.assert_header("content-type", expected)
    }

    fn declared_length(&self) -> Option<u64> {
        self.headers()
            .get("content-length")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }
}
