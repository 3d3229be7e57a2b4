//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The client builds `HttpRequest`
//! values and parses `HttpResponse` values; a `Transport` (see
//! `crate::transport`) performs the actual round-trip in between. All fields
//! are owned so values can be handed to another thread or recorded in tests.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute: base URL, path and encoded query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost:5000/api/users".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: None,
        };
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn success_range_is_2xx() {
        let status = |status| HttpResponse {
            status,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(status(200).is_success());
        assert!(status(204).is_success());
        assert!(status(299).is_success());
        assert!(!status(199).is_success());
        assert!(!status(301).is_success());
        assert!(!status(401).is_success());
        assert!(!status(500).is_success());
    }
}
