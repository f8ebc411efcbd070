//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `PortalClient` builds
//! `HttpRequest` values and parses `HttpResponse` values; a `Transport`
//! (see `transport.rs`) performs the single network round-trip in between.
//! Keeping the two halves apart lets the query layer and the importer be
//! tested against canned responses without a socket.

/// HTTP method for a request. The portal backend only needs reads and
/// JSON-bodied posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `url` is absolute: the client's base URL joined with the endpoint path
/// and any query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: String) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(url: String, body: String) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        }
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
    /// Convenience constructor for a JSON response with no headers.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
