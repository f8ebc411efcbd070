//! Executes `HttpRequest` values against the network.
//!
//! One attempt per call: no retry, no timeout, no backoff. Non-2xx statuses
//! come back as data so `PortalClient::parse_*` decides what they mean;
//! only failures that produce no response at all become `ApiError::Transport`.

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs the round-trip between `build_*` and `parse_*`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Any matching closure is a transport, which keeps canned-response tests short.
impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, ApiError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self(request)
    }
}

/// Blocking transport backed by a ureq agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        // Status codes are interpreted by the client, not by ureq.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => self.agent.get(&request.url).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&request.url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&request.url).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}
