//! Executes `HttpRequest` values.
//!
//! # Design
//! The client never touches the network itself. It hands each built request
//! to a `Transport` and parses whatever comes back. A transport reports an
//! error only when no response arrived; every status code, including 4xx and
//! 5xx, is returned as an `HttpResponse`.

use std::fmt;

use tracing::warn;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Largest response body `UreqTransport` will read.
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Blocking transport backed by `ureq`, using the library's default timeouts.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get | HttpMethod::Delete => {
                let mut builder = match method {
                    HttpMethod::Get => self.agent.get(url.as_str()),
                    _ => self.agent.delete(url.as_str()),
                };
                for (name, value) in &headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.force_send_body().send(body.as_bytes()),
                    None => builder.call(),
                }
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut builder = match method {
                    HttpMethod::Post => self.agent.post(url.as_str()),
                    _ => self.agent.put(url.as_str()),
                };
                for (name, value) in &headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // A body that cannot be read in full is a transport failure, never an
        // empty payload.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_vec()
            .map_err(|e| {
                warn!(%method, %url, status, error = %e, "failed to read response body");
                TransportError(format!("failed to read response body: {e}"))
            })?;
        // Invalid UTF-8 cannot be JSON; it is passed on as an empty body.
        let body = String::from_utf8(bytes).unwrap_or_else(|e| {
            warn!(%method, %url, status, error = %e, "response body is not UTF-8, discarding it");
            String::new()
        });

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
