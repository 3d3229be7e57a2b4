//! Request builder, response parser and executor for the PawEver API.
//!
//! # Design
//! `PawEverClient` holds only a base URL and a transport and carries no
//! mutable state between calls. Each backend capability has a `build_*`
//! method that produces an `HttpRequest` without I/O, and an executing
//! method of the same name minus the prefix that runs the request through
//! the transport and `parse_response`. Every response, whatever the
//! endpoint, is normalized the same way.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config;
use crate::envelope::Envelope;
use crate::error::{ApiError, GENERIC_FAILURE_MESSAGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::query::Query;
use crate::transport::{Transport, UreqTransport};

const CONTENT_TYPE: &str = "content-type";
const APPLICATION_JSON: &str = "application/json";

/// One invocation of a backend endpoint, before it is turned into a request.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointCall {
    pub method: HttpMethod,
    pub path: String,
    pub query: Query,
    pub body: Option<Value>,
}

impl EndpointCall {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn with_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }
}

/// Extra per-request settings supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Merged over the default `content-type` header; a caller header with
    /// the same name (any case) replaces the default.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Stateless client for the PawEver backend.
#[derive(Debug, Clone)]
pub struct PawEverClient<T = UreqTransport> {
    base_url: String,
    transport: T,
}

impl PawEverClient<UreqTransport> {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::new())
    }

    /// Client bound to the process-wide configured base URL.
    pub fn from_env() -> Self {
        Self::new(config::base_url())
    }
}

impl<T> PawEverClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Turn an endpoint call into a concrete request.
    pub fn build(&self, call: &EndpointCall, options: &RequestOptions) -> HttpRequest {
        let mut url = format!("{}{}", self.base_url, call.path);
        if let Some(query) = call.query.encode() {
            url.push('?');
            url.push_str(&query);
        }

        let mut headers = vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())];
        for (name, value) in &options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            headers.push((name.clone(), value.clone()));
        }

        HttpRequest {
            method: call.method,
            url,
            headers,
            body: call.body.as_ref().map(Value::to_string),
        }
    }

    pub fn build_register_user<B: Serialize + ?Sized>(&self, body: &B) -> Result<HttpRequest, ApiError> {
        let call = EndpointCall::new(HttpMethod::Post, "/api/auth/register").with_body(body)?;
        Ok(self.build(&call, &RequestOptions::default()))
    }

    pub fn build_login_user<B: Serialize + ?Sized>(&self, body: &B) -> Result<HttpRequest, ApiError> {
        let call = EndpointCall::new(HttpMethod::Post, "/api/auth/login").with_body(body)?;
        Ok(self.build(&call, &RequestOptions::default()))
    }

    pub fn build_create_appointment<B: Serialize + ?Sized>(&self, body: &B) -> Result<HttpRequest, ApiError> {
        let call = EndpointCall::new(HttpMethod::Post, "/api/appointments").with_body(body)?;
        Ok(self.build(&call, &RequestOptions::default()))
    }

    pub fn build_list_appointments(&self, query: &Query) -> HttpRequest {
        let call = EndpointCall::new(HttpMethod::Get, "/api/appointments").with_query(query.clone());
        self.build(&call, &RequestOptions::default())
    }

    pub fn build_update_appointment_by_id<B: Serialize + ?Sized>(
        &self,
        id: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let path = format!("/api/appointments/{}", encode_segment(id));
        let call = EndpointCall::new(HttpMethod::Put, path).with_body(body)?;
        Ok(self.build(&call, &RequestOptions::default()))
    }

    pub fn build_list_pets(&self, query: &Query) -> HttpRequest {
        let call = EndpointCall::new(HttpMethod::Get, "/api/pets").with_query(query.clone());
        self.build(&call, &RequestOptions::default())
    }

    pub fn build_create_pet<B: Serialize + ?Sized>(&self, body: &B) -> Result<HttpRequest, ApiError> {
        let call = EndpointCall::new(HttpMethod::Post, "/api/pets").with_body(body)?;
        Ok(self.build(&call, &RequestOptions::default()))
    }

    pub fn build_delete_pet_by_id(&self, id: &str, query: &Query) -> HttpRequest {
        let path = format!("/api/pets/{}", encode_segment(id));
        let call = EndpointCall::new(HttpMethod::Delete, path).with_query(query.clone());
        self.build(&call, &RequestOptions::default())
    }

    pub fn build_get_user_profile(&self, id: &str) -> HttpRequest {
        let path = format!("/api/users/{}/profile", encode_segment(id));
        self.build(&EndpointCall::new(HttpMethod::Get, path), &RequestOptions::default())
    }

    pub fn build_update_user_profile<B: Serialize + ?Sized>(
        &self,
        id: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let path = format!("/api/users/{}/profile", encode_segment(id));
        let call = EndpointCall::new(HttpMethod::Put, path).with_body(body)?;
        Ok(self.build(&call, &RequestOptions::default()))
    }

    pub fn build_list_users(&self, query: &Query) -> HttpRequest {
        let call = EndpointCall::new(HttpMethod::Get, "/api/users").with_query(query.clone());
        self.build(&call, &RequestOptions::default())
    }

    pub fn build_create_consultation<B: Serialize + ?Sized>(&self, body: &B) -> Result<HttpRequest, ApiError> {
        let call = EndpointCall::new(HttpMethod::Post, "/api/consultations").with_body(body)?;
        Ok(self.build(&call, &RequestOptions::default()))
    }

    /// Normalize a response: 2xx yields the parsed payload, anything else an
    /// `ApiError::Http` carrying the backend's `message` or a generic one.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Envelope, ApiError> {
        let (envelope, parse_error) = Envelope::from_body(&response.body);
        if let Some(e) = parse_error {
            warn!(status = response.status, error = %e, "response body is not JSON, using empty object");
        }

        if response.is_success() {
            return Ok(envelope);
        }

        Err(ApiError::Http {
            status: response.status,
            message: envelope
                .message()
                .unwrap_or(GENERIC_FAILURE_MESSAGE)
                .to_string(),
        })
    }
}

impl<T: Transport> PawEverClient<T> {
    /// Execute an arbitrary endpoint call with caller-supplied options.
    pub fn request(&self, call: &EndpointCall, options: &RequestOptions) -> Result<Envelope, ApiError> {
        self.send(self.build(call, options))
    }

    /// Execute an already-built request.
    pub fn send(&self, request: HttpRequest) -> Result<Envelope, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "sending request");

        let response = self.transport.execute(request).map_err(|e| {
            warn!(%method, %url, error = %e, "backend unreachable");
            ApiError::connection(&self.base_url, e)
        })?;

        debug!(%method, %url, status = response.status, "received response");
        self.parse_response(response)
    }

    pub fn register_user<B: Serialize + ?Sized>(&self, body: &B) -> Result<Envelope, ApiError> {
        self.send(self.build_register_user(body)?)
    }

    pub fn login_user<B: Serialize + ?Sized>(&self, body: &B) -> Result<Envelope, ApiError> {
        self.send(self.build_login_user(body)?)
    }

    pub fn create_appointment<B: Serialize + ?Sized>(&self, body: &B) -> Result<Envelope, ApiError> {
        self.send(self.build_create_appointment(body)?)
    }

    pub fn list_appointments(&self, query: &Query) -> Result<Envelope, ApiError> {
        self.send(self.build_list_appointments(query))
    }

    pub fn update_appointment_by_id<B: Serialize + ?Sized>(&self, id: &str, body: &B) -> Result<Envelope, ApiError> {
        self.send(self.build_update_appointment_by_id(id, body)?)
    }

    pub fn list_pets(&self, query: &Query) -> Result<Envelope, ApiError> {
        self.send(self.build_list_pets(query))
    }

    pub fn create_pet<B: Serialize + ?Sized>(&self, body: &B) -> Result<Envelope, ApiError> {
        self.send(self.build_create_pet(body)?)
    }

    pub fn delete_pet_by_id(&self, id: &str, query: &Query) -> Result<Envelope, ApiError> {
        self.send(self.build_delete_pet_by_id(id, query))
    }

    pub fn get_user_profile(&self, id: &str) -> Result<Envelope, ApiError> {
        self.send(self.build_get_user_profile(id))
    }

    pub fn update_user_profile<B: Serialize + ?Sized>(&self, id: &str, body: &B) -> Result<Envelope, ApiError> {
        self.send(self.build_update_user_profile(id, body)?)
    }

    pub fn list_users(&self, query: &Query) -> Result<Envelope, ApiError> {
        self.send(self.build_list_users(query))
    }

    pub fn create_consultation<B: Serialize + ?Sized>(&self, body: &B) -> Result<Envelope, ApiError> {
        self.send(self.build_create_consultation(body)?)
    }
}

/// Percent-encode an id so it stays a single path segment.
fn encode_segment(id: &str) -> String {
    // The form encoder writes spaces as `+` and escapes a literal `+` as `%2B`.
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
