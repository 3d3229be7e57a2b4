//! Checks the exact requests the client emits and how canned responses are
//! normalized, using a recording transport instead of a server.

use std::sync::Mutex;

use pawever_core::{
    ApiError, EndpointCall, Envelope, HttpMethod, HttpRequest, HttpResponse, PawEverClient, Query,
    RequestOptions, TransportError, GENERIC_FAILURE_MESSAGE,
};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:5000";

/// Records every request and answers with a fixed status and body.
struct Recorder {
    requests: Mutex<Vec<HttpRequest>>,
    status: u16,
    body: String,
}

impl Recorder {
    fn new(status: u16, body: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            status,
            body: body.to_string(),
        }
    }

    fn last(&self) -> HttpRequest {
        self.requests.lock().unwrap().last().cloned().expect("no request recorded")
    }
}

impl pawever_core::Transport for Recorder {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        Ok(HttpResponse {
            status: self.status,
            headers: Vec::new(),
            body: self.body.clone(),
        })
    }
}

fn client(status: u16, body: &str) -> PawEverClient<Recorder> {
    PawEverClient::with_transport(BASE_URL, Recorder::new(status, body))
}

#[test]
fn list_appointments_omits_empty_status() {
    let c = client(200, r#"{"appointments":[]}"#);
    c.list_appointments(&Query::new().param("doctor", "Dr. Khan").param("status", ""))
        .unwrap();
    let req = c.transport().last();
    assert_eq!(req.method, HttpMethod::Get);
    assert_eq!(req.url, format!("{BASE_URL}/api/appointments?doctor=Dr.+Khan"));
}

#[test]
fn delete_pet_with_empty_query_has_no_query_string() {
    let c = client(200, r#"{"message":"Pet deleted"}"#);
    c.delete_pet_by_id("p1", &Query::new()).unwrap();
    let req = c.transport().last();
    assert_eq!(req.method, HttpMethod::Delete);
    assert_eq!(req.url, format!("{BASE_URL}/api/pets/p1"));
    assert!(req.body.is_none());
}

#[test]
fn login_against_401_fails_with_backend_message() {
    let c = client(401, r#"{"message":"Invalid credentials"}"#);
    let err = c
        .login_user(&json!({"email": "a@b.com", "password": "x", "role": "doctor"}))
        .unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 401, .. }));
    assert_eq!(err.to_string(), "Invalid credentials");

    let req = c.transport().last();
    assert_eq!(req.url, format!("{BASE_URL}/api/auth/login"));
    let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(sent, json!({"email": "a@b.com", "password": "x", "role": "doctor"}));
}

#[test]
fn endpoint_table() {
    let c = client(200, "{}");
    let empty = Query::new();
    let body = json!({"k": "v"});

    let check = |method: HttpMethod, path: &str, result: Result<Envelope, ApiError>| {
        result.unwrap();
        let req = c.transport().last();
        assert_eq!(req.method, method, "{path}");
        assert_eq!(req.url, format!("{BASE_URL}{path}"), "{path}");
        assert_eq!(req.header("content-type"), Some("application/json"), "{path}");
        let has_body = matches!(method, HttpMethod::Post | HttpMethod::Put);
        assert_eq!(req.body.is_some(), has_body, "{path}");
    };

    check(HttpMethod::Post, "/api/auth/register", c.register_user(&body));
    check(HttpMethod::Post, "/api/auth/login", c.login_user(&body));
    check(HttpMethod::Post, "/api/appointments", c.create_appointment(&body));
    check(HttpMethod::Get, "/api/appointments", c.list_appointments(&empty));
    check(HttpMethod::Put, "/api/appointments/a1", c.update_appointment_by_id("a1", &body));
    check(HttpMethod::Get, "/api/pets", c.list_pets(&empty));
    check(HttpMethod::Post, "/api/pets", c.create_pet(&body));
    check(HttpMethod::Delete, "/api/pets/p1", c.delete_pet_by_id("p1", &empty));
    check(HttpMethod::Get, "/api/users/u1/profile", c.get_user_profile("u1"));
    check(HttpMethod::Put, "/api/users/u1/profile", c.update_user_profile("u1", &body));
    check(HttpMethod::Get, "/api/users", c.list_users(&empty));
    check(HttpMethod::Post, "/api/consultations", c.create_consultation(&body));
}

#[test]
fn success_returns_payload_unchanged() {
    let payload = r#"{"user":{"id":"u1","name":"Ava"},"message":"Login successful","token":null}"#;
    let envelope = client(200, payload).login_user(&json!({})).unwrap();
    let expected: Value = serde_json::from_str(payload).unwrap();
    assert_eq!(envelope.as_value(), &expected);
    assert_eq!(envelope.into_value(), expected);
}

#[test]
fn empty_success_body_is_empty_object() {
    let envelope = client(200, "").list_users(&Query::new()).unwrap();
    assert_eq!(envelope.as_value(), &json!({}));
}

#[test]
fn failures_without_message_use_generic_text() {
    for (status, body) in [(500, ""), (503, "<html>Bad gateway</html>"), (404, r#"{"error":"x"}"#)] {
        let err = client(status, body).list_pets(&Query::new()).unwrap_err();
        assert_eq!(err.status(), Some(status));
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
    }
}

#[test]
fn generic_request_merges_caller_headers() {
    let c = client(200, "{}");
    let call = EndpointCall::new(HttpMethod::Get, "/api/pets")
        .with_query(Query::new().param("species", "cat"));
    let options = RequestOptions::default().header("Authorization", "Bearer t");
    c.request(&call, &options).unwrap();

    let req = c.transport().last();
    assert_eq!(req.url, format!("{BASE_URL}/api/pets?species=cat"));
    assert_eq!(req.header("authorization"), Some("Bearer t"));
    assert_eq!(req.header("content-type"), Some("application/json"));
}
