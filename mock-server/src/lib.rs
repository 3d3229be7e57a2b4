//! In-memory stand-in for the PawEver backend.
//!
//! Records are stored as JSON objects with a server-assigned `id`. Every
//! error response carries a `message` field, matching what the client
//! surfaces to users.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub type Record = Map<String, Value>;

#[derive(Debug, Default)]
pub struct Store {
    pub users: Vec<Record>,
    pub appointments: Vec<Record>,
    pub pets: Vec<Record>,
    pub consultations: Vec<Record>,
}

pub type Db = Arc<RwLock<Store>>;

type Reply = (StatusCode, Json<Value>);
type ApiResult = Result<Reply, Reply>;
type Payload = Result<Json<Record>, JsonRejection>;

// Fields the profile route must never overwrite.
const PROTECTED_USER_FIELDS: [&str; 4] = ["id", "email", "role", "password"];

pub fn app() -> Router {
    app_with_state(Db::default())
}

/// Router over an existing store, so tests can seed or inspect it.
pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/appointments", get(list_appointments).post(create_appointment))
        .route("/api/appointments/{id}", put(update_appointment))
        .route("/api/pets", get(list_pets).post(create_pet))
        .route("/api/pets/{id}", delete(delete_pet))
        .route("/api/users", get(list_users))
        .route("/api/users/{id}/profile", get(get_profile).put(update_profile))
        .route("/api/consultations", post(create_consultation))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn reply(status: StatusCode, body: Value) -> Reply {
    (status, Json(body))
}

fn failure(status: StatusCode, message: &str) -> Reply {
    reply(status, json!({ "message": message }))
}

/// Unwrap a JSON body, turning extractor rejections (malformed JSON, wrong
/// content type, non-object payload) into `{message}` replies.
fn json_body(payload: Payload) -> Result<Record, Reply> {
    payload
        .map(|Json(record)| record)
        .map_err(|rejection| failure(rejection.status(), &rejection.body_text()))
}

fn text<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A record matches when every filter value equals its field's text form.
fn matches(record: &Record, filters: &HashMap<String, String>) -> bool {
    filters
        .iter()
        .all(|(key, wanted)| record.get(key).is_some_and(|v| coerce(v) == *wanted))
}

fn insert_with_id(mut record: Record) -> Record {
    record.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    record
}

fn public_user(user: &Record) -> Value {
    let mut user = user.clone();
    user.remove("password");
    Value::Object(user)
}

async fn register(State(db): State<Db>, payload: Payload) -> ApiResult {
    let input = json_body(payload)?;
    let (Some(name), Some(email), Some(password), Some(role)) = (
        text(&input, "name"),
        text(&input, "email"),
        text(&input, "password"),
        text(&input, "role"),
    ) else {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "Name, email, password and role are required",
        ));
    };

    let mut store = db.write().await;
    if store
        .users
        .iter()
        .any(|u| text(u, "email").is_some_and(|e| e.eq_ignore_ascii_case(email)))
    {
        return Err(failure(StatusCode::CONFLICT, "User already exists"));
    }

    let mut user = Record::new();
    user.insert("name".to_string(), json!(name));
    user.insert("email".to_string(), json!(email));
    user.insert("password".to_string(), json!(password));
    user.insert("role".to_string(), json!(role));
    let user = insert_with_id(user);
    info!(email, role, "registered user");

    let body = json!({ "message": "Registration successful", "user": public_user(&user) });
    store.users.push(user);
    Ok(reply(StatusCode::CREATED, body))
}

async fn login(State(db): State<Db>, payload: Payload) -> ApiResult {
    let input = json_body(payload)?;
    let store = db.read().await;
    let found = store.users.iter().find(|u| {
        ["email", "password", "role"]
            .iter()
            .all(|key| text(u, key).is_some() && text(u, key) == text(&input, key))
    });
    match found {
        Some(user) => Ok(reply(
            StatusCode::OK,
            json!({ "message": "Login successful", "user": public_user(user) }),
        )),
        None => {
            debug!("rejected login");
            Err(failure(StatusCode::UNAUTHORIZED, "Invalid credentials"))
        }
    }
}

async fn list_appointments(
    State(db): State<Db>,
    Query(filters): Query<HashMap<String, String>>,
) -> Json<Value> {
    let store = db.read().await;
    let items: Vec<Value> = store
        .appointments
        .iter()
        .filter(|a| matches(a, &filters))
        .cloned()
        .map(Value::Object)
        .collect();
    Json(json!({ "appointments": items }))
}

async fn create_appointment(State(db): State<Db>, payload: Payload) -> ApiResult {
    let input = json_body(payload)?;
    if input.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Appointment details are required"));
    }
    let mut appointment = insert_with_id(input);
    appointment
        .entry("status")
        .or_insert_with(|| json!("pending"));
    let body = json!({ "message": "Appointment created", "appointment": appointment });
    db.write().await.appointments.push(appointment);
    Ok(reply(StatusCode::CREATED, body))
}

async fn update_appointment(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Payload,
) -> ApiResult {
    let input = json_body(payload)?;
    let mut store = db.write().await;
    let appointment = store
        .appointments
        .iter_mut()
        .find(|a| text(a, "id") == Some(id.as_str()))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Appointment not found"))?;
    for (key, value) in input {
        if key != "id" {
            appointment.insert(key, value);
        }
    }
    Ok(reply(
        StatusCode::OK,
        json!({ "message": "Appointment updated", "appointment": appointment }),
    ))
}

async fn list_pets(
    State(db): State<Db>,
    Query(filters): Query<HashMap<String, String>>,
) -> Json<Value> {
    let store = db.read().await;
    let items: Vec<Value> = store
        .pets
        .iter()
        .filter(|p| matches(p, &filters))
        .cloned()
        .map(Value::Object)
        .collect();
    Json(json!({ "pets": items }))
}

async fn create_pet(State(db): State<Db>, payload: Payload) -> ApiResult {
    let input = json_body(payload)?;
    if text(&input, "name").is_none() {
        return Err(failure(StatusCode::BAD_REQUEST, "Pet name is required"));
    }
    let pet = insert_with_id(input);
    let body = json!({ "message": "Pet added", "pet": pet });
    db.write().await.pets.push(pet);
    Ok(reply(StatusCode::CREATED, body))
}

async fn delete_pet(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(flags): Query<HashMap<String, String>>,
) -> ApiResult {
    let mut store = db.write().await;
    let before = store.pets.len();
    store.pets.retain(|p| text(p, "id") != Some(id.as_str()));
    if store.pets.len() == before {
        return Err(failure(StatusCode::NOT_FOUND, "Pet not found"));
    }

    let mut removed = 0;
    if flags.get("cascade").is_some_and(|v| v == "true") {
        let before = store.appointments.len();
        store
            .appointments
            .retain(|a| text(a, "petId") != Some(id.as_str()));
        removed = before - store.appointments.len();
    }
    info!(pet = %id, appointments = removed, "deleted pet");
    Ok(reply(
        StatusCode::OK,
        json!({ "message": "Pet deleted", "deletedAppointments": removed }),
    ))
}

async fn list_users(
    State(db): State<Db>,
    Query(filters): Query<HashMap<String, String>>,
) -> Json<Value> {
    let store = db.read().await;
    let users: Vec<Value> = store
        .users
        .iter()
        // Never filter on the stored password.
        .filter(|u| !filters.contains_key("password") && matches(u, &filters))
        .map(public_user)
        .collect();
    Json(json!({ "users": users }))
}

async fn get_profile(State(db): State<Db>, Path(id): Path<String>) -> ApiResult {
    let store = db.read().await;
    store
        .users
        .iter()
        .find(|u| text(u, "id") == Some(id.as_str()))
        .map(|u| reply(StatusCode::OK, json!({ "user": public_user(u) })))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))
}

async fn update_profile(
    State(db): State<Db>,
    Path(id): Path<String>,
    payload: Payload,
) -> ApiResult {
    let input = json_body(payload)?;
    let mut store = db.write().await;
    let user = store
        .users
        .iter_mut()
        .find(|u| text(u, "id") == Some(id.as_str()))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))?;
    for (key, value) in input {
        if !PROTECTED_USER_FIELDS.contains(&key.as_str()) {
            user.insert(key, value);
        }
    }
    Ok(reply(
        StatusCode::OK,
        json!({ "message": "Profile updated", "user": public_user(user) }),
    ))
}

async fn create_consultation(State(db): State<Db>, payload: Payload) -> ApiResult {
    let input = json_body(payload)?;
    if input.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Consultation details are required"));
    }
    let consultation = insert_with_id(input);
    let body = json!({ "message": "Consultation saved", "consultation": consultation });
    db.write().await.consultations.push(consultation);
    Ok(reply(StatusCode::CREATED, body))
}
