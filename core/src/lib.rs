//! Client core for the PawEver veterinary-clinic API.
//!
//! # Overview
//! Turns typed application intents (login, register, appointments, pets,
//! profiles, users, consultations) into HTTP requests against a configured
//! base URL and normalizes every outcome into an `Envelope` or an
//! `ApiError`.
//!
//! # Design
//! - `PawEverClient` is stateless: a base URL plus a `Transport`.
//! - Each operation has a `build_*` method (request as plain data) and an
//!   executing method that runs build, transport and `parse_response`.
//! - Responses are opaque JSON; only `message` and `user` are interpreted.
//! - `screen::Session` models front-end navigation as a state machine fed by
//!   the `user` of a successful auth call.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod query;
pub mod screen;
pub mod transport;
pub mod types;

pub use client::{EndpointCall, PawEverClient, RequestOptions};
pub use envelope::Envelope;
pub use error::{ApiError, TransportError, GENERIC_FAILURE_MESSAGE};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::Query;
pub use screen::{Event, NavigationError, Screen, Session};
pub use transport::{Transport, UreqTransport};
pub use types::{LoginUser, RegisterUser, Role, UnknownRole};
