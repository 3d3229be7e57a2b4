//! The JSON payload returned by the backend.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Opaque JSON payload. Only the conventional `message` and `user` keys are
/// given accessors; everything else is reached through `get` or `decode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(Value);

impl Envelope {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a response body. Empty or malformed bodies yield the empty
    /// object. A non-empty body that fails to parse also returns the parse
    /// error so the caller can report it.
    pub(crate) fn from_body(body: &str) -> (Self, Option<serde_json::Error>) {
        if body.trim().is_empty() {
            return (Self::default(), None);
        }
        match serde_json::from_str(body) {
            Ok(value) => (Self(value), None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.0.get("message").and_then(Value::as_str)
    }

    pub fn user(&self) -> Option<&Value> {
        self.0.get("user")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Decode the whole payload into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        T::deserialize(&self.0).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Decode a single field into `T`.
    pub fn decode_field<T: DeserializeOwned>(&self, key: &str) -> Result<T, ApiError> {
        let field = self
            .0
            .get(key)
            .ok_or_else(|| ApiError::Decode(format!("missing field `{key}`")))?;
        T::deserialize(field).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self(Value::Object(Map::new()))
    }
}

impl From<Value> for Envelope {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_is_empty_object() {
        let (envelope, err) = Envelope::from_body("");
        assert_eq!(envelope.as_value(), &json!({}));
        assert!(err.is_none());
    }

    #[test]
    fn malformed_body_is_empty_object_with_error() {
        let (envelope, err) = Envelope::from_body("<html>oops</html>");
        assert_eq!(envelope, Envelope::default());
        assert!(err.is_some());
    }

    #[test]
    fn arrays_pass_through() {
        let (envelope, _) = Envelope::from_body(r#"[{"id":"p1"}]"#);
        assert_eq!(envelope.as_value(), &json!([{"id": "p1"}]));
        assert_eq!(envelope.message(), None);
    }

    #[test]
    fn conventional_keys() {
        let envelope = Envelope::new(json!({
            "message": "Login successful",
            "user": {"id": "u1", "role": "doctor"}
        }));
        assert_eq!(envelope.message(), Some("Login successful"));
        assert_eq!(envelope.user().unwrap()["role"], "doctor");
    }

    #[test]
    fn non_string_message_is_ignored() {
        let envelope = Envelope::new(json!({"message": 42}));
        assert_eq!(envelope.message(), None);
    }

    #[test]
    fn decode_field_reports_missing_key() {
        #[derive(Debug, Deserialize)]
        struct Pet {
            name: String,
        }
        let envelope = Envelope::new(json!({"pet": {"name": "Milo"}}));
        let pet: Pet = envelope.decode_field("pet").unwrap();
        assert_eq!(pet.name, "Milo");
        let err = envelope.decode_field::<Pet>("pets").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
