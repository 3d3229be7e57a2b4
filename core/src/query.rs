//! Query-string construction.
//!
//! A `Query` is an ordered list of key/value pairs. Values that are `null`
//! or the empty string are dropped when encoding; everything else is
//! coerced to text and form-urlencoded, so `"Dr. Khan"` becomes `Dr.+Khan`.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pairs: Vec<(String, Value)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `insert`.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, replacing an earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Build a query from any value that serializes to a JSON object, e.g. a
    /// filter struct. Field order is preserved.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        match serde_json::to_value(value).map_err(|e| ApiError::Serialization(e.to_string()))? {
            Value::Object(map) => Ok(Self {
                pairs: map.into_iter().collect(),
            }),
            Value::Null => Ok(Self::new()),
            other => Err(ApiError::Serialization(format!(
                "query must serialize to an object, got {other}"
            ))),
        }
    }

    /// True when no pair survives filtering.
    pub fn is_empty(&self) -> bool {
        self.retained().next().is_none()
    }

    /// Encoded query string without the leading `?`, or `None` when every
    /// pair was filtered out.
    pub fn encode(&self) -> Option<String> {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for (key, value) in self.retained() {
            serializer.append_pair(key, &value);
            any = true;
        }
        any.then(|| serializer.finish())
    }

    fn retained(&self) -> impl Iterator<Item = (&str, String)> {
        self.pairs.iter().filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            other => Some((key.as_str(), coerce(other))),
        })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (key, value) in iter {
            query.insert(key, value);
        }
        query
    }
}

fn coerce(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::Array(items) => items.iter().map(coerce).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

// Integral floats print without a fraction, so `4.0` is sent as `4`.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{f:.0}")
            }
        }
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_query_encodes_to_none() {
        assert_eq!(Query::new().encode(), None);
        assert!(Query::new().is_empty());
    }

    #[test]
    fn null_and_empty_values_are_dropped() {
        let query = Query::new()
            .param("doctor", "Dr. Khan")
            .param("status", "")
            .param("petId", Value::Null)
            .param("owner", None::<String>);
        assert_eq!(query.encode().as_deref(), Some("doctor=Dr.+Khan"));
    }

    #[test]
    fn only_filtered_values_is_empty() {
        let query = Query::new().param("status", "").param("x", Value::Null);
        assert!(query.is_empty());
        assert_eq!(query.encode(), None);
    }

    #[test]
    fn scalars_are_coerced_to_text() {
        let query = Query::new()
            .param("limit", 10)
            .param("cascade", true)
            .param("weight", 4.5)
            .param("zero", 0)
            .param("off", false);
        assert_eq!(
            query.encode().as_deref(),
            Some("limit=10&cascade=true&weight=4.5&zero=0&off=false")
        );
    }

    #[test]
    fn integral_floats_drop_the_fraction() {
        let query = Query::new()
            .param("weight", 4.0)
            .param("neg", -12.0)
            .param("zero", -0.0)
            .param("big", 1e20)
            .param("half", 0.5);
        assert_eq!(
            query.encode().as_deref(),
            Some("weight=4&neg=-12&zero=0&big=100000000000000000000&half=0.5")
        );
    }

    #[test]
    fn arrays_join_with_commas() {
        let query = Query::new().param("ids", json!(["a", 1, true]));
        assert_eq!(query.encode().as_deref(), Some("ids=a%2C1%2Ctrue"));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut query = Query::new().param("a", "1").param("b", "2");
        query.insert("a", "3");
        assert_eq!(query.encode().as_deref(), Some("a=3&b=2"));
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let query = Query::new().param("q", "a&b=c/d");
        assert_eq!(query.encode().as_deref(), Some("q=a%26b%3Dc%2Fd"));
    }

    #[test]
    fn from_serialize_keeps_field_order() {
        #[derive(Serialize)]
        struct Filter<'a> {
            status: &'a str,
            doctor: Option<&'a str>,
            owner: &'a str,
        }
        let query = Query::from_serialize(&Filter {
            status: "confirmed",
            doctor: None,
            owner: "u1",
        })
        .unwrap();
        assert_eq!(query.encode().as_deref(), Some("status=confirmed&owner=u1"));
    }

    #[test]
    fn from_serialize_rejects_non_objects() {
        let err = Query::from_serialize(&[1, 2]).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn collects_from_pairs() {
        let query: Query = vec![("role", "doctor"), ("name", "")].into_iter().collect();
        assert_eq!(query.encode().as_deref(), Some("role=doctor"));
    }
}
