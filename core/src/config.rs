//! Process-wide base URL configuration.

use std::env::var;
use std::sync::LazyLock;

/// Environment variable selecting the backend root.
pub const API_BASE_URL_ENV_VAR: &str = "PAWEVER_API_BASE_URL";

/// Used when `PAWEVER_API_BASE_URL` is unset or blank.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

// Read once on first use; never written afterwards.
static BASE_URL: LazyLock<String> =
    LazyLock::new(|| resolve_base_url(var(API_BASE_URL_ENV_VAR).ok().as_deref()));

/// The configured base URL.
pub fn base_url() -> &'static str {
    &BASE_URL
}

/// Normalize a configured value, falling back to the default.
pub fn resolve_base_url(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.trim_end_matches('/').to_string(),
        _ => DEFAULT_API_BASE_URL.to_string(),
    }
}
