//! `${NAME}` / `${NAME:default}` substitution in configuration values.
//!
//! Only string leaves are rewritten; mapping keys and non-string scalars
//! pass through untouched. There is no escaping and no nesting: a default
//! runs up to the first `}`.

use regex_lite::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::([^}]*))?\}").expect("variable pattern is valid")
});

/// Resolve variable references against the process environment.
pub fn resolve_env_vars(value: Value) -> Value {
    resolve_env_vars_with(value, &|name: &str| std::env::var(name).ok())
}

/// Resolve variable references using `lookup` in place of the environment.
///
/// A variable that `lookup` returns (even as an empty string) wins over the
/// default; an unknown variable without a default becomes `""`.
pub fn resolve_env_vars_with<F>(value: Value, lookup: &F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(s) => Value::String(substitute(&s, lookup)),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, v)| (key, resolve_env_vars_with(v, lookup)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| resolve_env_vars_with(v, lookup))
                .collect(),
        ),
        other => other,
    }
}

/// Substitute every token in a single string.
pub fn substitute<F>(input: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    VAR_PATTERN
        .replace_all(input, |caps: &Captures<'_>| {
            let name = &caps[1];
            lookup(name).unwrap_or_else(|| {
                caps.get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            })
        })
        .into_owned()
}

/// Whether a string still contains a variable reference.
pub fn has_reference(input: &str) -> bool {
    VAR_PATTERN.is_match(input)
}
