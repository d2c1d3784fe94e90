//! Deep merge of configuration layers.
//!
//! Mappings merge key by key; everything else (scalars, sequences, nulls)
//! replaces the earlier value wholesale.

use serde_json::{Map, Value};

/// Deep merge two values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Keys present on only one side are kept
/// - Any other collision takes the overlay value verbatim, including an
///   object replaced by a scalar, a sequence or `null`
///
/// # Example
/// ```
/// use serde_json::json;
/// use dp_common::config::deep_merge;
///
/// let base = json!({
///     "kafka": { "bootstrap_servers": "localhost:9092", "acks": "all" },
///     "topics": ["a", "b"]
/// });
/// let overlay = json!({
///     "kafka": { "bootstrap_servers": "kafka.prod:9092" },
///     "topics": ["c"]
/// });
/// let merged = deep_merge(base, overlay);
/// assert_eq!(
///     merged,
///     json!({
///         "kafka": { "bootstrap_servers": "kafka.prod:9092", "acks": "all" },
///         "topics": ["c"]
///     })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge multiple layers in order, with later layers taking precedence.
///
/// Folds `deep_merge` starting from an empty mapping, so no layers at all
/// yields `{}`.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values
        .into_iter()
        .fold(Value::Object(Map::new()), deep_merge)
}
