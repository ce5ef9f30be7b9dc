//! Deep merge of fragment values.
//!
//! Later fragments override earlier ones key by key. Lists are replaced
//! wholesale, never concatenated.

use serde_json::Value;

/// Merge `overlay` on top of `base`.
///
/// - Objects merge recursively: keys in overlay override keys in base
/// - Lists, strings, numbers and booleans in overlay replace base entirely
/// - A `null` overlay keeps the base value
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold `deep_merge` over `values` in order.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_overrides_default_per_key() {
        let default = json!({"foo": "default", "def": "def", "zoo": {"buzz": "b", "fizz": "f"}});
        let primary = json!({"foo": "bar", "zoo": {"fizz": "F"}});
        assert_eq!(
            deep_merge(default, primary),
            json!({"foo": "bar", "def": "def", "zoo": {"buzz": "b", "fizz": "F"}})
        );
    }

    #[test]
    fn test_lists_are_replaced() {
        let result = deep_merge(json!({"items": [1, 2, 3]}), json!({"items": [4]}));
        assert_eq!(result, json!({"items": [4]}));
    }

    #[test]
    fn test_null_overlay_keeps_base() {
        let result = deep_merge(json!({"a": 1, "b": {"c": 2}}), json!({"a": null, "b": null}));
        assert_eq!(result, json!({"a": 1, "b": {"c": 2}}));
    }

    #[test]
    fn test_scalar_and_object_replace_each_other() {
        assert_eq!(
            deep_merge(json!({"v": 1}), json!({"v": {"nested": true}})),
            json!({"v": {"nested": true}})
        );
        assert_eq!(deep_merge(json!({"v": {"nested": true}}), json!({"v": 1})), json!({"v": 1}));
    }

    #[test]
    fn test_merge_all_in_priority_order() {
        let merged = deep_merge_all(vec![
            json!({"a": 1, "b": {"x": 1}}),
            json!({"b": {"y": 2}}),
            json!({"a": 3}),
        ]);
        assert_eq!(merged, json!({"a": 3, "b": {"x": 1, "y": 2}}));
    }
}
