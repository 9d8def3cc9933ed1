use serde_json::Value;

/// Recursively merges `source` into `target`, last writer wins per field.
///
/// - objects merge key by key, recursing into keys present on both sides
/// - arrays merge index by index; extra `source` elements are appended
/// - `null` in `source` means "absent" and leaves `target` untouched
/// - any other `source` value replaces the `target` value
pub fn deep_merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (_, Value::Null) => {}
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                match target_map.get_mut(key) {
                    Some(target_value) => deep_merge(target_value, source_value),
                    None => {
                        if !source_value.is_null() {
                            target_map.insert(key.clone(), source_value.clone());
                        }
                    }
                }
            }
        }
        (Value::Array(target_items), Value::Array(source_items)) => {
            for (index, source_value) in source_items.iter().enumerate() {
                match target_items.get_mut(index) {
                    Some(target_value) => deep_merge(target_value, source_value),
                    None => target_items.push(source_value.clone()),
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

/// Folds `layers` left to right with [`deep_merge`], starting from an empty object.
#[must_use]
pub fn merged<'a>(layers: impl IntoIterator<Item = &'a Value>) -> Value {
    let mut result = Value::Object(serde_json::Map::new());
    for layer in layers {
        deep_merge(&mut result, layer);
    }
    result
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{deep_merge, merged};

    #[test]
    fn later_layer_wins_field_by_field() {
        let defaults = json!({"a": 1, "nested": {"x": 1, "y": 2}});
        let user = json!({"nested": {"y": 5}});
        let result = merged([&defaults, &user]);
        assert_eq!(result, json!({"a": 1, "nested": {"x": 1, "y": 5}}));
    }

    #[test]
    fn arrays_merge_by_index() {
        let mut target = json!([{"a": 1, "b": 2}, {"a": 3}]);
        deep_merge(&mut target, &json!([{"b": 9}, null, {"c": 1}]));
        assert_eq!(target, json!([{"a": 1, "b": 9}, {"a": 3}, {"c": 1}]));
    }

    #[test]
    fn null_does_not_erase_defaults() {
        let mut target = json!({"label": "x"});
        deep_merge(&mut target, &json!({"label": null, "extra": null}));
        assert_eq!(target, json!({"label": "x"}));
    }

    #[test]
    fn scalar_replaces_object_and_vice_versa() {
        let mut target = json!({"min": {"type": "constant"}});
        deep_merge(&mut target, &json!({"min": 5}));
        assert_eq!(target, json!({"min": 5}));
    }
}
