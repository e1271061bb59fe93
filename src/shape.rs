//! Result-shape classification and normalization.
//!
//! Raw task results arrive in heterogeneous shapes: single domain objects,
//! lists of objects, or plain scalars. The predicates here decide which
//! normalization path applies, and the conversion functions produce plain
//! key/value mappings, optionally threading a request-correlation id into
//! each produced mapping.
//!
//! Classification operates on the *stored* result, never on the raw
//! transport response. Booleans, numbers, and text are never object-like,
//! so primitives pass through normalization untouched.

use serde_json::Value;

use crate::constants::REQUEST_ID_KEY;

/// Returns `true` if the value is a sequence of items.
pub fn is_listlike(value: &Value) -> bool {
    value.is_array()
}

/// Returns `true` if the value is a single object.
///
/// Booleans, numbers, text, and null are non-object by construction, so
/// they can never be mis-converted to mappings.
pub fn is_objlike(value: &Value) -> bool {
    value.is_object()
}

/// Converts one object-like value to a plain mapping.
///
/// When `request_id` is present it is merged into the mapping under
/// [`REQUEST_ID_KEY`](crate::constants::REQUEST_ID_KEY). Non-object values
/// are returned unchanged.
///
/// # Examples
///
/// ```
/// use cloud_tasks::shape::obj_to_dict;
/// use serde_json::json;
///
/// let server = json!({"id": 1, "name": "web-0"});
/// let dict = obj_to_dict(&server, Some("req-42"));
/// assert_eq!(dict["id"], 1);
/// assert_eq!(dict["request_id"], "req-42");
/// ```
pub fn obj_to_dict(obj: &Value, request_id: Option<&str>) -> Value {
    match obj {
        Value::Object(map) => {
            let mut out = map.clone();
            if let Some(id) = request_id {
                out.insert(REQUEST_ID_KEY.to_string(), Value::String(id.to_string()));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// Converts a list of object-like values to a list of plain mappings.
///
/// Order and length are preserved. Each element goes through
/// [`obj_to_dict`]; non-object elements pass through unchanged.
pub fn obj_list_to_dict(list: &Value, request_id: Option<&str>) -> Value {
    match list {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| obj_to_dict(item, request_id))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Shape-based normalization of a stored task result.
///
/// - list-like results map each element to a mapping,
/// - object-like results convert to a single mapping,
/// - everything else (primitives, text, numbers, booleans) is identity.
///
/// # Examples
///
/// ```
/// use cloud_tasks::shape::normalize;
/// use serde_json::json;
///
/// assert_eq!(normalize(&json!(true), None), json!(true));
/// assert_eq!(normalize(&json!("ACTIVE"), None), json!("ACTIVE"));
///
/// let out = normalize(&json!([{"id": 1}, {"id": 2}]), Some("req-1"));
/// assert_eq!(out[0]["request_id"], "req-1");
/// assert_eq!(out[1]["id"], 2);
/// ```
pub fn normalize(result: &Value, request_id: Option<&str>) -> Value {
    if is_listlike(result) {
        obj_list_to_dict(result, request_id)
    } else if is_objlike(result) {
        obj_to_dict(result, request_id)
    } else {
        result.clone()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn classifier_predicates() {
        assert!(is_listlike(&json!([1, 2])));
        assert!(!is_listlike(&json!({"a": 1})));

        assert!(is_objlike(&json!({"a": 1})));
        assert!(!is_objlike(&json!(true)));
        assert!(!is_objlike(&json!(3)));
        assert!(!is_objlike(&json!(3.5)));
        assert!(!is_objlike(&json!("text")));
        assert!(!is_objlike(&json!(null)));
    }

    #[test]
    fn scalars_normalize_to_themselves() {
        for scalar in [json!(true), json!(false), json!(7), json!(2.5), json!("id")] {
            assert_eq!(normalize(&scalar, Some("req-9")), scalar);
        }
        assert_eq!(normalize(&json!(null), None), json!(null));
    }

    #[test]
    fn object_normalization_merges_request_id() {
        let out = normalize(&json!({"id": 1}), Some("req-7"));
        assert_eq!(out, json!({"id": 1, "request_id": "req-7"}));

        // Without an id the mapping is unchanged.
        let out = normalize(&json!({"id": 1}), None);
        assert_eq!(out, json!({"id": 1}));
    }

    #[test]
    fn list_normalization_preserves_order_and_length() {
        let input = json!([{"id": 3}, {"id": 1}, {"id": 2}]);
        let out = normalize(&input, None);
        let items = out.as_array().expect("array out");
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["id"], 3);
        assert_eq!(items[1]["id"], 1);
        assert_eq!(items[2]["id"], 2);
    }

    #[test]
    fn list_normalization_threads_request_id_into_each_element() {
        let out = normalize(&json!([{"id": 1}, {"id": 2}]), Some("req-1"));
        for item in out.as_array().expect("array out") {
            assert_eq!(item["request_id"], "req-1");
        }
    }

    #[test]
    fn list_of_scalars_passes_elements_through() {
        let input = json!(["a", "b"]);
        assert_eq!(normalize(&input, Some("req-1")), input);
    }
}
