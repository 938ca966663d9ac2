//! Pointer-style path addressing into the data model
//!
//! Paths are `/`-separated segments (`/user/profile/name`, `/items/0/value`).
//! A segment addresses an object key, or an array index when the container
//! is an array. The root is `/` or the empty string.
//!
//! Reads never fail: a missing key, an out-of-range index, or a traversal
//! through `null` all resolve to `None` ("absent"). Writes create any missing
//! intermediate containers as objects.

use serde_json::{Map, Value};

/// Most `null` slots a single write may append to an array
pub const MAX_ARRAY_PADDING: usize = 1024;

/// Split a path into its non-empty segments
///
/// Leading, trailing and repeated separators are ignored, so `/a//b/` and
/// `a/b` address the same location.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Returns `true` when the path addresses the root of the model
pub fn is_root_path(path: &str) -> bool {
    split_path(path).is_empty()
}

/// Read the value at `path`
///
/// Returns `None` when any segment is missing or when an intermediate value
/// is not a container. A stored JSON `null` at the final segment is returned
/// as `Some(Value::Null)`, which is distinct from absent.
///
/// # Example
///
/// ```rust
/// use dynui_core::data::get_by_path;
/// use serde_json::json;
///
/// let model = json!({"items": [{"value": 3}]});
/// assert_eq!(get_by_path(&model, "/items/0/value"), Some(&json!(3)));
/// assert_eq!(get_by_path(&model, "/items/5/value"), None);
/// ```
pub fn get_by_path<'a>(model: &'a Value, path: &str) -> Option<&'a Value> {
    split_path(path)
        .into_iter()
        .try_fold(model, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => parse_index(segment).and_then(|idx| items.get(idx)),
            _ => None,
        })
}

/// Write `value` at `path`, creating intermediate containers as needed
///
/// - Setting the root path is a no-op; the model is never replaced wholesale.
/// - Missing intermediates become empty objects.
/// - A scalar (or `null`) found mid-path is overwritten with a fresh object.
/// - Arrays are indexed in place. Writing past the end pads with `null`,
///   up to [`MAX_ARRAY_PADDING`] new slots.
/// - A non-numeric segment into an array, or an index too far past its end,
///   cannot be addressed; the write is dropped with a warning.
pub fn set_by_path(model: &mut Value, path: &str, value: Value) {
    let segments = split_path(path);
    let Some((last, parents)) = segments.split_last() else {
        tracing::debug!("Ignoring write to root path '{}'", path);
        return;
    };

    let mut current = model;
    for segment in parents {
        current = match descend(current, segment) {
            Some(next) => next,
            None => {
                tracing::warn!(
                    "Cannot write '{}': segment '{}' does not address an array slot",
                    path,
                    segment
                );
                return;
            }
        };
    }

    if !write_segment(current, last, value) {
        tracing::warn!(
            "Cannot write '{}': segment '{}' does not address an array slot",
            path,
            last
        );
    }
}

fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn ensure_container(value: &mut Value) {
    if !value.is_object() && !value.is_array() {
        *value = Value::Object(Map::new());
    }
}

/// Slot `idx` of `items`, padding with `null` when past the end
///
/// Returns `None` when `idx` lies more than [`MAX_ARRAY_PADDING`] slots
/// beyond the current length.
fn array_slot(items: &mut Vec<Value>, idx: usize) -> Option<&mut Value> {
    if idx >= items.len() {
        if idx - items.len() >= MAX_ARRAY_PADDING {
            return None;
        }
        items.resize(idx + 1, Value::Null);
    }
    items.get_mut(idx)
}

/// Step into the child container at `segment`, creating it when missing
fn descend<'a>(current: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    ensure_container(current);
    let child = match current {
        Value::Object(map) => map.entry(segment).or_insert(Value::Null),
        Value::Array(items) => array_slot(items, parse_index(segment)?)?,
        _ => return None,
    };
    ensure_container(child);
    Some(child)
}

fn write_segment(current: &mut Value, segment: &str, value: Value) -> bool {
    ensure_container(current);
    match current {
        Value::Object(map) => {
            map.insert(segment.to_string(), value);
            true
        }
        Value::Array(items) => {
            let Some(idx) = parse_index(segment) else {
                return false;
            };
            match array_slot(items, idx) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_path_ignores_empty_segments() {
        assert_eq!(split_path("/a//b/"), vec!["a", "b"]);
        assert_eq!(split_path("a/b"), vec!["a", "b"]);
        assert!(split_path("/").is_empty());
        assert!(split_path("").is_empty());
    }

    #[test]
    fn test_get_root_returns_model() {
        let model = json!({"a": 1});
        assert_eq!(get_by_path(&model, "/"), Some(&model));
        assert_eq!(get_by_path(&model, ""), Some(&model));
    }

    #[test]
    fn test_get_nested_object_and_array() {
        let model = json!({"user": {"profile": {"name": "Ada"}}, "items": [{"value": 10}]});
        assert_eq!(get_by_path(&model, "/user/profile/name"), Some(&json!("Ada")));
        assert_eq!(get_by_path(&model, "/items/0/value"), Some(&json!(10)));
    }

    #[test]
    fn test_get_absent_paths() {
        let model = json!({"a": null, "items": [1, 2], "s": "text"});
        assert_eq!(get_by_path(&model, "/missing"), None);
        assert_eq!(get_by_path(&model, "/a/b"), None);
        assert_eq!(get_by_path(&model, "/items/2"), None);
        assert_eq!(get_by_path(&model, "/items/-1"), None);
        assert_eq!(get_by_path(&model, "/items/first"), None);
        assert_eq!(get_by_path(&model, "/s/0"), None);
    }

    #[test]
    fn test_get_stored_null_is_present() {
        let model = json!({"a": null});
        assert_eq!(get_by_path(&model, "/a"), Some(&Value::Null));
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut model = json!({});
        set_by_path(&mut model, "/user/profile/name", json!("Ada"));
        assert_eq!(model, json!({"user": {"profile": {"name": "Ada"}}}));
    }

    #[test]
    fn test_set_overwrites_scalar_mid_path() {
        let mut model = json!({"user": "guest"});
        set_by_path(&mut model, "/user/name", json!("Ada"));
        assert_eq!(model, json!({"user": {"name": "Ada"}}));
    }

    #[test]
    fn test_set_root_is_noop() {
        let mut model = json!({"a": 1});
        set_by_path(&mut model, "/", json!({"b": 2}));
        set_by_path(&mut model, "", json!(3));
        assert_eq!(model, json!({"a": 1}));
    }

    #[test]
    fn test_set_indexes_existing_array() {
        let mut model = json!({"items": [{"value": 1}, {"value": 2}]});
        set_by_path(&mut model, "/items/1/value", json!(20));
        set_by_path(&mut model, "/items/3", json!("tail"));
        assert_eq!(
            model,
            json!({"items": [{"value": 1}, {"value": 20}, null, "tail"]})
        );
    }

    #[test]
    fn test_set_non_index_into_array_is_dropped() {
        let mut model = json!({"items": [1]});
        set_by_path(&mut model, "/items/name", json!("x"));
        assert_eq!(model, json!({"items": [1]}));
    }

    #[test]
    fn test_set_far_past_array_end_is_dropped() {
        let mut model = json!({"items": [1, 2]});
        set_by_path(&mut model, "/items/18446744073709551615", json!("x"));
        set_by_path(&mut model, "/items/100000000000", json!("x"));
        set_by_path(&mut model, "/items/100000000000/name", json!("x"));
        assert_eq!(model, json!({"items": [1, 2]}));
    }

    #[test]
    fn test_set_pads_up_to_limit() {
        let mut model = json!({"items": []});
        set_by_path(&mut model, &format!("/items/{}", MAX_ARRAY_PADDING - 1), json!("last"));
        let items = model["items"].as_array().unwrap();
        assert_eq!(items.len(), MAX_ARRAY_PADDING);
        assert_eq!(items[MAX_ARRAY_PADDING - 1], json!("last"));

        set_by_path(&mut model, &format!("/items/{}", 2 * MAX_ARRAY_PADDING), json!("far"));
        assert_eq!(model["items"].as_array().unwrap().len(), MAX_ARRAY_PADDING);
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let mut model = json!({"form": {"email": "old"}});
        for (path, value) in [
            ("/form/email", json!("new@example.com")),
            ("/flags/ready", json!(true)),
            ("/deep/a/b/c", json!([1, 2, 3])),
            ("x", Value::Null),
        ] {
            set_by_path(&mut model, path, value.clone());
            assert_eq!(get_by_path(&model, path), Some(&value), "path {}", path);
        }
    }
}
