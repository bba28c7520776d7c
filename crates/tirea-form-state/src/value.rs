//! In-memory JSON document model with pure path operations.
//!
//! `JsonValue` mirrors the JSON data model. Objects are kept as an ordered list
//! of entries so that fields render in insertion order and documents carrying
//! repeated keys survive a round trip. Lookups on repeated keys resolve to the
//! last occurrence, the same way JSON parsers do.

use crate::{
    error::{value_type_name, FormStateError, FormStateResult},
    path::seg_index,
    Path,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::fmt;

/// A JSON document node.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum JsonValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<JsonValue>),
    Object(Vec<(String, JsonValue)>),
}

impl JsonValue {
    /// An empty object.
    #[inline]
    pub fn object() -> Self {
        JsonValue::Object(Vec::new())
    }

    /// An empty array.
    #[inline]
    pub fn array() -> Self {
        JsonValue::Array(Vec::new())
    }

    /// Build a number from a float. Non-finite input yields `Null`.
    pub fn from_f64(f: f64) -> Self {
        Number::from_f64(f).map_or(JsonValue::Null, JsonValue::Number)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsonValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&[(String, JsonValue)]> {
        match self {
            JsonValue::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up an object member (last occurrence wins).
    pub fn get_key(&self, key: &str) -> Option<&JsonValue> {
        self.as_object()?
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Look up a direct child by segment: object key or array index.
    pub fn child(&self, seg: &str) -> Option<&JsonValue> {
        match self {
            JsonValue::Object(_) => self.get_key(seg),
            JsonValue::Array(items) => seg_index(seg).and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Get the node at `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tirea_form_state::{path, JsonValue};
    /// use serde_json::json;
    ///
    /// let doc = JsonValue::from(json!({"a": [{"b": 1}]}));
    /// assert_eq!(doc.get(&path!("a", 0, "b")).unwrap(), &JsonValue::from(json!(1)));
    /// assert!(doc.get(&path!("a", 1)).is_err());
    /// ```
    pub fn get(&self, path: &Path) -> FormStateResult<&JsonValue> {
        let mut current = self;
        for (depth, seg) in path.iter().enumerate() {
            current = current.child(seg).ok_or_else(|| {
                FormStateError::path_not_found(Path::from_segments(&path.segments()[..=depth]))
            })?;
        }
        Ok(current)
    }

    /// Return a new document with `value` placed at `path` (pure function).
    ///
    /// Missing intermediate containers are created: an array when the segment
    /// that will be applied to it is a decimal index, an object otherwise.
    /// Setting index `len` of an array appends.
    ///
    /// ```
    /// use tirea_form_state::{path, JsonValue};
    /// use serde_json::json;
    ///
    /// let doc = JsonValue::Null;
    /// let doc = doc.set(&path!("tags", 0), json!("a").into()).unwrap();
    /// assert_eq!(serde_json::Value::from(doc), json!({"tags": ["a"]}));
    /// ```
    pub fn set(&self, path: &Path, value: JsonValue) -> FormStateResult<JsonValue> {
        let mut result = self.clone();
        set_at_path(&mut result, path.segments(), value, path, 0)?;
        Ok(result)
    }

    /// Return a new document with the node at `path` removed (pure function).
    ///
    /// Deleting the root yields `None` ("no document"). Array elements after a
    /// removed index shift down by one.
    pub fn delete(&self, path: &Path) -> FormStateResult<Option<JsonValue>> {
        if path.is_root() {
            return Ok(None);
        }
        let mut result = self.clone();
        if delete_at_path(&mut result, path.segments()) {
            Ok(Some(result))
        } else {
            Err(FormStateError::path_not_found(path.clone()))
        }
    }

    /// Render as indented JSON text.
    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Container created for a missing node that `seg` is about to be applied to.
fn container_for(seg: &str) -> JsonValue {
    if seg_index(seg).is_some() {
        JsonValue::array()
    } else {
        JsonValue::object()
    }
}

fn set_at_path(
    current: &mut JsonValue,
    segments: &[String],
    value: JsonValue,
    full_path: &Path,
    depth: usize,
) -> FormStateResult<()> {
    let [seg, rest @ ..] = segments else {
        *current = value;
        return Ok(());
    };

    if current.is_null() {
        *current = container_for(seg);
    }

    match current {
        JsonValue::Object(entries) => {
            let slot = entry_mut(entries, seg);
            set_at_path(slot, rest, value, full_path, depth + 1)
        }
        JsonValue::Array(items) => {
            let error_path = || Path::from_segments(&full_path.segments()[..=depth]);
            let Some(idx) = seg_index(seg) else {
                return Err(FormStateError::type_mismatch(error_path(), "object", "array"));
            };
            if idx > items.len() {
                return Err(FormStateError::index_out_of_bounds(
                    error_path(),
                    idx,
                    items.len(),
                ));
            }
            if idx == items.len() {
                items.push(JsonValue::Null);
            }
            set_at_path(&mut items[idx], rest, value, full_path, depth + 1)
        }
        other => Err(FormStateError::type_mismatch(
            Path::from_segments(&full_path.segments()[..depth]),
            value_type_name(&container_for(seg)),
            value_type_name(other),
        )),
    }
}

/// Mutable slot for `key`, inserting `Null` when absent. Repeated keys are
/// collapsed into the first position, keeping the effective (last) value.
fn entry_mut<'a>(entries: &'a mut Vec<(String, JsonValue)>, key: &str) -> &'a mut JsonValue {
    let positions: Vec<usize> = entries
        .iter()
        .enumerate()
        .filter(|(_, (k, _))| k == key)
        .map(|(i, _)| i)
        .collect();

    let first = match positions.as_slice() {
        [] => {
            entries.push((key.to_owned(), JsonValue::Null));
            entries.len() - 1
        }
        [first] => *first,
        [first, dups @ ..] => {
            let mut latest = None;
            for &i in dups.iter().rev() {
                let (_, v) = entries.remove(i);
                latest.get_or_insert(v);
            }
            if let Some(v) = latest {
                entries[*first].1 = v;
            }
            *first
        }
    };
    &mut entries[first].1
}

/// Try to delete a value at a path. Returns true if deleted, false if not found.
fn delete_at_path(current: &mut JsonValue, segments: &[String]) -> bool {
    match (current, segments) {
        (_, []) => false,
        (JsonValue::Object(entries), [key]) => {
            let before = entries.len();
            entries.retain(|(k, _)| k != key);
            entries.len() != before
        }
        (JsonValue::Array(items), [seg]) => match seg_index(seg) {
            Some(idx) if idx < items.len() => {
                items.remove(idx);
                true
            }
            _ => false,
        },
        (JsonValue::Object(entries), [key, rest @ ..]) => entries
            .iter_mut()
            .rev()
            .find(|(k, _)| k == key)
            .is_some_and(|(_, child)| delete_at_path(child, rest)),
        (JsonValue::Array(items), [seg, rest @ ..]) => seg_index(seg)
            .and_then(|idx| items.get_mut(idx))
            .is_some_and(|child| delete_at_path(child, rest)),
        _ => false,
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => JsonValue::Number(n),
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<JsonValue> for serde_json::Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => serde_json::Value::Null,
            JsonValue::Bool(b) => serde_json::Value::Bool(b),
            JsonValue::Number(n) => serde_json::Value::Number(n),
            JsonValue::String(s) => serde_json::Value::String(s),
            JsonValue::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            JsonValue::Object(entries) => {
                let mut map = serde_json::Map::with_capacity(entries.len());
                for (k, v) in entries {
                    map.insert(k, v.into());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

impl From<&JsonValue> for serde_json::Value {
    fn from(value: &JsonValue) -> Self {
        value.clone().into()
    }
}

impl From<bool> for JsonValue {
    fn from(b: bool) -> Self {
        JsonValue::Bool(b)
    }
}

impl From<i64> for JsonValue {
    fn from(i: i64) -> Self {
        JsonValue::Number(i.into())
    }
}

impl From<f64> for JsonValue {
    fn from(f: f64) -> Self {
        JsonValue::from_f64(f)
    }
}

impl From<&str> for JsonValue {
    fn from(s: &str) -> Self {
        JsonValue::String(s.to_owned())
    }
}

impl From<String> for JsonValue {
    fn from(s: String) -> Self {
        JsonValue::String(s)
    }
}

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            JsonValue::Null => serializer.serialize_unit(),
            JsonValue::Bool(b) => serializer.serialize_bool(*b),
            JsonValue::Number(n) => n.serialize(serializer),
            JsonValue::String(s) => serializer.serialize_str(s),
            JsonValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            JsonValue::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for JsonValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(JsonValue::from)
    }
}

/// Compact JSON text.
impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
