//! Read-only helpers over JSON Schema nodes.
//!
//! Only the practical subset used by forms is understood: `type`,
//! `properties`, `items`, `required`, `default`, `title`, `description`.

use serde_json::{Map, Value};
use tirea_form_state::{seg_index, Path};

/// Schema accepting anything. Used for nodes with no governing schema: a
/// missing `items` keyword or a path `node_at` cannot resolve.
pub(crate) static ANY: Value = Value::Bool(true);

/// Declared primitive type of a schema node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Null,
    Bool,
    Number,
    Integer,
    String,
    Object,
    Array,
    /// Union types, a missing `type`, boolean schemas and anything else.
    Unknown,
}

impl SchemaType {
    /// Read the `type` keyword. Only a single type name is recognized.
    pub fn of(node: &Value) -> Self {
        match node.get("type").and_then(Value::as_str) {
            Some("null") => SchemaType::Null,
            Some("boolean") => SchemaType::Bool,
            Some("number") => SchemaType::Number,
            Some("integer") => SchemaType::Integer,
            Some("string") => SchemaType::String,
            Some("object") => SchemaType::Object,
            Some("array") => SchemaType::Array,
            _ => SchemaType::Unknown,
        }
    }
}

/// The `properties` map, in declared order.
#[inline]
pub fn properties(node: &Value) -> Option<&Map<String, Value>> {
    node.get("properties")?.as_object()
}

/// Single homogeneous item schema. Tuple-form `items` is not supported.
#[inline]
pub fn items(node: &Value) -> Option<&Value> {
    node.get("items").filter(|items| items.is_object())
}

/// Whether `name` is listed in the node's `required` array.
pub fn is_required(node: &Value, name: &str) -> bool {
    node.get("required")
        .and_then(Value::as_array)
        .is_some_and(|required| required.iter().any(|r| r.as_str() == Some(name)))
}

#[inline]
pub fn default(node: &Value) -> Option<&Value> {
    node.get("default")
}

#[inline]
pub fn title(node: &Value) -> Option<&str> {
    node.get("title").and_then(Value::as_str)
}

#[inline]
pub fn description(node: &Value) -> Option<&str> {
    node.get("description").and_then(Value::as_str)
}

/// Find the schema node governing the document node at `path`.
///
/// Object segments go through `properties`; index segments go through
/// `items`.
pub fn node_at<'a>(schema: &'a Value, path: &Path) -> Option<&'a Value> {
    path.iter().try_fold(schema, |node, seg| {
        if let Some(child) = properties(node).and_then(|props| props.get(seg)) {
            Some(child)
        } else if seg_index(seg).is_some() {
            items(node)
        } else {
            None
        }
    })
}
