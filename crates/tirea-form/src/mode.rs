//! Widget selection: which editing surface a schema node gets.

use crate::schema::{self, SchemaType};
use crate::ui_spec::{UiSpec, Widget};
use serde_json::{Map, Value};

/// Editing surface for a schema node.
#[derive(Clone, Debug, PartialEq)]
pub enum Mode<'s> {
    TextField,
    JsonEditor,
    NumberField,
    Switch,
    Checkbox,
    /// Object with a declared property map.
    Object(&'s Map<String, Value>),
    Array,
}

/// Pick the editing surface for `node`.
///
/// Total over every schema node: shapes without a dedicated surface (unions,
/// enums without a type, boolean schemas, objects without `properties`) fall
/// back to raw JSON editing.
///
/// ```
/// use tirea_form::{select_mode, Mode, UiSpec};
/// use serde_json::json;
///
/// let node = json!({"type": "integer"});
/// assert_eq!(select_mode(&node, &UiSpec::resolve(&node)), Mode::NumberField);
/// ```
pub fn select_mode<'s>(node: &'s Value, ui: &UiSpec) -> Mode<'s> {
    if ui.edit_as_json {
        return Mode::JsonEditor;
    }
    match SchemaType::of(node) {
        SchemaType::Number | SchemaType::Integer => Mode::NumberField,
        SchemaType::String => Mode::TextField,
        SchemaType::Bool if ui.widget == Widget::Switch => Mode::Switch,
        SchemaType::Bool => Mode::Checkbox,
        SchemaType::Object => schema::properties(node).map_or(Mode::JsonEditor, Mode::Object),
        SchemaType::Array => Mode::Array,
        SchemaType::Null | SchemaType::Unknown => Mode::JsonEditor,
    }
}
