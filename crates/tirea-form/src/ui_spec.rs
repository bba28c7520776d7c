//! UI hints embedded in schema nodes as custom keywords.

use crate::rule::Rule;
use crate::schema;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// Widget override requested by the `widget` keyword.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Widget {
    #[default]
    Default,
    /// Render booleans as a switch instead of a checkbox.
    Switch,
    /// Masked text input.
    Password,
    /// Multi-line text area; `rows` fixes the height, otherwise it follows the
    /// measured extent of the field.
    Multiline { rows: Option<u32> },
}

impl Widget {
    fn parse(raw: Option<&Value>) -> Self {
        match raw {
            Some(Value::String(name)) => match name.as_str() {
                "switch" => Widget::Switch,
                "password" => Widget::Password,
                "multiline" => Widget::Multiline { rows: None },
                _ => Widget::Default,
            },
            Some(Value::Object(map)) => match map.get("multiline") {
                Some(rows) => Widget::Multiline {
                    rows: rows.as_u64().and_then(|n| u32::try_from(n).ok()),
                },
                None => Widget::Default,
            },
            _ => Widget::Default,
        }
    }
}

/// Resolved UI hints of one schema node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiSpec {
    pub widget: Widget,
    /// Absent means always enabled and visible.
    pub rule: Option<Rule>,
    /// Object nodes with this flag can be collapsed.
    pub expandable: bool,
    /// Force raw JSON editing regardless of type.
    pub edit_as_json: bool,
    /// Per-node override of `FormConfig::collapse_nested_objects`.
    pub collapsed: Option<bool>,
}

impl UiSpec {
    /// Read `widget`, `rule`, `expandable`, `editAsJson` and `collapsed`.
    ///
    /// ```
    /// use tirea_form::{UiSpec, Widget};
    /// use serde_json::json;
    ///
    /// let spec = UiSpec::resolve(&json!({"type": "boolean", "widget": "switch"}));
    /// assert_eq!(spec.widget, Widget::Switch);
    /// assert!(spec.rule.is_none());
    /// ```
    pub fn resolve(node: &Value) -> Self {
        let flag = |name: &str| node.get(name).and_then(Value::as_bool);
        Self {
            widget: Widget::parse(node.get("widget")),
            rule: node.get("rule").and_then(Rule::parse),
            expandable: flag("expandable").unwrap_or(false),
            edit_as_json: flag("editAsJson").unwrap_or(false),
            collapsed: flag("collapsed"),
        }
    }

    #[inline]
    pub fn is_multiline(&self) -> bool {
        matches!(self.widget, Widget::Multiline { .. })
    }
}

/// UI hints of every node of one schema, resolved once.
///
/// Entries are keyed by node address inside the shared schema. The schema is
/// held here and never mutated, so the addresses stay valid. Nodes from
/// elsewhere are resolved on demand.
#[derive(Clone, Debug)]
pub(crate) struct UiSpecs {
    schema: Arc<Value>,
    by_node: Arc<HashMap<usize, UiSpec>>,
}

impl UiSpecs {
    /// Resolve hints for `schema` and every node reachable through
    /// `properties` and `items`.
    pub(crate) fn build(schema: Arc<Value>) -> Self {
        let mut by_node = HashMap::new();
        collect(&schema, &mut by_node);
        Self {
            schema,
            by_node: Arc::new(by_node),
        }
    }

    #[inline]
    pub(crate) fn schema(&self) -> &Value {
        &self.schema
    }

    pub(crate) fn get(&self, node: &Value) -> Cow<'_, UiSpec> {
        match self.by_node.get(&node_key(node)) {
            Some(ui) => Cow::Borrowed(ui),
            None => Cow::Owned(UiSpec::resolve(node)),
        }
    }
}

fn node_key(node: &Value) -> usize {
    node as *const Value as usize
}

fn collect(node: &Value, out: &mut HashMap<usize, UiSpec>) {
    out.insert(node_key(node), UiSpec::resolve(node));
    if let Some(props) = schema::properties(node) {
        for child in props.values() {
            collect(child, out);
        }
    }
    if let Some(item) = schema::items(node) {
        collect(item, out);
    }
}
