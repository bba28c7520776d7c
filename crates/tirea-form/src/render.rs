//! Projection of a form state into a view tree.
//!
//! Rendering holds no state: it walks the schema alongside the live document
//! and describes what each field should show. Widget chrome is up to the host.

use crate::event::Event;
use crate::mode::{select_mode, Mode};
use crate::rule::apply_rule;
use crate::schema;
use crate::ui_spec::{UiSpec, Widget};
use crate::FormState;
use serde::Serialize;
use serde_json::Value;
use tirea_form_state::{JsonValue, Path};

/// Pixel height of one text row, used to turn a measured extent into rows.
pub const LINE_HEIGHT: u32 = 20;
/// Rows of a multiline field that has not been measured yet.
pub const DEFAULT_ROWS: u32 = 3;
const MIN_ROWS: u32 = 2;

/// One rendered field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewNode {
    pub path: Path,
    /// Widget identifier, see [`Path::field_id`].
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub disabled: bool,
    pub hidden: bool,
    pub focused: bool,
    /// The field has been focused and left at least once.
    pub touched: bool,
    pub errors: Vec<String>,
    pub widget: ViewWidget,
}

/// Editing surface of a rendered field with its display data.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewWidget {
    TextField {
        text: String,
        /// Masked input.
        secret: bool,
        /// Masked input currently shown in clear.
        revealed: bool,
        /// Row count for multiline fields.
        #[serde(skip_serializing_if = "Option::is_none")]
        rows: Option<u32>,
    },
    NumberField {
        text: String,
    },
    JsonEditor {
        text: String,
    },
    Checkbox {
        checked: bool,
    },
    Switch {
        checked: bool,
    },
    Object {
        expandable: bool,
        expanded: bool,
        /// Empty while collapsed.
        children: Vec<ViewNode>,
    },
    Array {
        items: Vec<ViewNode>,
        add: AddItem,
    },
}

/// The "add item" affordance of an array.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AddItem {
    pub parent: Path,
    pub index: usize,
    pub item_schema: Value,
}

impl AddItem {
    /// The event to dispatch when the affordance is used.
    pub fn to_event(&self) -> Event {
        Event::AddItem {
            parent: self.parent.clone(),
            index: self.index,
            item_schema: self.item_schema.clone(),
        }
    }
}

/// Render the whole form.
pub fn render(state: &FormState) -> ViewNode {
    render_node(state, state.schema(), false, false, &Path::root())
}

/// Render the node governed by `node` at `path`.
///
/// `is_disabled` is the ancestors' disabled state; it is OR-ed with the
/// node's own rule before recursing. Hidden state is not inherited.
pub fn render_node(
    state: &FormState,
    node: &Value,
    is_required: bool,
    is_disabled: bool,
    path: &Path,
) -> ViewNode {
    let ui = state.ui_spec(node);
    let mode = select_mode(node, &ui);
    let rule = apply_rule(ui.rule.as_ref(), state.value(), path);
    let disabled = is_disabled || rule.disabled;
    let value = state.value().and_then(|doc| doc.get(path).ok());
    let focused = state.focused_path() == Some(path);

    let widget = match mode {
        Mode::TextField => ViewWidget::TextField {
            text: value.and_then(JsonValue::as_str).unwrap_or_default().to_string(),
            secret: ui.widget == Widget::Password,
            revealed: state.show_secret(),
            rows: multiline_rows(state, &ui, path),
        },
        Mode::NumberField => ViewWidget::NumberField {
            text: editor_text(state, path, focused),
        },
        Mode::JsonEditor => ViewWidget::JsonEditor {
            text: editor_text(state, path, focused),
        },
        Mode::Checkbox => ViewWidget::Checkbox {
            checked: value.and_then(JsonValue::as_bool).unwrap_or(false),
        },
        Mode::Switch => ViewWidget::Switch {
            checked: value.and_then(JsonValue::as_bool).unwrap_or(false),
        },
        Mode::Object(props) => {
            let expanded = !ui.expandable || state.expanded_paths().contains(path);
            let children = if expanded {
                props
                    .iter()
                    .map(|(name, child)| {
                        render_node(
                            state,
                            child,
                            schema::is_required(node, name),
                            disabled,
                            &path.child(name.as_str()),
                        )
                    })
                    .collect()
            } else {
                Vec::new()
            };
            ViewWidget::Object {
                expandable: ui.expandable,
                expanded,
                children,
            }
        }
        Mode::Array => {
            let item_schema = schema::items(node).unwrap_or(&schema::ANY);
            let len = value.and_then(JsonValue::as_array).map_or(0, <[JsonValue]>::len);
            let items = (0..len)
                .map(|i| render_node(state, item_schema, false, disabled, &path.clone().index(i)))
                .collect();
            ViewWidget::Array {
                items,
                add: AddItem {
                    parent: path.clone(),
                    index: len,
                    item_schema: item_schema.clone(),
                },
            }
        }
    };

    ViewNode {
        path: path.clone(),
        id: state.field_id(path),
        label: label_for(node, path),
        description: schema::description(node).map(str::to_string),
        required: is_required,
        disabled,
        hidden: rule.hidden,
        focused,
        touched: state.is_touched(path),
        errors: state.errors_at(path).to_vec(),
        widget,
    }
}

/// Scratch buffer while the field is being edited, formatted value otherwise.
fn editor_text(state: &FormState, path: &Path, focused: bool) -> String {
    if focused {
        state.edited_raw_text().to_string()
    } else {
        state.display_text(path)
    }
}

fn multiline_rows(state: &FormState, ui: &UiSpec, path: &Path) -> Option<u32> {
    let Widget::Multiline { rows } = ui.widget else {
        return None;
    };
    Some(rows.unwrap_or_else(|| {
        state
            .field_measured_heights()
            .get(path)
            .map_or(DEFAULT_ROWS, |h| (h / LINE_HEIGHT).max(MIN_ROWS))
    }))
}

fn label_for(node: &Value, path: &Path) -> String {
    schema::title(node)
        .or_else(|| path.last())
        .unwrap_or_default()
        .to_string()
}
