//! Edit events accepted by a form and the outputs it hands back to the host.

use crate::validation::ErrorMap;
use crate::FormState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tirea_form_state::{JsonValue, Path};

/// A single atomic input to the reconciliation core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Replace the value at `path` and revalidate.
    EditValue { path: Path, value: JsonValue },

    /// Free text typed into a number or JSON field. Always echoed into the
    /// scratch buffer; applied as an edit only when it parses.
    EditRawText { path: Path, text: String },

    /// Remove the node at `path`. The root clears the whole document.
    DeleteProperty { path: Path },

    /// Append a new item at `parent/index`, seeded from `item_schema`.
    /// Ignored if that index already holds a value.
    AddItem {
        parent: Path,
        index: usize,
        item_schema: Value,
    },

    /// Flip whether the object at `path` is expanded.
    ToggleNode { path: Path },

    /// The host moved focus to a field, or away from all fields.
    Focus { path: Option<Path> },

    /// Same as `Focus { path: None }`.
    Blur,

    /// Focus a field programmatically and ask the host to move input focus.
    RequestFocus { path: Path },

    /// Show or mask the content of password fields.
    ToggleShowSecret,

    /// The host measured the rendered height of a multiline field.
    ViewportMeasured { path: Path, height: u32 },

    /// The host finished a focus request.
    FocusAcknowledged,
}

impl Event {
    /// Get the event name.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Event::EditValue { .. } => "edit_value",
            Event::EditRawText { .. } => "edit_raw_text",
            Event::DeleteProperty { .. } => "delete_property",
            Event::AddItem { .. } => "add_item",
            Event::ToggleNode { .. } => "toggle_node",
            Event::Focus { .. } => "focus",
            Event::Blur => "blur",
            Event::RequestFocus { .. } => "request_focus",
            Event::ToggleShowSecret => "toggle_show_secret",
            Event::ViewportMeasured { .. } => "viewport_measured",
            Event::FocusAcknowledged => "focus_acknowledged",
        }
    }

    /// Get the path this event targets, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Event::EditValue { path, .. }
            | Event::EditRawText { path, .. }
            | Event::DeleteProperty { path }
            | Event::ToggleNode { path }
            | Event::RequestFocus { path }
            | Event::ViewportMeasured { path, .. } => Some(path),
            Event::AddItem { parent, .. } => Some(parent),
            Event::Focus { path } => path.as_ref(),
            Event::Blur | Event::ToggleShowSecret | Event::FocusAcknowledged => None,
        }
    }

    /// Whether this event can change the document.
    #[inline]
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Event::EditValue { .. }
                | Event::EditRawText { .. }
                | Event::DeleteProperty { .. }
                | Event::AddItem { .. }
        )
    }
}

/// Notification for the host after a transition.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// The document changed; persist `value` and show `errors`.
    UpdateValue {
        value: Option<JsonValue>,
        errors: ErrorMap,
    },
    /// Nothing for the host to persist.
    None,
}

/// One-shot request the host executes on the core's behalf. Completion comes
/// back as a new `Event`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// Move input focus to the widget with this id.
    Focus { id: String },
    /// Measure the rendered height of a multiline field; answer with
    /// `Event::ViewportMeasured`.
    Measure { path: Path, id: String },
}

/// Result of a transition: the replacement state plus its outputs.
#[derive(Clone, Debug)]
pub struct Transition {
    pub state: FormState,
    pub event: HostEvent,
    pub effects: Vec<Effect>,
}
