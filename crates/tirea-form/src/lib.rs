//! Schema-driven form engine.
//!
//! `tirea-form` renders an editable form from a JSON Schema and keeps a live
//! document in sync with user input, revalidating on every edit.
//!
//! # Core Concepts
//!
//! - **UiSpec**: UI hints read from custom schema keywords (`widget`, `rule`,
//!   `expandable`, `editAsJson`, `collapsed`)
//! - **Mode**: the editing surface chosen for a schema node
//! - **Rule**: a condition over the document that disables or hides a node
//! - **Validator**: `jsonschema` validation with default application
//! - **FormState**: the state machine; `update(Event)` yields a new state,
//!   a `HostEvent` for the host and one-shot `Effect`s
//! - **render**: projection of a state into a `ViewNode` tree
//!
//! # Quick Start
//!
//! ```
//! use tirea_form::{render, Event, FormConfig, FormState, HostEvent};
//! use tirea_form_state::path;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {"age": {"type": "integer"}},
//!     "required": ["age"]
//! });
//! let state = FormState::init(schema, None, FormConfig::new("profile")).unwrap().state;
//! assert!(!state.errors().is_empty());
//!
//! let t = state.update(Event::EditValue { path: path!("age"), value: 30i64.into() });
//! assert!(t.state.errors().is_empty());
//! assert!(matches!(t.event, HostEvent::UpdateValue { .. }));
//!
//! let view = render(&t.state);
//! assert_eq!(view.id, "profile_");
//! ```

mod config;
mod error;
mod event;
mod mode;
mod render;
mod rule;
mod schema;
mod state;
mod ui_spec;
mod validation;

pub use config::FormConfig;
pub use error::{FormError, FormResult};
pub use event::{Effect, Event, HostEvent, Transition};
pub use mode::{select_mode, Mode};
pub use render::{render, render_node, AddItem, ViewNode, ViewWidget, DEFAULT_ROWS, LINE_HEIGHT};
pub use rule::{apply_rule, scope_path, Condition, Rule, RuleEffect, RuleState};
pub use schema::{node_at, SchemaType};
pub use state::FormState;
pub use ui_spec::{UiSpec, Widget};
pub use validation::{
    apply_defaults, default_value_for, normalize_errors, ErrorMap, Invalid, IssueKind,
    ValidationIssue, Validator,
};

// Re-export the document layer for convenience
pub use tirea_form_state::{path, JsonValue, Path};
