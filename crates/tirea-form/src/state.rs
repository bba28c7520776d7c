//! The form state machine.
//!
//! `FormState` is a value: every event produces a new state through
//! [`FormState::update`], and the previous state is left as it was.
//!
//! ```text
//! State' = state.update(Event)
//! ```
//!
//! The document and its validation errors are always recomputed together.
//! The one deliberate gap: an edit that fails validation keeps the user's
//! literal input as the document, so keystrokes are never discarded.

use crate::event::{Effect, Event, HostEvent, Transition};
use crate::mode::{select_mode, Mode};
use crate::schema::{self, SchemaType};
use crate::ui_spec::{UiSpec, UiSpecs};
use crate::validation::{default_value_for, normalize_errors, ErrorMap, Validator};
use crate::{FormConfig, FormError, FormResult};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use tirea_form_state::{value_type_name, JsonValue, Path};
use tracing::{debug, trace, warn};

/// Complete state of one form.
#[derive(Clone, Debug)]
pub struct FormState {
    validator: Validator,
    ui: UiSpecs,
    value: Option<JsonValue>,
    errors: ErrorMap,
    focused_path: Option<Path>,
    edited_raw_text: String,
    expanded_paths: BTreeSet<Path>,
    field_measured_heights: BTreeMap<Path, u32>,
    touched_paths: BTreeSet<Path>,
    show_secret: bool,
    config: FormConfig,
}

impl FormState {
    /// Create the initial state.
    ///
    /// Without an `initial` value the document is seeded from the schema's
    /// defaults, so missing required fields are reported right away. The
    /// returned transition carries a `Measure` effect for every multiline
    /// field in the document.
    ///
    /// ```
    /// use tirea_form::{FormConfig, FormState};
    /// use tirea_form_state::path;
    /// use serde_json::json;
    ///
    /// let schema = json!({
    ///     "type": "object",
    ///     "properties": {"age": {"type": "integer"}},
    ///     "required": ["age"]
    /// });
    /// let init = FormState::init(schema, None, FormConfig::default()).unwrap();
    /// assert_eq!(init.state.errors()[&path!("age")], ["is required"]);
    /// ```
    pub fn init(
        schema: Value,
        initial: Option<JsonValue>,
        config: FormConfig,
    ) -> FormResult<Transition> {
        let validator = Validator::new(schema)?;
        let seed = initial.unwrap_or_else(|| default_value_for(validator.schema()));
        let ui = UiSpecs::build(validator.shared_schema());

        let mut state = Self {
            validator,
            ui,
            value: None,
            errors: ErrorMap::new(),
            focused_path: None,
            edited_raw_text: String::new(),
            expanded_paths: BTreeSet::new(),
            field_measured_heights: BTreeMap::new(),
            touched_paths: BTreeSet::new(),
            show_secret: false,
            config,
        };
        state.reconcile(Some(seed));
        state.seed_expanded(&Path::root());
        let effects = state.measure_effects(&Path::root());
        debug!(
            form = %state.config.name,
            errors = state.errors.len(),
            "form initialized"
        );

        Ok(Transition {
            state,
            event: HostEvent::None,
            effects,
        })
    }

    /// Apply one event and return the resulting state (pure function).
    pub fn update(&self, event: Event) -> Transition {
        debug!(
            event = event.name(),
            mutating = event.is_mutating(),
            path = %event.path().map(ToString::to_string).unwrap_or_default(),
            "applying form event"
        );
        let mut next = self.clone();
        let mut effects = Vec::new();
        let out = next.apply(event, &mut effects);
        Transition {
            state: next,
            event: out,
            effects,
        }
    }

    #[inline]
    pub fn schema(&self) -> &Value {
        self.validator.schema()
    }

    #[inline]
    pub fn value(&self) -> Option<&JsonValue> {
        self.value.as_ref()
    }

    #[inline]
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Errors recorded for exactly `path`.
    pub fn errors_at(&self, path: &Path) -> &[String] {
        self.errors.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn focused_path(&self) -> Option<&Path> {
        self.focused_path.as_ref()
    }

    #[inline]
    pub fn edited_raw_text(&self) -> &str {
        &self.edited_raw_text
    }

    #[inline]
    pub fn expanded_paths(&self) -> &BTreeSet<Path> {
        &self.expanded_paths
    }

    #[inline]
    pub fn field_measured_heights(&self) -> &BTreeMap<Path, u32> {
        &self.field_measured_heights
    }

    /// Whether the field at `path` has been focused and then left.
    #[inline]
    pub fn is_touched(&self, path: &Path) -> bool {
        self.touched_paths.contains(path)
    }

    #[inline]
    pub fn show_secret(&self) -> bool {
        self.show_secret
    }

    #[inline]
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Widget identifier of the field at `path`.
    #[inline]
    pub fn field_id(&self, path: &Path) -> String {
        path.field_id(&self.config.name)
    }

    /// UI hints of a schema node, resolved once per form.
    #[inline]
    pub(crate) fn ui_spec(&self, node: &Value) -> Cow<'_, UiSpec> {
        self.ui.get(node)
    }

    /// Whether the expandable object at `path` starts out collapsed.
    pub(crate) fn collapsed_by_default(&self, ui: &UiSpec, path: &Path) -> bool {
        ui.collapsed
            .unwrap_or(self.config.collapse_nested_objects && !path.is_root())
    }

    fn apply(&mut self, event: Event, effects: &mut Vec<Effect>) -> HostEvent {
        match event {
            Event::EditValue { path, value } => self.edit_value(&path, value),
            Event::EditRawText { path, text } => self.edit_raw_text(&path, text),
            Event::DeleteProperty { path } => self.delete_property(&path),
            Event::AddItem {
                parent,
                index,
                item_schema,
            } => self.add_item(&parent, index, &item_schema, effects),
            Event::ToggleNode { path } => {
                if !self.expanded_paths.remove(&path) {
                    self.expanded_paths.insert(path);
                }
                HostEvent::None
            }
            Event::Focus { path: Some(path) } => {
                self.focus(path);
                HostEvent::None
            }
            Event::Focus { path: None } | Event::Blur => {
                self.blur();
                HostEvent::None
            }
            Event::RequestFocus { path } => {
                effects.push(Effect::Focus {
                    id: self.field_id(&path),
                });
                self.focus(path);
                HostEvent::None
            }
            Event::ToggleShowSecret => {
                self.show_secret = !self.show_secret;
                HostEvent::None
            }
            Event::ViewportMeasured { path, height } => {
                self.field_measured_heights.insert(path, height);
                HostEvent::None
            }
            Event::FocusAcknowledged => HostEvent::None,
        }
    }

    fn edit_value(&mut self, path: &Path, value: JsonValue) -> HostEvent {
        match self.edited_document(path, value) {
            Ok(doc) => self.reconcile(Some(doc)),
            Err(err) => {
                warn!(error = %err, path = %path, "edit does not fit the document shape");
                HostEvent::None
            }
        }
    }

    /// The current document with `value` placed at `path`.
    fn edited_document(&self, path: &Path, value: JsonValue) -> FormResult<JsonValue> {
        let base = self.value.clone().unwrap_or_default();
        let doc = self.scaffold(base, path)?;
        Ok(doc.set(path, value)?)
    }

    /// Fill absent or null nodes above `path` with the container type the
    /// schema declares for them. Undeclared ones are left to `set`, which
    /// infers them from the next segment.
    fn scaffold(&self, mut doc: JsonValue, path: &Path) -> FormResult<JsonValue> {
        for depth in 0..path.len() {
            let prefix = Path::from_segments(&path.segments()[..depth]);
            if !matches!(doc.get(&prefix), Err(_) | Ok(JsonValue::Null)) {
                continue;
            }
            let container = match schema::node_at(self.schema(), &prefix).map(SchemaType::of) {
                Some(SchemaType::Object) => JsonValue::object(),
                Some(SchemaType::Array) => JsonValue::array(),
                _ => continue,
            };
            doc = doc.set(&prefix, container)?;
        }
        Ok(doc)
    }

    fn edit_raw_text(&mut self, path: &Path, text: String) -> HostEvent {
        let parsed = self.parse_raw_text(path, &text);
        self.edited_raw_text = text;
        match parsed {
            Some(value) => self.edit_value(path, value),
            None => {
                trace!(path = %path, "raw text does not parse; document unchanged");
                HostEvent::None
            }
        }
    }

    /// Parse free text as the primitive the field at `path` edits.
    fn parse_raw_text(&self, path: &Path, text: &str) -> Option<JsonValue> {
        let node = schema::node_at(self.schema(), path).unwrap_or(&schema::ANY);
        match select_mode(node, &self.ui_spec(node)) {
            Mode::NumberField => parse_number(text),
            Mode::TextField => Some(JsonValue::String(text.to_string())),
            Mode::Checkbox | Mode::Switch => text.trim().parse::<bool>().ok().map(JsonValue::Bool),
            Mode::JsonEditor | Mode::Object(_) | Mode::Array => serde_json::from_str(text).ok(),
        }
    }

    fn delete_property(&mut self, path: &Path) -> HostEvent {
        let Some(doc) = self.value.as_ref() else {
            return HostEvent::None;
        };
        match doc.delete(path) {
            Ok(next) => {
                self.forget_subtree(path);
                self.reconcile(next)
            }
            Err(err) => {
                debug!(error = %err, "nothing to delete");
                HostEvent::None
            }
        }
    }

    fn add_item(
        &mut self,
        parent: &Path,
        index: usize,
        item_schema: &Value,
        effects: &mut Vec<Effect>,
    ) -> HostEvent {
        let item_path = parent.clone().index(index);
        let doc = self.value.clone().unwrap_or_default();
        if doc.get(&item_path).is_ok() {
            trace!(path = %item_path, "item already present");
            return HostEvent::None;
        }
        let found = doc.get(parent).ok().map(value_type_name);
        let doc = match found {
            Some("array") => doc,
            Some("null") | None => {
                let created = self
                    .scaffold(doc, parent)
                    .and_then(|doc| doc.set(parent, JsonValue::array()).map_err(FormError::from));
                match created {
                    Ok(doc) => doc,
                    Err(err) => {
                        warn!(error = %err, "cannot create array for new item");
                        return HostEvent::None;
                    }
                }
            }
            Some(found) => {
                warn!(path = %parent, found, "cannot add an item to a non-array value");
                return HostEvent::None;
            }
        };
        let previous = self.value.replace(doc);

        let out = self.edit_value(&item_path, default_value_for(item_schema));
        if out == HostEvent::None {
            self.value = previous;
            return out;
        }
        self.seed_expanded(&item_path);
        effects.extend(self.measure_effects(&item_path));
        effects.push(Effect::Focus {
            id: self.field_id(&item_path),
        });
        self.focus(item_path);
        out
    }

    /// Move focus to `path`. Refocusing the focused field keeps its buffer.
    fn focus(&mut self, path: Path) {
        if self.focused_path.as_ref() == Some(&path) {
            return;
        }
        if let Some(previous) = self.focused_path.take() {
            self.touched_paths.insert(previous);
        }
        self.edited_raw_text = self.display_text(&path);
        self.focused_path = Some(path);
    }

    fn blur(&mut self) {
        if let Some(previous) = self.focused_path.take() {
            self.touched_paths.insert(previous);
        }
        self.edited_raw_text.clear();
    }

    /// Text shown in the input for `path` when nothing is being typed.
    pub(crate) fn display_text(&self, path: &Path) -> String {
        let Some(value) = self.value.as_ref().and_then(|doc| doc.get(path).ok()) else {
            return String::new();
        };
        let node = schema::node_at(self.schema(), path).unwrap_or(&schema::ANY);
        match (select_mode(node, &self.ui_spec(node)), value) {
            (Mode::JsonEditor, value) => value.to_pretty_string(),
            (_, JsonValue::String(s)) => s.clone(),
            (_, JsonValue::Null) => String::new(),
            (_, value) => value.to_string(),
        }
    }

    /// Replace the document and recompute errors.
    ///
    /// Valid documents are stored with defaults applied. Invalid ones are
    /// stored exactly as given.
    fn reconcile(&mut self, doc: Option<JsonValue>) -> HostEvent {
        let Some(doc) = doc else {
            self.value = None;
            self.errors.clear();
            return HostEvent::UpdateValue {
                value: None,
                errors: ErrorMap::new(),
            };
        };
        match self.validator.validate(&doc) {
            Ok(normalized) => {
                self.value = Some(normalized);
                self.errors.clear();
            }
            Err(invalid) => {
                self.value = Some(doc.clone());
                self.errors = normalize_errors(&invalid.issues);
            }
        }
        HostEvent::UpdateValue {
            value: Some(doc),
            errors: self.errors.clone(),
        }
    }

    /// Drop per-field UI state under a deleted node.
    fn forget_subtree(&mut self, path: &Path) {
        self.expanded_paths.retain(|p| !path.is_prefix_of(p));
        self.touched_paths.retain(|p| !path.is_prefix_of(p));
        self.field_measured_heights
            .retain(|p, _| !path.is_prefix_of(p));
        if self
            .focused_path
            .as_ref()
            .is_some_and(|p| path.is_prefix_of(p))
        {
            self.focused_path = None;
            self.edited_raw_text.clear();
        }
    }

    /// Mark every expandable object under `path` that does not start
    /// collapsed as expanded.
    fn seed_expanded(&mut self, path: &Path) {
        let mut expand = Vec::new();
        self.visit(path, &mut |state, ui, mode, at| {
            if matches!(mode, Mode::Object(_))
                && ui.expandable
                && !state.collapsed_by_default(ui, at)
            {
                expand.push(at.clone());
            }
        });
        self.expanded_paths.extend(expand);
    }

    /// A `Measure` request for every multiline text field under `path`.
    fn measure_effects(&self, path: &Path) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.visit(path, &mut |state, ui, mode, at| {
            if matches!(mode, Mode::TextField) && ui.is_multiline() {
                effects.push(Effect::Measure {
                    path: at.clone(),
                    id: state.field_id(at),
                });
            }
        });
        effects
    }

    /// Walk the schema below `path` alongside the document, visiting object
    /// properties and existing array items.
    fn visit<F>(&self, path: &Path, f: &mut F)
    where
        F: FnMut(&FormState, &UiSpec, &Mode<'_>, &Path),
    {
        let Some(node) = schema::node_at(self.schema(), path) else {
            return;
        };
        let ui = self.ui_spec(node);
        let mode = select_mode(node, &ui);
        f(self, &*ui, &mode, path);
        match mode {
            Mode::Object(props) => {
                for name in props.keys() {
                    self.visit(&path.child(name.as_str()), f);
                }
            }
            Mode::Array => {
                let len = self
                    .value
                    .as_ref()
                    .and_then(|doc| doc.get(path).ok())
                    .and_then(JsonValue::as_array)
                    .map_or(0, <[JsonValue]>::len);
                for i in 0..len {
                    self.visit(&path.clone().index(i), f);
                }
            }
            _ => {}
        }
    }
}

/// Parse numeric input. Integral text stays an integer.
fn parse_number(text: &str) -> Option<JsonValue> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i64>() {
        return Some(JsonValue::from(i));
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(JsonValue::from_f64)
}
