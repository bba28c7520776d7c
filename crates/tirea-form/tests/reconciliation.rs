//! End-to-end tests for the form state machine.

use serde_json::{json, Value};
use tirea_form::{
    path, render, Effect, Event, FormConfig, FormState, HostEvent, JsonValue, Path, Transition,
    ViewWidget,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn init(schema: Value, initial: Option<Value>) -> FormState {
    init_tracing();
    FormState::init(schema, initial.map(Into::into), FormConfig::new("form"))
        .unwrap()
        .state
}

fn value_of(state: &FormState) -> Option<Value> {
    state.value().cloned().map(Value::from)
}

fn age_schema() -> Value {
    json!({
        "type": "object",
        "properties": {"age": {"type": "integer"}},
        "required": ["age"]
    })
}

// ============================================================================
// EditValue
// ============================================================================

#[test]
fn test_required_error_clears_after_edit() {
    let state = init(age_schema(), None);
    assert!(state.value().and_then(|v| v.get(&path!("age")).ok()).is_none());
    assert_eq!(state.errors_at(&path!("age")), ["is required"]);

    let t = state.update(Event::EditValue {
        path: path!("age"),
        value: JsonValue::from(30i64),
    });
    assert!(t.state.errors().is_empty());
    assert_eq!(value_of(&t.state), Some(json!({"age": 30})));
    assert_eq!(
        t.event,
        HostEvent::UpdateValue {
            value: Some(json!({"age": 30}).into()),
            errors: Default::default(),
        }
    );
}

#[test]
fn test_invalid_edit_keeps_literal_input() {
    let state = init(age_schema(), Some(json!({"age": 1})));
    let t = state.update(Event::EditValue {
        path: path!("age"),
        value: "thirty".into(),
    });
    assert_eq!(value_of(&t.state), Some(json!({"age": "thirty"})));
    assert_eq!(t.state.errors_at(&path!("age")), ["must be integer"]);
    match t.event {
        HostEvent::UpdateValue { value, errors } => {
            assert_eq!(value.map(Value::from), Some(json!({"age": "thirty"})));
            assert_eq!(errors, *t.state.errors());
        }
        HostEvent::None => panic!("edit must notify the host"),
    }
}

#[test]
fn test_valid_edit_applies_defaults() {
    let state = init(
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "role": {"type": "string", "default": "viewer"}
            }
        }),
        Some(json!({})),
    );
    assert_eq!(value_of(&state), Some(json!({"role": "viewer"})));

    let t = state.update(Event::DeleteProperty { path: path!("role") });
    assert_eq!(value_of(&t.state), Some(json!({"role": "viewer"})));
}

#[test]
fn test_edit_without_document_creates_containers() {
    let state = init(json!({}), None);
    assert_eq!(state.value(), Some(&JsonValue::Null));
    let t = state.update(Event::EditValue {
        path: path!("list", 0, "name"),
        value: "a".into(),
    });
    assert_eq!(value_of(&t.state), Some(json!({"list": [{"name": "a"}]})));
}

#[test]
fn test_errors_always_match_document() {
    let schema = json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "minLength": 2},
            "tags": {"type": "array", "items": {"type": "string"}, "maxItems": 2}
        },
        "required": ["name"]
    });
    let validator = tirea_form::Validator::new(schema.clone()).unwrap();
    let events = vec![
        Event::EditValue { path: path!("name"), value: "a".into() },
        Event::EditValue { path: path!("tags"), value: json!(["x", "y", "z"]).into() },
        Event::EditValue { path: path!("name"), value: "alice".into() },
        Event::DeleteProperty { path: path!("tags", 2) },
        Event::DeleteProperty { path: path!("name") },
    ];
    let mut state = init(schema, Some(json!({})));
    for event in events {
        state = state.update(event).state;
        let doc = state.value().cloned().unwrap_or_default();
        assert_eq!(*state.errors(), validator.errors_for(&doc));
    }
    assert_eq!(state.errors_at(&path!("name")), ["is required"]);
}

#[test]
fn test_edit_creates_containers_from_schema_shape() {
    let schema = json!({
        "type": "object",
        "properties": {
            "years": {"type": "object", "properties": {"2024": {"type": "string"}}},
            "rows": {"type": "array", "items": {"type": "object", "properties": {"x": {"type": "string"}}}}
        }
    });
    let state = init(schema, Some(json!({})));

    let t = state.update(Event::EditValue {
        path: path!("years", "2024"),
        value: "x".into(),
    });
    assert!(matches!(t.event, HostEvent::UpdateValue { .. }));
    assert_eq!(value_of(&t.state), Some(json!({"years": {"2024": "x"}})));

    let t = t.state.update(Event::EditValue {
        path: path!("rows", 0, "x"),
        value: "y".into(),
    });
    assert_eq!(
        value_of(&t.state),
        Some(json!({"years": {"2024": "x"}, "rows": [{"x": "y"}]}))
    );
}

#[test]
fn test_edit_after_root_delete_uses_schema_shape() {
    let schema = json!({
        "type": "object",
        "properties": {"7": {"type": "integer"}}
    });
    let state = init(schema, Some(json!({"7": 1})));
    let cleared = state.update(Event::DeleteProperty { path: Path::root() }).state;
    let t = cleared.update(Event::EditValue {
        path: path!(7),
        value: 2i64.into(),
    });
    assert_eq!(value_of(&t.state), Some(json!({"7": 2})));
}

// ============================================================================
// EditRawText
// ============================================================================

#[test]
fn test_unparseable_number_only_updates_buffer() {
    let state = init(
        json!({"type": "object", "properties": {"count": {"type": "number"}}}),
        Some(json!({"count": 5})),
    );
    let t = state.update(Event::EditRawText {
        path: path!("count"),
        text: "12a".to_string(),
    });
    assert_eq!(t.event, HostEvent::None);
    assert_eq!(t.state.edited_raw_text(), "12a");
    assert_eq!(value_of(&t.state), Some(json!({"count": 5})));
}

#[test]
fn test_parseable_number_is_applied() {
    let state = init(
        json!({"type": "object", "properties": {"count": {"type": "number"}}}),
        Some(json!({"count": 5})),
    );
    let t = state.update(Event::EditRawText {
        path: path!("count"),
        text: "2.5".to_string(),
    });
    assert!(matches!(t.event, HostEvent::UpdateValue { .. }));
    assert_eq!(t.state.edited_raw_text(), "2.5");
    assert_eq!(value_of(&t.state), Some(json!({"count": 2.5})));
}

#[test]
fn test_refocus_keeps_unparsed_buffer() {
    let state = init(
        json!({"type": "object", "properties": {"count": {"type": "number"}}}),
        Some(json!({"count": 5})),
    );
    let focused = state.update(Event::Focus { path: Some(path!("count")) }).state;
    let typed = focused
        .update(Event::EditRawText {
            path: path!("count"),
            text: "12a".to_string(),
        })
        .state;

    let refocused = typed.update(Event::Focus { path: Some(path!("count")) }).state;
    assert_eq!(refocused.edited_raw_text(), "12a");
    assert!(!refocused.is_touched(&path!("count")));

    let requested = refocused.update(Event::RequestFocus { path: path!("count") });
    assert_eq!(requested.state.edited_raw_text(), "12a");
    assert_eq!(requested.effects.len(), 1);
    assert_eq!(value_of(&requested.state), Some(json!({"count": 5})));
}

#[test]
fn test_raw_json_editor() {
    let schema = json!({"type": "object", "properties": {"meta": {"type": "object"}}});
    let state = init(schema, Some(json!({})));

    let partial = state.update(Event::EditRawText {
        path: path!("meta"),
        text: "{\"a\": ".to_string(),
    });
    assert_eq!(partial.event, HostEvent::None);
    assert_eq!(value_of(&partial.state), Some(json!({})));

    let complete = partial.state.update(Event::EditRawText {
        path: path!("meta"),
        text: "{\"a\": [1]}".to_string(),
    });
    assert_eq!(value_of(&complete.state), Some(json!({"meta": {"a": [1]}})));
}

// ============================================================================
// DeleteProperty
// ============================================================================

#[test]
fn test_delete_root_clears_document() {
    let state = init(age_schema(), Some(json!({"age": 3})));
    let t = state.update(Event::DeleteProperty { path: Path::root() });
    assert_eq!(t.state.value(), None);
    assert!(t.state.errors().is_empty());
    assert_eq!(
        t.event,
        HostEvent::UpdateValue {
            value: None,
            errors: Default::default()
        }
    );
}

#[test]
fn test_delete_missing_path_is_noop() {
    let state = init(age_schema(), Some(json!({"age": 3})));
    let t = state.update(Event::DeleteProperty { path: path!("nope") });
    assert_eq!(t.event, HostEvent::None);
    assert_eq!(value_of(&t.state), Some(json!({"age": 3})));
}

#[test]
fn test_delete_revalidates() {
    let state = init(age_schema(), Some(json!({"age": 3})));
    let t = state.update(Event::DeleteProperty { path: path!("age") });
    assert_eq!(value_of(&t.state), Some(json!({})));
    assert_eq!(t.state.errors_at(&path!("age")), ["is required"]);
}

// ============================================================================
// AddItem
// ============================================================================

#[test]
fn test_add_item_to_empty_array() {
    let item = json!({"type": "string"});
    let state = init(json!({"type": "array", "items": item}), Some(json!([])));
    let add = Event::AddItem {
        parent: Path::root(),
        index: 0,
        item_schema: item,
    };

    let first = state.update(add.clone());
    assert_eq!(value_of(&first.state), Some(json!([""])));
    assert!(matches!(first.event, HostEvent::UpdateValue { .. }));
    assert_eq!(
        first.effects,
        vec![Effect::Focus {
            id: "form_0".to_string()
        }]
    );
    assert_eq!(first.state.focused_path(), Some(&path!(0)));

    let second = first.state.update(add);
    assert_eq!(second.event, HostEvent::None);
    assert!(second.effects.is_empty());
    assert_eq!(value_of(&second.state), Some(json!([""])));
}

#[test]
fn test_add_item_creates_missing_array_with_defaults() {
    let item = json!({
        "type": "object",
        "properties": {"qty": {"type": "integer", "default": 1}, "sku": {"type": "string"}}
    });
    let state = init(
        json!({"type": "object", "properties": {"lines": {"type": "array", "items": item}}}),
        Some(json!({})),
    );
    let t = state.update(Event::AddItem {
        parent: path!("lines"),
        index: 0,
        item_schema: item,
    });
    assert_eq!(value_of(&t.state), Some(json!({"lines": [{"qty": 1}]})));
}

#[test]
fn test_add_item_keeps_non_array_parent() {
    let item = json!({"type": "string"});
    let state = init(json!({}), Some(json!({"tags": "a,b", "meta": {"k": 1}})));
    for parent in [path!("tags"), path!("meta")] {
        let t = state.update(Event::AddItem {
            parent,
            index: 0,
            item_schema: item.clone(),
        });
        assert_eq!(t.event, HostEvent::None);
        assert!(t.effects.is_empty());
        assert_eq!(
            value_of(&t.state),
            Some(json!({"tags": "a,b", "meta": {"k": 1}}))
        );
    }
}

#[test]
fn test_add_item_replaces_null_parent() {
    let item = json!({"type": "string"});
    let state = init(json!({}), Some(json!({"tags": null})));
    let t = state.update(Event::AddItem {
        parent: path!("tags"),
        index: 0,
        item_schema: item,
    });
    assert_eq!(value_of(&t.state), Some(json!({"tags": [""]})));
}

#[test]
fn test_add_item_out_of_range_is_noop() {
    let item = json!({"type": "string"});
    let state = init(json!({"type": "array", "items": item}), Some(json!(["a"])));
    let t = state.update(Event::AddItem {
        parent: Path::root(),
        index: 3,
        item_schema: item,
    });
    assert_eq!(t.event, HostEvent::None);
    assert_eq!(value_of(&t.state), Some(json!(["a"])));
}

#[test]
fn test_add_item_measures_multiline_fields() {
    let item = json!({
        "type": "object",
        "properties": {"body": {"type": "string", "widget": "multiline"}}
    });
    let state = init(json!({"type": "array", "items": item}), Some(json!([])));
    let t = state.update(Event::AddItem {
        parent: Path::root(),
        index: 0,
        item_schema: item,
    });
    assert!(t.effects.contains(&Effect::Measure {
        path: path!(0, "body"),
        id: "form_0_body".to_string()
    }));
}

// ============================================================================
// UI-only transitions
// ============================================================================

#[test]
fn test_toggle_node_only_touches_expansion() {
    let state = init(age_schema(), None);
    let t = state.update(Event::ToggleNode {
        path: path!("address"),
    });
    assert!(t.state.expanded_paths().contains(&path!("address")));
    assert_eq!(t.event, HostEvent::None);
    assert_eq!(t.state.value(), state.value());
    assert_eq!(t.state.errors(), state.errors());

    let back = t.state.update(Event::ToggleNode {
        path: path!("address"),
    });
    assert!(!back.state.expanded_paths().contains(&path!("address")));
}

#[test]
fn test_focus_blur_tracks_touched() {
    let schema = json!({
        "type": "object",
        "properties": {"a": {"type": "number"}, "b": {"type": "string"}}
    });
    let state = init(schema, Some(json!({"a": 7, "b": "x"})));

    let focused = state.update(Event::Focus { path: Some(path!("a")) }).state;
    assert_eq!(focused.focused_path(), Some(&path!("a")));
    assert_eq!(focused.edited_raw_text(), "7");
    assert!(!focused.is_touched(&path!("a")));

    let moved = focused.update(Event::Focus { path: Some(path!("b")) }).state;
    assert!(moved.is_touched(&path!("a")));
    assert!(!moved.is_touched(&path!("b")));

    let blurred = moved.update(Event::Focus { path: None }).state;
    assert_eq!(blurred.focused_path(), None);
    assert!(blurred.is_touched(&path!("b")));
    assert_eq!(blurred.edited_raw_text(), "");

    let again = blurred.update(Event::Blur).state;
    assert_eq!(again.focused_path(), None);
}

#[test]
fn test_request_focus_emits_effect() {
    let state = init(age_schema(), None);
    let t = state.update(Event::RequestFocus { path: path!("age") });
    assert_eq!(
        t.effects,
        vec![Effect::Focus {
            id: "form_age".to_string()
        }]
    );
    assert_eq!(t.state.focused_path(), Some(&path!("age")));

    let acked = t.state.update(Event::FocusAcknowledged);
    assert_eq!(acked.event, HostEvent::None);
    assert!(acked.effects.is_empty());
}

#[test]
fn test_show_secret_toggle() {
    let schema = json!({
        "type": "object",
        "properties": {"token": {"type": "string", "widget": "password"}}
    });
    let state = init(schema, Some(json!({"token": "s3cr3t"})));
    let token = |s: &FormState| match render(s).widget {
        ViewWidget::Object { children, .. } => children[0].widget.clone(),
        other => panic!("unexpected {other:?}"),
    };
    assert!(matches!(token(&state), ViewWidget::TextField { secret: true, revealed: false, .. }));

    let t = state.update(Event::ToggleShowSecret);
    assert_eq!(t.event, HostEvent::None);
    assert_eq!(t.state.value(), state.value());
    assert!(matches!(token(&t.state), ViewWidget::TextField { secret: true, revealed: true, .. }));
}

#[test]
fn test_init_requests_measurements() {
    let schema = json!({
        "type": "object",
        "properties": {
            "bio": {"type": "string", "widget": "multiline"},
            "name": {"type": "string"}
        }
    });
    init_tracing();
    let Transition { state, event, effects } =
        FormState::init(schema, None, FormConfig::new("user")).unwrap();
    assert_eq!(event, HostEvent::None);
    assert_eq!(
        effects,
        vec![Effect::Measure {
            path: path!("bio"),
            id: "user_bio".to_string()
        }]
    );

    let measured = state
        .update(Event::ViewportMeasured {
            path: path!("bio"),
            height: 80,
        })
        .state;
    assert_eq!(measured.field_measured_heights().get(&path!("bio")), Some(&80));
    let stale = measured
        .update(Event::ViewportMeasured {
            path: path!("bio"),
            height: 40,
        })
        .state;
    assert_eq!(stale.field_measured_heights().get(&path!("bio")), Some(&40));
}

#[test]
fn test_expandable_objects_start_expanded_unless_collapsing() {
    let schema = json!({
        "type": "object",
        "properties": {
            "address": {"type": "object", "expandable": true, "properties": {"city": {"type": "string"}}},
            "pinned": {"type": "object", "expandable": true, "collapsed": true, "properties": {"x": {"type": "string"}}}
        }
    });
    let open = FormState::init(schema.clone(), None, FormConfig::default())
        .unwrap()
        .state;
    assert!(open.expanded_paths().contains(&path!("address")));
    assert!(!open.expanded_paths().contains(&path!("pinned")));

    let closed = FormState::init(
        schema,
        None,
        FormConfig::default().with_collapse_nested_objects(true),
    )
    .unwrap()
    .state;
    assert!(closed.expanded_paths().is_empty());
}

#[test]
fn test_rules_follow_edits() {
    let schema = json!({
        "type": "object",
        "properties": {
            "kind": {"type": "string"},
            "detail": {
                "type": "string",
                "rule": {"effect": "SHOW", "condition": {"scope": "kind", "schema": {"const": "full"}}}
            },
            "broken": {"type": "string", "rule": {"effect": "HIDE", "condition": {"scope": "#", "schema": {"type": 3}}}}
        }
    });
    let state = init(schema, Some(json!({"kind": "short"})));
    let hidden = |s: &FormState, name: &str| match render(s).widget {
        ViewWidget::Object { children, .. } => children
            .iter()
            .find(|c| c.label == name)
            .map(|c| c.hidden)
            .unwrap(),
        other => panic!("unexpected {other:?}"),
    };
    assert!(hidden(&state, "detail"));
    assert!(!hidden(&state, "broken"));

    let full = state
        .update(Event::EditValue {
            path: path!("kind"),
            value: "full".into(),
        })
        .state;
    assert!(!hidden(&full, "detail"));
    assert!(!hidden(&full, "broken"));
}

#[test]
fn test_invalid_schema_is_rejected() {
    let err = FormState::init(json!({"type": 5}), None, FormConfig::default()).unwrap_err();
    assert!(matches!(err, tirea_form::FormError::InvalidSchema { .. }));
}
