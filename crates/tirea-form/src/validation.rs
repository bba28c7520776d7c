//! Schema validation with default application.
//!
//! Validation runs in two steps: schema `default`s are merged into the
//! document, then the merged document is checked with `jsonschema`. Defaults
//! are applied even when the document ends up invalid.

use crate::schema::{self, SchemaType};
use crate::{FormError, FormResult};
use jsonschema::error::ValidationErrorKind;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tirea_form_state::{JsonValue, Path};

/// Validation messages grouped by the path they point at.
pub type ErrorMap = BTreeMap<Path, Vec<String>>;

/// Structured error kinds with a dedicated message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueKind {
    Required,
    Type,
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
    MinLength,
    MaxLength,
    Pattern,
    Enum,
    Const,
    MinItems,
    MaxItems,
    Format,
    MultipleOf,
    AdditionalProperties,
    UniqueItems,
    Other,
}

/// One validation failure.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidationIssue {
    /// Document path the failure belongs to. `required` failures point at the
    /// missing property, not at its parent.
    pub path: Path,
    pub kind: IssueKind,
    /// Value of the failing keyword in the schema (the limit, pattern, type...).
    pub detail: Option<Value>,
}

impl ValidationIssue {
    /// Human-readable message for this issue.
    pub fn message(&self) -> String {
        const GENERIC: &str = "is invalid";

        let Some(detail) = self.detail.as_ref() else {
            return match self.kind {
                IssueKind::Required => "is required".to_string(),
                IssueKind::UniqueItems => "must not contain duplicate items".to_string(),
                IssueKind::AdditionalProperties => "has unexpected properties".to_string(),
                _ => GENERIC.to_string(),
            };
        };
        let d = Plain(detail);
        match self.kind {
            IssueKind::Required => "is required".to_string(),
            IssueKind::Type => format!("must be {d}"),
            IssueKind::Minimum => format!("must be >= {d}"),
            IssueKind::Maximum => format!("must be <= {d}"),
            IssueKind::ExclusiveMinimum => format!("must be > {d}"),
            IssueKind::ExclusiveMaximum => format!("must be < {d}"),
            IssueKind::MinLength => format!("must be at least {d} characters"),
            IssueKind::MaxLength => format!("must be at most {d} characters"),
            IssueKind::Pattern => format!("must match pattern {d}"),
            IssueKind::Enum => format!("must be one of {d}"),
            IssueKind::Const => format!("must be equal to {d}"),
            IssueKind::MinItems => format!("must have at least {d} items"),
            IssueKind::MaxItems => format!("must have at most {d} items"),
            IssueKind::Format => format!("must be a valid {d}"),
            IssueKind::MultipleOf => format!("must be a multiple of {d}"),
            IssueKind::AdditionalProperties => "has unexpected properties".to_string(),
            IssueKind::UniqueItems => "must not contain duplicate items".to_string(),
            IssueKind::Other => GENERIC.to_string(),
        }
    }
}

/// Keyword values rendered without JSON quoting; lists joined with ", ".
struct Plain<'a>(&'a Value);

impl fmt::Display for Plain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", Plain(item))?;
                }
                Ok(())
            }
            other => write!(f, "{other}"),
        }
    }
}

/// Group issues by path, preserving encounter order within each path.
pub fn normalize_errors(issues: &[ValidationIssue]) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for issue in issues {
        errors
            .entry(issue.path.clone())
            .or_default()
            .push(issue.message());
    }
    errors
}

/// A failed validation.
#[derive(Clone, Debug, PartialEq)]
pub struct Invalid {
    /// The document with defaults applied.
    pub value: JsonValue,
    pub issues: Vec<ValidationIssue>,
}

/// Compiled schema shared between form states.
#[derive(Clone)]
pub struct Validator {
    schema: Arc<Value>,
    compiled: Arc<jsonschema::Validator>,
}

impl Validator {
    pub fn new(schema: Value) -> FormResult<Self> {
        let compiled = jsonschema::validator_for(&schema)
            .map_err(|err| FormError::invalid_schema(err.to_string()))?;
        Ok(Self {
            schema: Arc::new(schema),
            compiled: Arc::new(compiled),
        })
    }

    #[inline]
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub(crate) fn shared_schema(&self) -> Arc<Value> {
        Arc::clone(&self.schema)
    }

    /// Apply defaults to `value` and validate the result.
    ///
    /// ```
    /// use tirea_form::Validator;
    /// use serde_json::json;
    ///
    /// let validator = Validator::new(json!({
    ///     "type": "object",
    ///     "properties": {"role": {"type": "string", "default": "user"}}
    /// })).unwrap();
    /// let value = validator.validate(&json!({}).into()).unwrap();
    /// assert_eq!(serde_json::Value::from(value), json!({"role": "user"}));
    /// ```
    pub fn validate(&self, value: &JsonValue) -> Result<JsonValue, Invalid> {
        let mut raw = Value::from(value);
        apply_defaults(&self.schema, &mut raw);
        let issues: Vec<ValidationIssue> = self
            .compiled
            .iter_errors(&raw)
            .map(|err| issue_from(&self.schema, &err))
            .collect();
        if issues.is_empty() {
            Ok(raw.into())
        } else {
            Err(Invalid {
                value: raw.into(),
                issues,
            })
        }
    }

    /// Validate and normalize in one step. Valid documents yield an empty map.
    pub fn errors_for(&self, value: &JsonValue) -> ErrorMap {
        match self.validate(value) {
            Ok(_) => ErrorMap::new(),
            Err(invalid) => normalize_errors(&invalid.issues),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

fn issue_from(root: &Value, err: &jsonschema::ValidationError<'_>) -> ValidationIssue {
    let mut path = Path::from_pointer(&err.instance_path.to_string()).unwrap_or_default();
    let detail = root.pointer(&err.schema_path.to_string()).cloned();
    let kind = match &err.kind {
        ValidationErrorKind::Required { property } => {
            if let Some(name) = property.as_str() {
                path.push(name);
            }
            IssueKind::Required
        }
        ValidationErrorKind::Type { .. } => IssueKind::Type,
        ValidationErrorKind::Minimum { .. } => IssueKind::Minimum,
        ValidationErrorKind::Maximum { .. } => IssueKind::Maximum,
        ValidationErrorKind::ExclusiveMinimum { .. } => IssueKind::ExclusiveMinimum,
        ValidationErrorKind::ExclusiveMaximum { .. } => IssueKind::ExclusiveMaximum,
        ValidationErrorKind::MinLength { .. } => IssueKind::MinLength,
        ValidationErrorKind::MaxLength { .. } => IssueKind::MaxLength,
        ValidationErrorKind::Pattern { .. } => IssueKind::Pattern,
        ValidationErrorKind::Enum { .. } => IssueKind::Enum,
        ValidationErrorKind::Constant { .. } => IssueKind::Const,
        ValidationErrorKind::MinItems { .. } => IssueKind::MinItems,
        ValidationErrorKind::MaxItems { .. } => IssueKind::MaxItems,
        ValidationErrorKind::Format { .. } => IssueKind::Format,
        ValidationErrorKind::MultipleOf { .. } => IssueKind::MultipleOf,
        ValidationErrorKind::AdditionalProperties { .. } => IssueKind::AdditionalProperties,
        ValidationErrorKind::UniqueItems { .. } => IssueKind::UniqueItems,
        _ => IssueKind::Other,
    };
    let detail = match kind {
        IssueKind::Required | IssueKind::AdditionalProperties | IssueKind::UniqueItems => None,
        _ => detail,
    };
    ValidationIssue { path, kind, detail }
}

/// Merge schema `default`s into absent object properties, recursively.
///
/// Existing values are never overwritten. Array elements are descended with
/// the item schema.
pub fn apply_defaults(node: &Value, value: &mut Value) {
    match value {
        Value::Object(map) => {
            let Some(props) = schema::properties(node) else {
                return;
            };
            for (name, prop) in props {
                match map.get_mut(name) {
                    Some(child) => apply_defaults(prop, child),
                    None => {
                        if let Some(default) = schema::default(prop) {
                            let mut filled = default.clone();
                            apply_defaults(prop, &mut filled);
                            map.insert(name.clone(), filled);
                        }
                    }
                }
            }
        }
        Value::Array(items) => {
            if let Some(item) = schema::items(node) {
                for element in items {
                    apply_defaults(item, element);
                }
            }
        }
        _ => {}
    }
}

/// Starting value for a new node governed by `node`.
///
/// The explicit `default` wins; otherwise an empty value of the declared
/// type. Property defaults are then merged in.
///
/// ```
/// use tirea_form::default_value_for;
/// use serde_json::json;
///
/// let node = json!({"type": "object", "properties": {"n": {"type": "integer", "default": 1}}});
/// assert_eq!(serde_json::Value::from(default_value_for(&node)), json!({"n": 1}));
/// assert_eq!(serde_json::Value::from(default_value_for(&json!({"type": "string"}))), json!(""));
/// ```
pub fn default_value_for(node: &Value) -> JsonValue {
    let mut seed = match schema::default(node) {
        Some(default) => default.clone(),
        None => match SchemaType::of(node) {
            SchemaType::Object => Value::Object(serde_json::Map::new()),
            SchemaType::Array => Value::Array(Vec::new()),
            SchemaType::String => Value::String(String::new()),
            SchemaType::Bool => Value::Bool(false),
            SchemaType::Number | SchemaType::Integer => Value::from(0),
            SchemaType::Null | SchemaType::Unknown => Value::Null,
        },
    };
    apply_defaults(node, &mut seed);
    seed.into()
}
