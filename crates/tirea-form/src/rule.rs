//! Declarative enable/show rules.
//!
//! A rule pairs an effect with a condition over the live document:
//!
//! ```json
//! {
//!   "effect": "HIDE",
//!   "condition": {"scope": "#/properties/kind", "schema": {"const": "simple"}}
//! }
//! ```
//!
//! The condition holds when the value at `scope` validates against `schema`.
//! Scopes may be schema-style (`#/properties/a/properties/b`), an absolute
//! data pointer (`/a/b`), the whole document (`#` or empty), or a bare
//! relative pointer (`b/c`) resolved against the node's parent, which lets
//! array items refer to their siblings.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tirea_form_state::{JsonValue, Path};
use tracing::warn;

/// What a rule does when its condition holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleEffect {
    Hide,
    Show,
    Enable,
    Disable,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default)]
    pub scope: String,
    #[serde(default = "accept_all")]
    pub schema: Value,
    /// Treat a missing scoped value as failing the condition.
    #[serde(default)]
    pub fail_when_undefined: bool,
}

fn accept_all() -> Value {
    Value::Bool(true)
}

#[derive(Deserialize)]
struct RawRule {
    effect: RuleEffect,
    condition: Condition,
}

/// A rule with its condition schema compiled.
#[derive(Clone)]
pub struct Rule {
    pub effect: RuleEffect,
    pub condition: Condition,
    compiled: Arc<jsonschema::Validator>,
}

impl Rule {
    /// Parse a `rule` keyword value and compile its condition.
    ///
    /// Malformed rules, unsupported scopes and condition schemas that do not
    /// compile are dropped with a warning.
    pub fn parse(raw: &Value) -> Option<Self> {
        let RawRule { effect, condition } = match serde_json::from_value(raw.clone()) {
            Ok(rule) => rule,
            Err(err) => {
                warn!(error = %err, "ignoring malformed rule");
                return None;
            }
        };
        if scope_path(&condition.scope, &Path::root()).is_none() {
            warn!(scope = %condition.scope, "ignoring rule with unsupported scope");
            return None;
        }
        match jsonschema::validator_for(&condition.schema) {
            Ok(compiled) => Some(Self {
                effect,
                condition,
                compiled: Arc::new(compiled),
            }),
            Err(err) => {
                warn!(error = %err, "ignoring rule whose condition schema does not compile");
                None
            }
        }
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.effect == other.effect && self.condition == other.condition
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("effect", &self.effect)
            .field("condition", &self.condition)
            .finish_non_exhaustive()
    }
}

/// Outcome of evaluating a node's rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuleState {
    pub disabled: bool,
    pub hidden: bool,
}

/// Evaluate `rule` for the node at `path`.
///
/// Never fails and never compiles anything: the condition was compiled when
/// the rule was parsed.
pub fn apply_rule(rule: Option<&Rule>, document: Option<&JsonValue>, path: &Path) -> RuleState {
    let Some(rule) = rule else {
        return RuleState::default();
    };
    let Some(holds) = condition_holds(rule, document, path) else {
        return RuleState::default();
    };
    match rule.effect {
        RuleEffect::Hide => RuleState {
            disabled: false,
            hidden: holds,
        },
        RuleEffect::Show => RuleState {
            disabled: false,
            hidden: !holds,
        },
        RuleEffect::Disable => RuleState {
            disabled: holds,
            hidden: false,
        },
        RuleEffect::Enable => RuleState {
            disabled: !holds,
            hidden: false,
        },
    }
}

fn condition_holds(rule: &Rule, document: Option<&JsonValue>, path: &Path) -> Option<bool> {
    let target = scope_path(&rule.condition.scope, path)?;
    let scoped = document.and_then(|doc| doc.get(&target).ok());
    Some(match scoped {
        Some(value) => rule.compiled.is_valid(&Value::from(value)),
        None => !rule.condition.fail_when_undefined,
    })
}

/// Resolve a rule scope to a document path.
pub fn scope_path(scope: &str, node_path: &Path) -> Option<Path> {
    if scope.is_empty() || scope == "#" {
        return Some(Path::root());
    }
    if let Some(rest) = scope.strip_prefix("#/") {
        let mut target = Path::root();
        let mut segs = rest.split('/');
        while let Some(keyword) = segs.next() {
            match keyword {
                "properties" => target.push(segs.next()?),
                _ => return None,
            }
        }
        return Some(target);
    }
    if scope.starts_with('/') {
        return Path::from_pointer(scope).ok();
    }
    let base = node_path.parent().unwrap_or_default();
    Some(base.join(&Path::from_segments(scope.split('/'))))
}
