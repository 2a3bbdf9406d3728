use serde::Deserialize;
use serde_json::Value as Json;

use super::action::{Action, QuantityConstraints};
use super::reference::AttributeRef;
use super::value::Value;
use super::wire;

/// The "when" clause of a rule: one attribute/value equality test.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    #[serde(default, deserialize_with = "wire::optional")]
    pub attribute: Option<AttributeRef>,
    #[serde(default, deserialize_with = "wire::optional")]
    pub value: Option<Value>,
}

impl Condition {
    #[must_use]
    pub fn new(attribute: impl Into<AttributeRef>, value: impl Into<Value>) -> Self {
        Self {
            attribute: Some(attribute.into()),
            value: Some(value.into()),
        }
    }
}

/// A declarative dependency: when one attribute equals a value, apply actions
/// to other attributes.
///
/// Rules are read-only inputs. They can be built with
/// [`RuleBookBuilder`](super::RuleBookBuilder), parsed from the text DSL, or
/// deserialized from the JSON wire shape. Any part may be missing or
/// malformed; compilation skips what it cannot resolve.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawRule")]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub condition: Option<Condition>,
    pub actions: Vec<Action>,
    /// Evaluation order key. Missing means 0.
    pub priority: Option<i64>,
}

/// Wire shape of a rule. Fields that cannot be interpreted decode as
/// absent; compilation then reports what that leaves unusable.
#[derive(Deserialize)]
struct RawRule {
    #[serde(rename = "_id", default, deserialize_with = "wire::optional")]
    underscore_id: Option<String>,
    #[serde(default, deserialize_with = "wire::optional")]
    id: Option<String>,
    #[serde(default, deserialize_with = "wire::or_default")]
    name: String,
    #[serde(default, deserialize_with = "wire::optional")]
    condition: Option<Condition>,
    #[serde(default)]
    actions: Option<Json>,
    #[serde(default, deserialize_with = "wire::optional")]
    priority: Option<i64>,
}

impl From<RawRule> for Rule {
    fn from(raw: RawRule) -> Self {
        Rule {
            id: wire::object_id(raw.underscore_id, raw.id).unwrap_or_default(),
            name: raw.name,
            condition: raw.condition,
            actions: wire::each(raw.actions, Action::from_wire),
            priority: raw.priority,
        }
    }
}

impl Rule {
    /// Decode one element of a JSON rule list. Never fails: an element that
    /// is not a rule object becomes an empty rule, which compilation skips
    /// with a diagnostic.
    pub(crate) fn from_wire(raw: Json) -> Self {
        serde_json::from_value(raw).unwrap_or_default()
    }
}

impl Rule {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// The priority used for scheduling.
    #[must_use]
    pub fn effective_priority(&self) -> i64 {
        self.priority.unwrap_or(0)
    }
}

/// A compiled action: target resolved to a catalog slot, payload reduced to
/// exactly what the applier needs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompiledAction {
    pub(crate) target: usize,
    pub(crate) effect: Effect,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Effect {
    Show,
    Hide,
    /// Already intersected with the target's declared values, in declared order.
    Restrict(Vec<String>),
    SetDefault(String),
    Quantity(QuantityConstraints),
}

/// A rule whose condition and action targets have been resolved to catalog
/// slots.
///
/// Produced by the compilation step and stored inside a
/// [`RuleBook`](super::RuleBook) in scheduled order. `position` is the rule's
/// index in the input rule list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompiledRule {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) attribute: usize,
    pub(crate) expected: String,
    pub(crate) actions: Vec<CompiledAction>,
    pub(crate) priority: i64,
    pub(crate) position: usize,
}
