use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::reference::AttributeRef;
use super::value::Value;
use super::wire;

/// Quantity bounds attached to an attribute by a `QUANTITY` action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
}

impl QuantityConstraints {
    #[must_use]
    pub fn new(min: Option<u32>, max: Option<u32>, step: Option<u32>) -> Self {
        Self { min, max, step }
    }

    /// True when none of min, max or step is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.step.is_none()
    }
}

/// What an action does to its target attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    Show,
    Hide,
    /// Restrict the allowed values to these tokens (intersected with the
    /// declared values at compile time).
    ShowOnly(Vec<String>),
    SetDefault(Option<String>),
    Quantity(QuantityConstraints),
    /// An action type this engine does not know. Skipped with a diagnostic.
    Unsupported(String),
}

impl ActionKind {
    /// The wire name of this action kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Show => "SHOW",
            ActionKind::Hide => "HIDE",
            ActionKind::ShowOnly(_) => "SHOW_ONLY",
            ActionKind::SetDefault(_) => "SET_DEFAULT",
            ActionKind::Quantity(_) => "QUANTITY",
            ActionKind::Unsupported(kind) => kind,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One "then" effect of a rule, aimed at a target attribute.
///
/// The target is kept in its raw reference form; it is resolved against the
/// catalog when the rule book is compiled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawAction")]
pub struct Action {
    pub target: Option<AttributeRef>,
    pub kind: ActionKind,
}

impl Action {
    #[must_use]
    pub fn new(target: impl Into<AttributeRef>, kind: ActionKind) -> Self {
        Self {
            target: Some(target.into()),
            kind,
        }
    }

    #[must_use]
    pub fn show(target: impl Into<AttributeRef>) -> Self {
        Self::new(target, ActionKind::Show)
    }

    #[must_use]
    pub fn hide(target: impl Into<AttributeRef>) -> Self {
        Self::new(target, ActionKind::Hide)
    }

    #[must_use]
    pub fn show_only<I, S>(target: impl Into<AttributeRef>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            target,
            ActionKind::ShowOnly(values.into_iter().map(Into::into).collect()),
        )
    }

    #[must_use]
    pub fn set_default(target: impl Into<AttributeRef>, value: impl Into<String>) -> Self {
        Self::new(target, ActionKind::SetDefault(Some(value.into())))
    }

    #[must_use]
    pub fn quantity(
        target: impl Into<AttributeRef>,
        min: Option<u32>,
        max: Option<u32>,
        step: Option<u32>,
    ) -> Self {
        Self::new(
            target,
            ActionKind::Quantity(QuantityConstraints::new(min, max, step)),
        )
    }
}

impl Action {
    /// Decode one element of a JSON action list. Never fails: an element that
    /// is not an action object becomes an action without a target.
    pub(crate) fn from_wire(raw: Json) -> Self {
        serde_json::from_value(raw).unwrap_or(Action {
            target: None,
            kind: ActionKind::Unsupported(String::new()),
        })
    }
}

/// Flat wire shape of an action. Every payload field is optional, and a
/// field of the wrong shape counts as missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAction {
    #[serde(rename = "type", default, deserialize_with = "wire::or_default")]
    kind: String,
    #[serde(default, deserialize_with = "wire::optional")]
    target_attribute: Option<AttributeRef>,
    #[serde(default, deserialize_with = "wire::tokens")]
    allowed_values: Vec<String>,
    #[serde(default, deserialize_with = "wire::optional")]
    default_value: Option<Value>,
    #[serde(default, deserialize_with = "wire::optional")]
    min_quantity: Option<u32>,
    #[serde(default, deserialize_with = "wire::optional")]
    max_quantity: Option<u32>,
    #[serde(default, deserialize_with = "wire::optional")]
    step_quantity: Option<u32>,
}

impl From<RawAction> for Action {
    fn from(raw: RawAction) -> Self {
        let kind = match raw.kind.as_str() {
            "SHOW" => ActionKind::Show,
            "HIDE" => ActionKind::Hide,
            "SHOW_ONLY" => ActionKind::ShowOnly(raw.allowed_values),
            "SET_DEFAULT" => ActionKind::SetDefault(raw.default_value.as_ref().map(Value::as_text)),
            "QUANTITY" => ActionKind::Quantity(QuantityConstraints::new(
                raw.min_quantity,
                raw.max_quantity,
                raw.step_quantity,
            )),
            _ => ActionKind::Unsupported(raw.kind),
        };
        Action {
            target: raw.target_attribute,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Action {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn show_only_wire_shape() {
        let action = parse(
            r#"{"type": "SHOW_ONLY", "targetAttribute": "size", "allowedValues": ["Small", "Medium"]}"#,
        );
        assert_eq!(action, Action::show_only("size", ["Small", "Medium"]));
    }

    #[test]
    fn embedded_target() {
        let action = parse(r#"{"type": "HIDE", "targetAttribute": {"_id": "finish"}}"#);
        assert_eq!(action.target.as_ref().and_then(AttributeRef::resolve), Some("finish"));
        assert_eq!(action.kind, ActionKind::Hide);
    }

    #[test]
    fn quantity_wire_shape() {
        let action = parse(
            r#"{"type": "QUANTITY", "targetAttribute": "qty", "minQuantity": 10, "stepQuantity": 5}"#,
        );
        assert_eq!(
            action.kind,
            ActionKind::Quantity(QuantityConstraints::new(Some(10), None, Some(5)))
        );
    }

    #[test]
    fn missing_target_and_unknown_type() {
        let action = parse(r#"{"type": "BLINK"}"#);
        assert_eq!(action.target, None);
        assert_eq!(action.kind, ActionKind::Unsupported("BLINK".into()));
    }

    #[test]
    fn set_default_numeric_payload_uses_string_form() {
        let action = parse(r#"{"type": "SET_DEFAULT", "targetAttribute": "qty", "defaultValue": 250}"#);
        assert_eq!(action.kind, ActionKind::SetDefault(Some("250".into())));
    }

    #[test]
    fn malformed_payloads_have_no_effect() {
        let action = parse(
            r#"{"type": "QUANTITY", "targetAttribute": "qty", "minQuantity": -1, "maxQuantity": "10", "stepQuantity": 2}"#,
        );
        assert_eq!(
            action.kind,
            ActionKind::Quantity(QuantityConstraints::new(None, None, Some(2)))
        );

        let action = parse(r#"{"type": "SHOW_ONLY", "targetAttribute": "size", "allowedValues": null}"#);
        assert_eq!(action.kind, ActionKind::ShowOnly(vec![]));

        let action = parse(
            r#"{"type": "SHOW_ONLY", "targetAttribute": "size", "allowedValues": [{"value": "Small"}, "Medium", 10]}"#,
        );
        assert_eq!(action.kind, ActionKind::ShowOnly(vec!["Medium".into(), "10".into()]));

        let action = parse(r#"{"type": null, "targetAttribute": "size"}"#);
        assert_eq!(action.kind, ActionKind::Unsupported(String::new()));
    }

    #[test]
    fn non_object_action_has_no_target() {
        let action = Action::from_wire(serde_json::json!("HIDE size"));
        assert_eq!(action.target, None);
    }

    #[test]
    fn empty_quantity() {
        assert!(QuantityConstraints::default().is_empty());
        assert!(!QuantityConstraints::new(None, Some(3), None).is_empty());
    }

    #[test]
    fn kind_display() {
        assert_eq!(ActionKind::ShowOnly(vec![]).to_string(), "SHOW_ONLY");
        assert_eq!(ActionKind::Unsupported("BLINK".into()).to_string(), "BLINK");
    }
}
