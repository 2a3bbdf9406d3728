use serde::{Deserialize, Serialize};

use super::action::QuantityConstraints;
use super::attribute::Attribute;

/// The derived constraints for one attribute after an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeState {
    pub id: String,
    pub is_visible: bool,
    /// Always a subset of the attribute's declared value tokens, in declared order.
    pub allowed_values: Vec<String>,
    pub default_value: Option<String>,
    pub quantity_constraints: Option<QuantityConstraints>,
}

impl AttributeState {
    /// Whether `token` is currently selectable.
    #[must_use]
    pub fn allows(&self, token: &str) -> bool {
        self.allowed_values.iter().any(|v| v == token)
    }
}

/// Per-attribute state while one evaluation is in flight.
///
/// The two flags record whether any fired rule touched visibility or the
/// allowed values; the cascade uses them and they are dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WorkingState {
    pub(crate) is_visible: bool,
    pub(crate) allowed_values: Vec<String>,
    pub(crate) default_value: Option<String>,
    pub(crate) quantity: Option<QuantityConstraints>,
    pub(crate) visibility_set_by_rule: bool,
    pub(crate) values_restricted_by_rule: bool,
}

impl WorkingState {
    /// Fully permissive state for an attribute nobody has touched yet.
    pub(crate) fn unrestricted(attribute: &Attribute) -> Self {
        Self {
            is_visible: true,
            allowed_values: attribute.declared_tokens(),
            default_value: attribute.default_value.clone(),
            quantity: None,
            visibility_set_by_rule: false,
            values_restricted_by_rule: false,
        }
    }

    pub(crate) fn allows(&self, token: &str) -> bool {
        self.allowed_values.iter().any(|v| v == token)
    }

    pub(crate) fn finish(self, attribute: &Attribute) -> AttributeState {
        AttributeState {
            id: attribute.id.clone(),
            is_visible: self.is_visible,
            allowed_values: self.allowed_values,
            default_value: self.default_value,
            quantity_constraints: self.quantity,
        }
    }
}
