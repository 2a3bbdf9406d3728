use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rule or action that compilation had to skip.
///
/// Diagnostics never abort compilation or evaluation: the offending rule (or
/// the single offending action) is dropped and everything else proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Diagnostic {
    #[error("rule '{rule}' has no condition")]
    MissingCondition { rule: String },

    #[error("rule '{rule}' has a condition without a resolvable attribute reference")]
    UnresolvedConditionAttribute { rule: String },

    #[error("rule '{rule}' has a condition without an expected value")]
    MissingExpectedValue { rule: String },

    #[error("rule '{rule}' conditions on unknown attribute '{attribute}'")]
    UnknownConditionAttribute { rule: String, attribute: String },

    #[error("action {action} of rule '{rule}' has no target attribute")]
    MissingActionTarget { rule: String, action: usize },

    #[error("action {action} of rule '{rule}' has an unresolvable target reference")]
    UnresolvedActionTarget { rule: String, action: usize },

    #[error("action {action} of rule '{rule}' targets unknown attribute '{attribute}'")]
    UnknownActionTarget {
        rule: String,
        action: usize,
        attribute: String,
    },

    #[error("action {action} of rule '{rule}' has unsupported type '{kind}'")]
    UnsupportedAction {
        rule: String,
        action: usize,
        kind: String,
    },
}

impl Diagnostic {
    /// The label of the rule this diagnostic is about.
    #[must_use]
    pub fn rule(&self) -> &str {
        match self {
            Diagnostic::MissingCondition { rule }
            | Diagnostic::UnresolvedConditionAttribute { rule }
            | Diagnostic::MissingExpectedValue { rule }
            | Diagnostic::UnknownConditionAttribute { rule, .. }
            | Diagnostic::MissingActionTarget { rule, .. }
            | Diagnostic::UnresolvedActionTarget { rule, .. }
            | Diagnostic::UnknownActionTarget { rule, .. }
            | Diagnostic::UnsupportedAction { rule, .. } => rule,
        }
    }

    /// Whether the whole rule was dropped, as opposed to a single action.
    #[must_use]
    pub fn skips_rule(&self) -> bool {
        matches!(
            self,
            Diagnostic::MissingCondition { .. }
                | Diagnostic::UnresolvedConditionAttribute { .. }
                | Diagnostic::MissingExpectedValue { .. }
                | Diagnostic::UnknownConditionAttribute { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_condition_message() {
        let d = Diagnostic::MissingCondition {
            rule: "red_sizes".into(),
        };
        assert_eq!(d.to_string(), "rule 'red_sizes' has no condition");
        assert!(d.skips_rule());
    }

    #[test]
    fn unknown_condition_attribute_message() {
        let d = Diagnostic::UnknownConditionAttribute {
            rule: "r1".into(),
            attribute: "colour".into(),
        };
        assert_eq!(d.to_string(), "rule 'r1' conditions on unknown attribute 'colour'");
    }

    #[test]
    fn missing_action_target_message() {
        let d = Diagnostic::MissingActionTarget {
            rule: "r1".into(),
            action: 2,
        };
        assert_eq!(d.to_string(), "action 2 of rule 'r1' has no target attribute");
        assert!(!d.skips_rule());
        assert_eq!(d.rule(), "r1");
    }

    #[test]
    fn unknown_action_target_message() {
        let d = Diagnostic::UnknownActionTarget {
            rule: "r1".into(),
            action: 0,
            attribute: "finish".into(),
        };
        assert_eq!(
            d.to_string(),
            "action 0 of rule 'r1' targets unknown attribute 'finish'"
        );
    }

    #[test]
    fn unsupported_action_message() {
        let d = Diagnostic::UnsupportedAction {
            rule: "r1".into(),
            action: 1,
            kind: "BLINK".into(),
        };
        assert_eq!(d.to_string(), "action 1 of rule 'r1' has unsupported type 'BLINK'");
    }
}
