use std::cmp::Reverse;

use crate::types::{CompiledAction, CompiledRule, Effect};
use crate::{Action, ActionKind, AttributeRef, Catalog, Condition, Diagnostic, Rule};

/// Normalize `rules` against `catalog` and schedule them for evaluation.
///
/// Rules that cannot be resolved are dropped whole; actions that cannot be
/// resolved are dropped individually. Every drop is logged and reported in
/// the returned diagnostics.
pub(crate) fn compile(catalog: &Catalog, rules: &[Rule]) -> (Vec<CompiledRule>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let mut compiled: Vec<CompiledRule> = rules
        .iter()
        .enumerate()
        .filter_map(|(position, rule)| normalize_rule(catalog, rule, position, &mut diagnostics))
        .collect();
    schedule(&mut compiled);
    (compiled, diagnostics)
}

/// Priority descending. `sort_by_key` is stable, so equal priorities keep
/// their input order.
fn schedule(rules: &mut [CompiledRule]) {
    rules.sort_by_key(|r| Reverse(r.priority));
}

fn rule_label(rule: &Rule, position: usize) -> String {
    if !rule.id.is_empty() {
        rule.id.clone()
    } else if !rule.name.is_empty() {
        rule.name.clone()
    } else {
        format!("#{position}")
    }
}

fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    tracing::warn!(rule = %diagnostic.rule(), "{diagnostic}");
    diagnostics.push(diagnostic);
}

fn normalize_rule(
    catalog: &Catalog,
    rule: &Rule,
    position: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<CompiledRule> {
    let label = rule_label(rule, position);

    let (attribute, expected) = match resolve_condition(catalog, rule.condition.as_ref(), &label) {
        Ok(resolved) => resolved,
        Err(diagnostic) => {
            report(diagnostics, diagnostic);
            return None;
        }
    };

    let mut actions = Vec::with_capacity(rule.actions.len());
    for (index, action) in rule.actions.iter().enumerate() {
        match normalize_action(catalog, action, index, &label) {
            Ok(Some(compiled)) => actions.push(compiled),
            Ok(None) => {}
            Err(diagnostic) => report(diagnostics, diagnostic),
        }
    }

    Some(CompiledRule {
        id: label,
        name: rule.name.clone(),
        attribute,
        expected,
        actions,
        priority: rule.effective_priority(),
        position,
    })
}

fn resolve_condition(
    catalog: &Catalog,
    condition: Option<&Condition>,
    label: &str,
) -> Result<(usize, String), Diagnostic> {
    let condition = condition.ok_or_else(|| Diagnostic::MissingCondition {
        rule: label.to_owned(),
    })?;
    let id = condition
        .attribute
        .as_ref()
        .and_then(AttributeRef::resolve)
        .ok_or_else(|| Diagnostic::UnresolvedConditionAttribute {
            rule: label.to_owned(),
        })?;
    let slot = catalog
        .slot(id)
        .ok_or_else(|| Diagnostic::UnknownConditionAttribute {
            rule: label.to_owned(),
            attribute: id.to_owned(),
        })?;
    let expected = condition
        .value
        .as_ref()
        .ok_or_else(|| Diagnostic::MissingExpectedValue {
            rule: label.to_owned(),
        })?;
    Ok((slot, expected.as_text()))
}

/// Resolve one action. `Ok(None)` means the action is well-formed but can
/// never have an effect (empty `SHOW_ONLY`, valueless `SET_DEFAULT`, empty
/// `QUANTITY`); those are dropped without a diagnostic.
fn normalize_action(
    catalog: &Catalog,
    action: &Action,
    index: usize,
    label: &str,
) -> Result<Option<CompiledAction>, Diagnostic> {
    let target = action
        .target
        .as_ref()
        .ok_or_else(|| Diagnostic::MissingActionTarget {
            rule: label.to_owned(),
            action: index,
        })?;
    let id = target
        .resolve()
        .ok_or_else(|| Diagnostic::UnresolvedActionTarget {
            rule: label.to_owned(),
            action: index,
        })?;
    let slot = catalog
        .slot(id)
        .ok_or_else(|| Diagnostic::UnknownActionTarget {
            rule: label.to_owned(),
            action: index,
            attribute: id.to_owned(),
        })?;

    let effect = match &action.kind {
        ActionKind::Show => Some(Effect::Show),
        ActionKind::Hide => Some(Effect::Hide),
        ActionKind::ShowOnly(values) if values.is_empty() => None,
        ActionKind::ShowOnly(values) => Some(Effect::Restrict(
            catalog
                .at(slot)
                .tokens()
                .filter(|token| values.iter().any(|v| v == token))
                .map(str::to_owned)
                .collect(),
        )),
        ActionKind::SetDefault(value) => value.clone().map(Effect::SetDefault),
        ActionKind::Quantity(q) if q.is_empty() => None,
        ActionKind::Quantity(q) => Some(Effect::Quantity(*q)),
        ActionKind::Unsupported(kind) => {
            return Err(Diagnostic::UnsupportedAction {
                rule: label.to_owned(),
                action: index,
                kind: kind.clone(),
            })
        }
    };

    Ok(effect.map(|effect| CompiledAction {
        target: slot,
        effect,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attribute, QuantityConstraints};

    fn catalog() -> Catalog {
        Catalog::new([
            Attribute::new("color", "Color").values(["Red", "Blue"]),
            Attribute::new("size", "Size").values(["Small", "Medium", "Large"]),
        ])
    }

    fn rule(id: &str, priority: Option<i64>, actions: Vec<Action>) -> Rule {
        Rule {
            id: id.to_owned(),
            name: String::new(),
            condition: Some(Condition::new("color", "Red")),
            actions,
            priority,
        }
    }

    #[test]
    fn compile_simple_rule() {
        let (compiled, diagnostics) = compile(
            &catalog(),
            &[rule("r", Some(1), vec![Action::hide("size")])],
        );
        assert!(diagnostics.is_empty());
        assert_eq!(compiled.len(), 1);
        assert_eq!(compiled[0].attribute, 0);
        assert_eq!(compiled[0].expected, "Red");
        assert_eq!(
            compiled[0].actions,
            vec![CompiledAction {
                target: 1,
                effect: Effect::Hide
            }]
        );
    }

    #[test]
    fn schedule_is_priority_descending_and_stable() {
        let rules = vec![
            rule("low", None, vec![]),
            rule("tie_a", Some(5), vec![]),
            rule("high", Some(10), vec![]),
            rule("tie_b", Some(5), vec![]),
            rule("negative", Some(-1), vec![]),
        ];
        let (compiled, _) = compile(&catalog(), &rules);
        let order: Vec<&str> = compiled.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(order, vec!["high", "tie_a", "tie_b", "low", "negative"]);
    }

    #[test]
    fn missing_condition_skips_rule() {
        let mut r = rule("r", None, vec![Action::hide("size")]);
        r.condition = None;
        let (compiled, diagnostics) = compile(&catalog(), &[r]);
        assert!(compiled.is_empty());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::MissingCondition { rule: "r".into() }]
        );
    }

    #[test]
    fn unresolvable_condition_reference_skips_rule() {
        let mut r = rule("r", None, vec![]);
        r.condition = Some(Condition {
            attribute: Some(AttributeRef::Embedded { id: None }),
            value: Some("Red".into()),
        });
        let (compiled, diagnostics) = compile(&catalog(), &[r]);
        assert!(compiled.is_empty());
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic::UnresolvedConditionAttribute { .. }]
        ));
    }

    #[test]
    fn unknown_condition_attribute_skips_rule() {
        let mut r = rule("r", None, vec![]);
        r.condition = Some(Condition::new("finish", "Gloss"));
        let (compiled, diagnostics) = compile(&catalog(), &[r]);
        assert!(compiled.is_empty());
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnknownConditionAttribute {
                rule: "r".into(),
                attribute: "finish".into()
            }]
        );
    }

    #[test]
    fn missing_expected_value_skips_rule() {
        let mut r = rule("r", None, vec![]);
        r.condition = Some(Condition {
            attribute: Some("color".into()),
            value: None,
        });
        let (compiled, diagnostics) = compile(&catalog(), &[r]);
        assert!(compiled.is_empty());
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic::MissingExpectedValue { .. }]
        ));
    }

    #[test]
    fn bad_action_skipped_siblings_kept() {
        let bad = Action {
            target: None,
            kind: ActionKind::Hide,
        };
        let (compiled, diagnostics) = compile(
            &catalog(),
            &[rule(
                "r",
                None,
                vec![
                    Action::show("size"),
                    bad,
                    Action::hide("finish"),
                    Action::new("size", ActionKind::Unsupported("BLINK".into())),
                    Action::hide("color"),
                ],
            )],
        );
        assert_eq!(compiled.len(), 1);
        let targets: Vec<usize> = compiled[0].actions.iter().map(|a| a.target).collect();
        assert_eq!(targets, vec![1, 0]);
        assert_eq!(diagnostics.len(), 3);
        assert!(diagnostics.iter().all(|d| !d.skips_rule()));
    }

    #[test]
    fn show_only_intersects_in_declared_order() {
        let (compiled, _) = compile(
            &catalog(),
            &[rule(
                "r",
                None,
                vec![Action::show_only("size", ["Large", "Huge", "Small", "Large"])],
            )],
        );
        assert_eq!(
            compiled[0].actions[0].effect,
            Effect::Restrict(vec!["Small".into(), "Large".into()])
        );
    }

    #[test]
    fn inert_actions_dropped_silently() {
        let (compiled, diagnostics) = compile(
            &catalog(),
            &[rule(
                "r",
                None,
                vec![
                    Action::show_only("size", Vec::<String>::new()),
                    Action::new("size", ActionKind::SetDefault(None)),
                    Action::new("size", ActionKind::Quantity(QuantityConstraints::default())),
                ],
            )],
        );
        assert!(compiled[0].actions.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn anonymous_rules_are_labelled_by_position() {
        let mut r = rule("", None, vec![]);
        r.condition = None;
        let (_, diagnostics) = compile(&catalog(), &[rule("ok", None, vec![]), r]);
        assert_eq!(diagnostics[0].rule(), "#1");
    }
}
