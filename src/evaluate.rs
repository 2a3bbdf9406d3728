use crate::types::{CompiledRule, Effect, WorkingState};
use crate::{AttributeState, Catalog, Outcome, Selections};

/// Everything one evaluation produced, including what the detailed report
/// needs.
pub(crate) struct Pass {
    pub(crate) states: Vec<AttributeState>,
    pub(crate) selections: Selections,
    /// Indices into the scheduled rules, in the order they fired.
    pub(crate) fired: Vec<usize>,
    /// Attribute ids whose selection the cascade removed, in catalog order.
    pub(crate) cleared: Vec<String>,
}

impl Pass {
    pub(crate) fn into_outcome(self) -> Outcome {
        Outcome::new(self.states, self.selections)
    }
}

/// Run scheduled `rules` against `selections`.
///
/// The caller's selections are only read; the revised selections are a new
/// value owned by the returned [`Pass`].
pub(crate) fn run(catalog: &Catalog, rules: &[CompiledRule], selections: &Selections) -> Pass {
    let mut states: Vec<WorkingState> = catalog.iter().map(WorkingState::unrestricted).collect();
    let mut fired = Vec::new();

    for (index, rule) in rules.iter().enumerate() {
        if !condition_holds(catalog, rule, selections) {
            continue;
        }
        tracing::debug!(rule = %rule.id, priority = rule.priority, "rule fired");
        for action in &rule.actions {
            apply(&mut states[action.target], &action.effect);
        }
        fired.push(index);
    }

    let mut revised = selections.clone();
    let cleared = cascade(catalog, &mut states, &mut revised);

    let states = states
        .into_iter()
        .zip(catalog.iter())
        .map(|(state, attribute)| state.finish(attribute))
        .collect();

    Pass {
        states,
        selections: revised,
        fired,
        cleared,
    }
}

fn condition_holds(catalog: &Catalog, rule: &CompiledRule, selections: &Selections) -> bool {
    selections
        .get(&catalog.at(rule.attribute).id)
        .is_some_and(|selected| selected.matches(&rule.expected))
}

/// Each effect overwrites what an earlier rule left, so among rules that
/// fire the last one applied wins.
fn apply(state: &mut WorkingState, effect: &Effect) {
    match effect {
        Effect::Show => {
            state.is_visible = true;
            state.visibility_set_by_rule = true;
        }
        Effect::Hide => {
            state.is_visible = false;
            state.visibility_set_by_rule = true;
        }
        Effect::Restrict(values) => {
            state.allowed_values.clone_from(values);
            state.values_restricted_by_rule = true;
        }
        Effect::SetDefault(value) => {
            if state.allowed_values.is_empty() || state.allows(value) {
                state.default_value = Some(value.clone());
            }
        }
        Effect::Quantity(constraints) => state.quantity = Some(*constraints),
    }
}

/// Reconcile selections with the derived state and restore attributes no
/// rule touched. Each attribute only reads its own state.
fn cascade(catalog: &Catalog, states: &mut [WorkingState], selections: &mut Selections) -> Vec<String> {
    let mut cleared = Vec::new();

    for (attribute, state) in catalog.iter().zip(states.iter_mut()) {
        if !state.visibility_set_by_rule {
            state.is_visible = true;
        }
        if !state.values_restricted_by_rule {
            state.allowed_values = attribute.declared_tokens();
        }

        let reason = match selections.get(&attribute.id) {
            None => None,
            Some(_) if !state.is_visible => Some("hidden"),
            Some(selected) if state.values_restricted_by_rule && !state.allows(&selected.as_text()) => {
                Some("not_allowed")
            }
            Some(_) => None,
        };

        if let Some(reason) = reason {
            tracing::trace!(attribute = %attribute.id, reason, "selection cleared");
            selections.remove(&attribute.id);
            cleared.push(attribute.id.clone());
        }
    }

    cleared
}
