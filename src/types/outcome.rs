use serde::Serialize;

use super::selection::Selections;
use super::state::AttributeState;

/// The result of one evaluation: derived state for every catalog attribute,
/// in catalog order, and the selections left after the cascade.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[must_use]
pub struct Outcome {
    #[serde(rename = "attributes")]
    states: Vec<AttributeState>,
    selections: Selections,
}

impl Outcome {
    pub(crate) fn new(states: Vec<AttributeState>, selections: Selections) -> Self {
        Self { states, selections }
    }

    #[must_use]
    pub fn states(&self) -> &[AttributeState] {
        &self.states
    }

    /// The state of one attribute, or `None` if it is not in the catalog.
    #[must_use]
    pub fn state(&self, attribute: &str) -> Option<&AttributeState> {
        self.states.iter().find(|s| s.id == attribute)
    }

    /// The revised selections. Only entries cleared by the cascade differ
    /// from the input.
    #[must_use]
    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<AttributeState>, Selections) {
        (self.states, self.selections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome() -> Outcome {
        Outcome::new(
            vec![AttributeState {
                id: "size".into(),
                is_visible: false,
                allowed_values: vec!["Small".into()],
                default_value: None,
                quantity_constraints: None,
            }],
            Selections::new().set("color", "Red"),
        )
    }

    #[test]
    fn lookup_by_id() {
        let o = outcome();
        assert!(!o.state("size").unwrap().is_visible);
        assert!(o.state("color").is_none());
    }

    #[test]
    fn serializes_attributes_and_selections() {
        let json = serde_json::to_value(outcome()).unwrap();
        assert_eq!(json["attributes"][0]["id"], "size");
        assert_eq!(json["selections"]["color"], "Red");
    }

    #[test]
    fn into_parts() {
        let (states, selections) = outcome().into_parts();
        assert_eq!(states.len(), 1);
        assert_eq!(selections.len(), 1);
    }
}
