use std::fmt;
use std::time::Duration;

use super::outcome::Outcome;

/// Detailed evaluation report returned by
/// [`RuleBook::evaluate_detailed()`](super::rulebook::RuleBook::evaluate_detailed).
///
/// Contains the outcome, which rules fired, the evaluation order, the
/// selections the cascade cleared, and the wall-clock duration.
#[derive(Debug, Clone)]
#[must_use]
pub struct EvaluationReport {
    outcome: Outcome,
    fired: Vec<String>,
    evaluation_order: Vec<String>,
    cleared: Vec<String>,
    duration: Duration,
}

impl EvaluationReport {
    pub(crate) fn new(
        outcome: Outcome,
        fired: Vec<String>,
        evaluation_order: Vec<String>,
        cleared: Vec<String>,
        duration: Duration,
    ) -> Self {
        Self {
            outcome,
            fired,
            evaluation_order,
            cleared,
            duration,
        }
    }

    /// Same as [`RuleBook::evaluate()`](super::rulebook::RuleBook::evaluate).
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn into_outcome(self) -> Outcome {
        self.outcome
    }

    /// Labels of rules whose condition held, in the order they were applied.
    #[must_use]
    pub fn fired(&self) -> &[String] {
        &self.fired
    }

    /// All rule labels in execution order.
    #[must_use]
    pub fn evaluation_order(&self) -> &[String] {
        &self.evaluation_order
    }

    /// Attribute ids whose selection was removed, in catalog order.
    #[must_use]
    pub fn cleared(&self) -> &[String] {
        &self.cleared
    }

    /// Wall-clock duration of the evaluation.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fired: [{}]", self.fired.join(", "))?;
        write!(f, ", cleared: [{}]", self.cleared.join(", "))?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Selections;

    fn report() -> EvaluationReport {
        EvaluationReport::new(
            Outcome::new(vec![], Selections::new()),
            vec!["r1".into(), "r2".into()],
            vec!["r1".into(), "r2".into(), "r3".into()],
            vec!["size".into()],
            Duration::from_nanos(500),
        )
    }

    #[test]
    fn report_accessors() {
        let report = report();
        assert_eq!(report.fired(), &["r1", "r2"]);
        assert_eq!(report.evaluation_order(), &["r1", "r2", "r3"]);
        assert_eq!(report.cleared(), &["size"]);
        assert_eq!(report.duration(), Duration::from_nanos(500));
        assert!(report.outcome().states().is_empty());
    }

    #[test]
    fn report_display() {
        let s = report().to_string();
        assert!(s.starts_with("fired: [r1, r2], cleared: [size]"));
        assert!(s.contains("duration: 500ns"));
    }

    #[test]
    fn report_display_nothing_fired() {
        let report = EvaluationReport::new(
            Outcome::new(vec![], Selections::new()),
            vec![],
            vec!["r1".into()],
            vec![],
            Duration::from_nanos(100),
        );
        assert!(report.to_string().starts_with("fired: [], cleared: []"));
    }
}
