mod action;
mod attribute;
mod catalog;
mod diagnostic;
mod evaluation_report;
mod outcome;
mod reference;
mod rule;
mod rulebook;
mod selection;
mod state;
mod value;
mod wire;

pub use action::{Action, ActionKind, QuantityConstraints};
pub use attribute::{Attribute, AttributeValue};
pub use catalog::Catalog;
pub use diagnostic::Diagnostic;
pub use evaluation_report::EvaluationReport;
pub use outcome::Outcome;
pub use reference::AttributeRef;
pub use rule::{Condition, Rule};
pub use rulebook::{RuleBook, RuleBookBuilder, RuleBuilder};
pub use selection::Selections;
pub use state::AttributeState;
pub use value::Value;

pub(crate) use rule::{CompiledAction, CompiledRule, Effect};
pub(crate) use state::WorkingState;
