//! Priority-ordered constraint propagation for product configurators.
//!
//! A [`Catalog`] declares attributes and their value tokens. [`Rule`]s say
//! "when attribute X is selected as value V, apply these actions to other
//! attributes". Given the user's current [`Selections`], evaluation derives
//! an [`AttributeState`] for every attribute (visibility, allowed values,
//! default, quantity bounds) and returns a revised copy of the selections
//! with entries that became hidden or disallowed removed.
//!
//! ```
//! use attrflow::{Attribute, Catalog, RuleBookBuilder, Selections};
//!
//! let catalog = Catalog::new([
//!     Attribute::new("color", "Color").values(["Red", "Blue"]),
//!     Attribute::new("size", "Size").values(["Small", "Medium", "Large"]),
//! ]);
//! let book = RuleBookBuilder::new(catalog)
//!     .rule("red_sizes", |r| {
//!         r.priority(1)
//!             .when("color", "Red")
//!             .show_only("size", ["Small", "Medium"])
//!             .set_default("size", "Small")
//!     })
//!     .compile();
//!
//! let outcome = book.evaluate(&Selections::new().set("color", "Red").set("size", "Large"));
//! let size = outcome.state("size").unwrap();
//! assert_eq!(size.allowed_values, vec!["Small", "Medium"]);
//! assert_eq!(size.default_value.as_deref(), Some("Small"));
//! assert!(!outcome.selections().contains("size"));
//! ```

mod compile;
mod error;
mod evaluate;
pub mod parse;
#[cfg(feature = "binary-cache")]
mod serial;
mod types;

pub use error::AttrflowError;
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use types::{
    Action, ActionKind, Attribute, AttributeRef, AttributeState, AttributeValue, Catalog,
    Condition, Diagnostic, EvaluationReport, Outcome, QuantityConstraints, Rule, RuleBook,
    RuleBookBuilder, RuleBuilder, Selections, Value,
};

/// Evaluate `rules` against `selections` in one call.
///
/// Normalizes and schedules the rules on every call; use a [`RuleBook`] to
/// compile once and evaluate many times. Rules that cannot be resolved are
/// skipped and logged.
pub fn evaluate(catalog: &Catalog, rules: &[Rule], selections: &Selections) -> Outcome {
    let (compiled, _) = compile::compile(catalog, rules);
    evaluate::run(catalog, &compiled, selections).into_outcome()
}
