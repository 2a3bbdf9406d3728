use std::fmt;
use std::time::Instant;

use super::action::Action;
use super::catalog::Catalog;
use super::diagnostic::Diagnostic;
use super::evaluation_report::EvaluationReport;
use super::outcome::Outcome;
use super::rule::{CompiledRule, Condition, Rule};
use super::selection::Selections;
use super::value::Value;

/// Builder for constructing a [`RuleBook`].
///
/// Rules are defined via closures and compiled against the catalog into an
/// immutable, thread-safe execution structure.
///
/// # Example
///
/// ```
/// use attrflow::{Attribute, Catalog, RuleBookBuilder};
///
/// let catalog = Catalog::new([
///     Attribute::new("color", "Color").values(["Red", "Blue"]),
///     Attribute::new("size", "Size").values(["Small", "Medium", "Large"]),
/// ]);
///
/// let book = RuleBookBuilder::new(catalog)
///     .rule("red_sizes", |r| {
///         r.priority(1)
///             .when("color", "Red")
///             .show_only("size", ["Small", "Medium"])
///             .set_default("size", "Small")
///     })
///     .compile();
/// assert!(book.diagnostics().is_empty());
/// ```
#[derive(Debug)]
pub struct RuleBookBuilder {
    catalog: Catalog,
    rules: Vec<Rule>,
}

/// Intermediate builder passed to the rule definition closure.
#[derive(Debug)]
pub struct RuleBuilder {
    rule: Rule,
}

impl RuleBookBuilder {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            rules: Vec::new(),
        }
    }

    /// Define a rule. The closure should call `.when(attribute, value)`.
    ///
    /// A rule without a condition is skipped at compile time with
    /// [`Diagnostic::MissingCondition`].
    #[must_use]
    pub fn rule(mut self, id: &str, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        let builder = f(RuleBuilder {
            rule: Rule::new(id),
        });
        self.rules.push(builder.rule);
        self
    }

    /// Add an already-built rule, e.g. one deserialized from JSON.
    #[must_use]
    pub fn push(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Compile the rules into an immutable `RuleBook`.
    ///
    /// Compilation never fails. Rules and actions that cannot be resolved are
    /// dropped and reported through [`RuleBook::diagnostics()`].
    #[must_use]
    pub fn compile(self) -> RuleBook {
        RuleBook::compile(self.catalog, &self.rules)
    }
}

impl RuleBuilder {
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.rule.name = name.to_owned();
        self
    }

    /// Higher priorities are applied first. Defaults to 0.
    #[must_use]
    pub fn priority(mut self, priority: i64) -> Self {
        self.rule.priority = Some(priority);
        self
    }

    /// Fire when the selection for `attribute` equals `value`.
    #[must_use]
    pub fn when(mut self, attribute: &str, value: impl Into<Value>) -> Self {
        self.rule.condition = Some(Condition::new(attribute, value));
        self
    }

    /// Append an arbitrary action.
    #[must_use]
    pub fn then(mut self, action: Action) -> Self {
        self.rule.actions.push(action);
        self
    }

    #[must_use]
    pub fn show(self, target: &str) -> Self {
        self.then(Action::show(target))
    }

    #[must_use]
    pub fn hide(self, target: &str) -> Self {
        self.then(Action::hide(target))
    }

    #[must_use]
    pub fn show_only<I, S>(self, target: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.then(Action::show_only(target, values))
    }

    #[must_use]
    pub fn set_default(self, target: &str, value: impl Into<String>) -> Self {
        self.then(Action::set_default(target, value))
    }

    #[must_use]
    pub fn quantity(
        self,
        target: &str,
        min: Option<u32>,
        max: Option<u32>,
        step: Option<u32>,
    ) -> Self {
        self.then(Action::quantity(target, min, max, step))
    }
}

/// A compiled, immutable rule book bound to one catalog. Thread-safe and
/// designed to live behind `Arc`.
///
/// Holds the normalized rules in execution order: priority descending, input
/// order among equal priorities.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBook {
    pub(crate) catalog: Catalog,
    pub(crate) rules: Vec<CompiledRule>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl RuleBook {
    /// Normalize and schedule `rules` against `catalog`.
    #[must_use]
    pub fn compile(catalog: Catalog, rules: &[Rule]) -> Self {
        let (rules, diagnostics) = crate::compile::compile(&catalog, rules);
        Self {
            catalog,
            rules,
            diagnostics,
        }
    }

    /// Evaluate the rule book against the given selections.
    ///
    /// Returns one state per catalog attribute plus the revised selections.
    /// `selections` itself is not modified.
    pub fn evaluate(&self, selections: &Selections) -> Outcome {
        crate::evaluate::run(&self.catalog, &self.rules, selections).into_outcome()
    }

    /// Evaluate and report which rules fired, which selections the cascade
    /// cleared, and how long it took.
    pub fn evaluate_detailed(&self, selections: &Selections) -> EvaluationReport {
        let start = Instant::now();
        let pass = crate::evaluate::run(&self.catalog, &self.rules, selections);
        let duration = start.elapsed();

        let fired = pass
            .fired
            .iter()
            .map(|&index| self.rules[index].id.clone())
            .collect();
        let evaluation_order = self.rules.iter().map(|r| r.id.clone()).collect();
        let cleared = pass.cleared.clone();
        EvaluationReport::new(pass.into_outcome(), fired, evaluation_order, cleared, duration)
    }

    /// Parse a DSL string and compile it against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`AttrflowError::Parse`](crate::AttrflowError::Parse) if the
    /// text is not valid DSL.
    pub fn from_dsl(catalog: Catalog, input: &str) -> Result<Self, crate::AttrflowError> {
        let parsed = crate::parse::parse(input)?;
        Ok(Self::compile(catalog, &parsed.rules))
    }

    /// Read a DSL file and compile it against `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`AttrflowError`](crate::AttrflowError) on I/O or parse failure.
    pub fn from_file(
        catalog: Catalog,
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::AttrflowError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_dsl(catalog, &input)
    }

    /// Parse a JSON array of rules in the wire shape and compile it.
    ///
    /// Elements and fields that cannot be interpreted do not fail the load;
    /// they end up as diagnostics on the compiled book.
    ///
    /// # Errors
    ///
    /// Returns [`AttrflowError::Json`](crate::AttrflowError::Json) if the
    /// input is not valid JSON or not an array.
    pub fn from_json(catalog: Catalog, input: &str) -> Result<Self, crate::AttrflowError> {
        let elements: Vec<serde_json::Value> = serde_json::from_str(input)?;
        let rules: Vec<Rule> = elements.into_iter().map(Rule::from_wire).collect();
        Ok(Self::compile(catalog, &rules))
    }

    /// The catalog this book was compiled against.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Rule labels in the order they are applied.
    #[must_use]
    pub fn execution_order(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id.as_str()).collect()
    }

    /// Labels of rules with at least one action targeting `attribute`, in
    /// execution order.
    ///
    /// Returns `None` if the attribute is not in the catalog.
    #[must_use]
    pub fn rules_affecting(&self, attribute: &str) -> Option<Vec<&str>> {
        let slot = self.catalog.slot(attribute)?;
        Some(
            self.rules
                .iter()
                .filter(|r| r.actions.iter().any(|a| a.target == slot))
                .map(|r| r.id.as_str())
                .collect(),
        )
    }

    /// Everything compilation had to skip, in input order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of rules that survived normalization.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(feature = "binary-cache")]
impl RuleBook {
    /// Serialize this compiled rule book, catalog included, to a byte vector.
    ///
    /// The optional `source_text` is hashed (BLAKE3) and embedded in the
    /// payload metadata. Callers can use this to detect when the original
    /// source has changed and the cache should be rebuilt.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::SerializeError) if encoding fails.
    pub fn to_bytes(
        &self,
        source_text: Option<&str>,
    ) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self, source_text)
    }

    /// Deserialize a rule book from a byte slice previously produced by
    /// [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes)
    }

    /// Serialize this rule book and write it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::SerializeError) on
    /// encoding or I/O failure.
    pub fn to_binary_file(
        &self,
        path: impl AsRef<std::path::Path>,
        source_text: Option<&str>,
    ) -> Result<(), crate::serial::SerializeError> {
        let bytes = self.to_bytes(source_text)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a file and deserialize the rule book it contains.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::DeserializeError) on
    /// I/O, format, integrity, or validation failure.
    pub fn from_binary_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for RuleBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleBook({} rules, {} attributes, {} diagnostics)",
            self.rules.len(),
            self.catalog.len(),
            self.diagnostics.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Attribute;

    fn catalog() -> Catalog {
        Catalog::new([
            Attribute::new("color", "Color").values(["Red", "Blue"]),
            Attribute::new("size", "Size").values(["Small", "Large"]),
            Attribute::new("finish", "Finish").values(["Matte", "Gloss"]),
        ])
    }

    #[test]
    fn builder_collects_rules() {
        let builder = RuleBookBuilder::new(catalog())
            .rule("a", |r| r.name("First").priority(3).when("color", "Red").hide("size"))
            .rule("b", |r| r.when("color", "Blue").show("size"));

        assert_eq!(builder.rules.len(), 2);
        assert_eq!(builder.rules[0].id, "a");
        assert_eq!(builder.rules[0].name, "First");
        assert_eq!(builder.rules[0].priority, Some(3));
        assert_eq!(builder.rules[1].priority, None);
        assert_eq!(builder.rules[1].actions, vec![Action::show("size")]);
    }

    #[test]
    fn builder_rule_without_when_is_diagnosed() {
        let book = RuleBookBuilder::new(catalog())
            .rule("bad_rule", |r| r.hide("size"))
            .compile();
        assert!(book.is_empty());
        assert_eq!(
            book.diagnostics(),
            &[Diagnostic::MissingCondition {
                rule: "bad_rule".into()
            }]
        );
    }

    #[test]
    fn execution_order_and_rules_affecting() {
        let book = RuleBookBuilder::new(catalog())
            .rule("low", |r| r.when("color", "Red").hide("size"))
            .rule("high", |r| r.priority(5).when("color", "Blue").hide("finish"))
            .rule("mid", |r| r.priority(1).when("color", "Blue").show_only("size", ["Small"]))
            .compile();

        assert_eq!(book.execution_order(), vec!["high", "mid", "low"]);
        assert_eq!(book.rules_affecting("size"), Some(vec!["mid", "low"]));
        assert_eq!(book.rules_affecting("color"), Some(vec![]));
        assert_eq!(book.rules_affecting("engraving"), None);
    }

    #[test]
    fn detailed_report_lists_fired_and_cleared() {
        let book = RuleBookBuilder::new(catalog())
            .rule("hide_finish", |r| r.priority(2).when("color", "Red").hide("finish"))
            .rule("blue_only", |r| r.priority(1).when("color", "Blue").hide("size"))
            .compile();
        let report = book.evaluate_detailed(
            &Selections::new().set("color", "Red").set("finish", "Gloss"),
        );
        assert_eq!(report.fired(), &["hide_finish"]);
        assert_eq!(report.evaluation_order(), &["hide_finish", "blue_only"]);
        assert_eq!(report.cleared(), &["finish"]);
        assert!(!report.outcome().selections().contains("finish"));
    }

    #[test]
    fn from_json_compiles_wire_rules() {
        let book = RuleBook::from_json(
            catalog(),
            r#"[{"_id": "r1", "condition": {"attribute": "color", "value": "Red"},
                 "actions": [{"type": "HIDE", "targetAttribute": {"_id": "size"}}]}]"#,
        )
        .unwrap();
        assert_eq!(book.execution_order(), vec!["r1"]);
    }

    #[test]
    fn from_json_rejects_non_array() {
        let err = RuleBook::from_json(catalog(), r#"{"rules": []}"#).unwrap_err();
        assert!(matches!(err, crate::AttrflowError::Json(_)));
    }

    #[test]
    fn display() {
        let book = RuleBookBuilder::new(catalog())
            .rule("r", |r| r.when("color", "Red").hide("size"))
            .rule("orphan", |r| r.hide("size"))
            .compile();
        assert_eq!(
            book.to_string(),
            "RuleBook(1 rules, 3 attributes, 1 diagnostics)"
        );
    }
}
