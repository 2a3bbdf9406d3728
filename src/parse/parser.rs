use crate::Rule;

/// The result of parsing a DSL input string.
///
/// Rules come out in source order and are not yet checked against any
/// catalog; that happens when they are compiled into a
/// [`RuleBook`](crate::RuleBook).
#[derive(Debug)]
pub struct ParsedRules {
    pub rules: Vec<Rule>,
}
