mod error;
mod grammar;
mod parser;

pub use error::ParseError;
pub use parser::ParsedRules;

/// Parse a DSL input string into [`ParsedRules`].
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid DSL syntax.
pub fn parse(input: &str) -> Result<ParsedRules, ParseError> {
    use winnow::Parser;
    grammar::parse_rules
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}
