use thiserror::Error;

use crate::parse::ParseError;

/// Unified error type covering DSL parsing, JSON decoding, and I/O.
///
/// Returned by loaders like [`RuleBook::from_dsl()`](crate::RuleBook::from_dsl),
/// [`RuleBook::from_file()`](crate::RuleBook::from_file) and
/// [`RuleBook::from_json()`](crate::RuleBook::from_json). Evaluation itself
/// never fails; skipped rules surface as [`Diagnostic`](crate::Diagnostic)s.
#[derive(Debug, Error)]
pub enum AttrflowError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}
