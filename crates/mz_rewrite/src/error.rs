use mz_parser::ParseError;

use crate::passes::PassKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// The input does not parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// A pass produced text that no longer parses.
    #[error("{pass} produced invalid code: {message}")]
    Rewrite { pass: PassKind, message: String },
}
