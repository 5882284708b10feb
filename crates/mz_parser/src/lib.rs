//! Span-preserving ECMAScript/TypeScript parsing for modernize.
//!
//! Wraps the standard SWC parser and pairs it with a text splicer:
//!
//! - `parse`: source text → SWC `Program` whose spans map back to byte ranges
//! - `splice`: edits expressed as fresh text plus reused source ranges,
//!   applied to a `Document` that remembers the original line of every line
//! - `scan`: token peeking used to decide where parentheses are needed
//!
//! Rewrites never reprint the tree, so regions no rewrite touches are
//! returned byte-for-byte.

pub mod parse;
pub mod scan;
pub mod source;
pub mod splice;

pub use parse::{parse_program, ParseError, ParsedProgram};
pub use source::LineIndex;
pub use splice::{Document, Edit, Segment};
