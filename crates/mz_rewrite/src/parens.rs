//! Deciding whether a replacement needs parentheses in the slot it lands in.
//!
//! The decision looks at the tokens around the replaced range only. Contexts
//! that are not recognised get parentheses.

use std::ops::Range;

use mz_parser::scan::{
    ends_operand, is_operator_keyword, next_token, prev_token, prev_token_at, Token,
};
use mz_parser::{Edit, Segment};

/// Shape of a replacement, by how loosely it binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Form {
    /// `{ ...a }`: an expression, unless it starts a statement.
    Object,
    /// `a ** b`.
    Exponent,
    /// `(a) => body`.
    Arrow,
}

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=",
    "||=", "??=",
];

/// Tokens after which an assignment expression may start.
const EXPRESSION_OPENERS: &[&str] = &["(", "[", ",", "${", "?", ":", "...", "=>"];

const BINARY_OPERATORS: &[&str] = &[
    "==", "===", "!=", "!==", "<", ">", "<=", ">=", "&&", "||", "??", "&", "|", "^", "*", "%",
    "<<", ">>", ">>>",
];

/// Tokens that may directly follow a complete operand of a binary operator.
const FOLLOWS_BINARY_OPERAND: &[&str] = &[
    "?", "??", "==", "===", "!=", "!==", "<", ">", "<=", ">=", "&&", "||", "&", "|", "^", "+",
    "-", "*", "/", "%", "<<", ">>", ">>>",
];

const CLOSERS: &[&str] = &[")", "]", ",", ";", "}", ":"];

pub(crate) fn needs_parens(text: &str, range: &Range<usize>, form: Form) -> bool {
    match form {
        Form::Object => object_needs_parens(text, range.start),
        Form::Arrow => !(arrow_fits_before(text, range.start) && closes_slot(text, range.end)),
        Form::Exponent => {
            !(exponent_fits_before(text, range.start) && exponent_fits_after(text, range.end))
        }
    }
}

/// `{` right after `=` in markup opens an attribute expression, not a block.
fn is_jsx_attribute_brace(text: &str, start: usize) -> bool {
    match prev_token_at(text, start) {
        (Token::Punct("{"), brace) => prev_token(text, brace) == Token::Punct("="),
        _ => false,
    }
}

fn object_needs_parens(text: &str, start: usize) -> bool {
    match prev_token(text, start) {
        Token::Boundary => true,
        Token::Word(word) => matches!(word, "do" | "else") || !is_operator_keyword(word),
        Token::Punct("{") => !is_jsx_attribute_brace(text, start),
        Token::Punct(p) => matches!(p, ";" | "}" | ")" | "]" | "=>" | ":"),
    }
}

fn arrow_fits_before(text: &str, start: usize) -> bool {
    match prev_token(text, start) {
        Token::Word(word) => matches!(word, "return" | "yield"),
        Token::Punct("{") => is_jsx_attribute_brace(text, start),
        Token::Punct(p) => EXPRESSION_OPENERS.contains(&p) || ASSIGNMENT_OPERATORS.contains(&p),
        Token::Boundary => false,
    }
}

fn closes_slot(text: &str, end: usize) -> bool {
    match next_token(text, end) {
        Token::Boundary => true,
        Token::Punct(p) => CLOSERS.contains(&p),
        Token::Word(_) => false,
    }
}

fn exponent_fits_before(text: &str, start: usize) -> bool {
    match prev_token_at(text, start) {
        (Token::Boundary, _) => true,
        (Token::Word(word), _) => {
            matches!(
                word,
                "return" | "yield" | "in" | "instanceof" | "case" | "throw" | "of" | "else" | "do"
            )
        }
        (Token::Punct(p), at) => {
            EXPRESSION_OPENERS.contains(&p)
                || ASSIGNMENT_OPERATORS.contains(&p)
                || BINARY_OPERATORS.contains(&p)
                || matches!(p, ";" | "{" | "}" | ")" | "]")
                || (matches!(p, "+" | "-" | "/") && ends_operand(text, at))
        }
    }
}

fn exponent_fits_after(text: &str, end: usize) -> bool {
    match next_token(text, end) {
        Token::Boundary => true,
        Token::Word(word) => matches!(word, "in" | "instanceof"),
        Token::Punct(p) => CLOSERS.contains(&p) || FOLLOWS_BINARY_OPERAND.contains(&p),
    }
}

/// Whether a replacement that begins with `(`, `[` or a backtick would be
/// read as a call, index or tagged template continuing the previous line.
pub(crate) fn continues_previous(text: &str, start: usize) -> bool {
    ends_operand(text, start) || prev_token(text, start) == Token::Punct("}")
}

/// First byte the rendered edit will produce, if known without rendering.
fn leading_byte(edit: &Edit, text: &str) -> Option<u8> {
    edit.segments.iter().find_map(|segment| match segment {
        Segment::Text(fresh) => fresh.bytes().next(),
        Segment::Source(range) => text.as_bytes().get(range.start).copied(),
    })
}

/// Whether `edit` can be spliced at its position without merging into the
/// expression before it.
pub(crate) fn safe_start(edit: &Edit, text: &str) -> bool {
    match leading_byte(edit, text) {
        Some(b'(' | b'[' | b'`') => !continues_previous(text, edit.range.start),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str, needle: &str) -> Range<usize> {
        let start = text.find(needle).expect("needle present");
        start..start + needle.len()
    }

    #[test]
    fn arrow_slots() {
        let fits = |text: &str| !needs_parens(text, &at(text, "F"), Form::Arrow);
        assert!(fits("foo(F, 1);"));
        assert!(fits("x = F;"));
        assert!(fits("const o = { k: F };"));
        assert!(fits("(F)();"));
        assert!(fits("<a onClick={F} />"));
        assert!(fits("return F\n"));
        assert!(!fits("F.bind(this);"));
        assert!(!fits("x || F;"));
        assert!(!fits("!F();"));
        assert!(!fits("export default F;"));
    }

    #[test]
    fn exponent_slots() {
        let fits = |text: &str| !needs_parens(text, &at(text, "F"), Form::Exponent);
        assert!(fits("x = F;"));
        assert!(fits("y = x + F - 1;"));
        assert!(fits("f(F, 2);"));
        assert!(fits("F;"));
        assert!(fits("a < F ? b : c;"));
        assert!(!fits("-F;"));
        assert!(!fits("typeof F;"));
        assert!(!fits("F.toFixed(2);"));
        assert!(!fits("F ** 2;"));
        assert!(!fits("x = F++;"));
    }

    #[test]
    fn object_slots() {
        let wraps = |text: &str| needs_parens(text, &at(text, "F"), Form::Object);
        assert!(wraps("F;"));
        assert!(wraps("a();\nF.x = 1;"));
        assert!(wraps("const f = () => F;"));
        assert!(!wraps("x = F;"));
        assert!(!wraps("return F;"));
        assert!(!wraps("f(a, F);"));
        assert!(!wraps("<C value={F} />"));
    }

    #[test]
    fn bracket_led_replacements_never_continue_the_previous_line() {
        let text = "foo\nF.forEach(g);\nbar = F;";
        let first = at(text, "F");
        let edit = Edit::new(first.clone()).text("[...x]");
        assert!(!safe_start(&edit, text));
        let second = text.rfind('F').expect("second F");
        let edit = Edit::new(second..second + 1).text("[...x]");
        assert!(safe_start(&edit, text));
        let edit = Edit::new(first).text("x ** 2");
        assert!(safe_start(&edit, text));
    }
}
