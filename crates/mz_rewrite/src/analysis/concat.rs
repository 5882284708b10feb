//! Flattening of `+` chains into template literal parts.
//!
//! `+` is left-associative and only concatenates when one operand is a
//! string. A `+` node is "string-typed" when either side is a string or
//! template literal or is itself a string-typed `+`. Only string-typed nodes
//! are split into parts; any other `+` subtree (`a + 17`) stays one opaque
//! substitution, so numeric additions keep their grouping:
//!
//! ```text
//! a + 17 + "px"        → `${a + 17}px`
//! "x" + a + 17         → `x${a}${17}`
//! "x" + (a + 17)       → `x${a + 17}`
//! ```

use std::ops::Range;

use mz_ast::{BinExpr, BinaryOp, Expr, Lit, Tpl};
use mz_parser::ParsedProgram;
use swc_common::Spanned;

use crate::syntax::unparen;

/// Literal parts and substitution ranges of a template literal.
///
/// `quasis` holds template-escaped raw text and is always one longer than
/// `holes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub quasis: Vec<String>,
    pub holes: Vec<Range<usize>>,
}

pub fn is_string_typed(expr: &Expr) -> bool {
    match unparen(expr) {
        Expr::Lit(Lit::Str(_)) | Expr::Tpl(_) => true,
        Expr::Bin(bin) if bin.op == BinaryOp::Add => {
            is_string_typed(&bin.left) || is_string_typed(&bin.right)
        }
        _ => false,
    }
}

/// Why a string-typed chain could not be flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unflattenable {
    /// The chain has no plain string literal leaf.
    NoStringLiteral,
    /// A literal uses an escape that templates reject (`\1`, `\08`).
    LegacyEscape,
}

pub fn flatten(parsed: &ParsedProgram, chain: &BinExpr) -> Result<Template, Unflattenable> {
    let mut flattener = Flattener {
        parsed,
        quasis: vec![String::new()],
        holes: Vec::new(),
        saw_literal: false,
    };
    flattener.operand(&chain.left)?;
    flattener.operand(&chain.right)?;
    if !flattener.saw_literal {
        return Err(Unflattenable::NoStringLiteral);
    }
    Ok(Template {
        quasis: flattener.quasis,
        holes: flattener.holes,
    })
}

struct Flattener<'p> {
    parsed: &'p ParsedProgram,
    quasis: Vec<String>,
    holes: Vec<Range<usize>>,
    saw_literal: bool,
}

impl Flattener<'_> {
    fn operand(&mut self, expr: &Expr) -> Result<(), Unflattenable> {
        match unparen(expr) {
            Expr::Bin(bin) if bin.op == BinaryOp::Add && is_string_typed(expr) => {
                self.operand(&bin.left)?;
                self.operand(&bin.right)
            }
            Expr::Lit(Lit::Str(lit)) => {
                let text = string_to_template_text(self.parsed.snippet(lit.span))?;
                self.saw_literal = true;
                self.push_text(&text);
                Ok(())
            }
            Expr::Tpl(tpl) => {
                self.inline_template(tpl);
                Ok(())
            }
            other => {
                let range = self.parsed.range(other.span());
                self.hole(range);
                Ok(())
            }
        }
    }

    fn inline_template(&mut self, tpl: &Tpl) {
        for (idx, quasi) in tpl.quasis.iter().enumerate() {
            self.push_text(&quasi.raw);
            if let Some(expr) = tpl.exprs.get(idx) {
                let range = self.parsed.range(expr.span());
                self.hole(range);
            }
        }
    }

    fn hole(&mut self, range: Range<usize>) {
        self.holes.push(range);
        self.quasis.push(String::new());
    }

    fn push_text(&mut self, text: &str) {
        let Some(current) = self.quasis.last_mut() else {
            return;
        };
        // `$` + `{` would open a substitution once merged.
        if text.starts_with('{') && ends_with_unescaped_dollar(current) {
            current.pop();
            current.push_str("\\$");
        }
        current.push_str(text);
    }
}

fn ends_with_unescaped_dollar(text: &str) -> bool {
    let Some(before) = text.strip_suffix('$') else {
        return false;
    };
    let backslashes = before.bytes().rev().take_while(|&b| b == b'\\').count();
    backslashes % 2 == 0
}

/// Converts the source of a quoted string literal to template raw text.
fn string_to_template_text(raw: &str) -> Result<String, Unflattenable> {
    let body = raw
        .get(1..raw.len().saturating_sub(1))
        .unwrap_or_default();
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    out.push('\\');
                    break;
                };
                match escaped {
                    '1'..='9' => return Err(Unflattenable::LegacyEscape),
                    '0' if chars.peek().is_some_and(char::is_ascii_digit) => {
                        return Err(Unflattenable::LegacyEscape)
                    }
                    _ => {}
                }
                out.push('\\');
                out.push(escaped);
            }
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{first_expr, parse};

    fn template_of(source: &str) -> Result<(Vec<String>, Vec<String>), Unflattenable> {
        let parsed = parse(source);
        let Expr::Bin(bin) = first_expr(&parsed) else {
            panic!("not a binary expression: {source}");
        };
        let template = flatten(&parsed, bin)?;
        let holes = template
            .holes
            .iter()
            .map(|range| parsed.text()[range.clone()].to_string())
            .collect();
        Ok((template.quasis, holes))
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn numeric_prefix_stays_one_substitution() {
        assert_eq!(
            template_of("a + 17 + 'px';"),
            Ok((strings(&["", "px"]), strings(&["a + 17"])))
        );
    }

    #[test]
    fn operands_after_a_string_are_split() {
        assert_eq!(
            template_of("'x' + a + 17;"),
            Ok((strings(&["x", "", ""]), strings(&["a", "17"])))
        );
        assert_eq!(
            template_of("'x' + (a + 17);"),
            Ok((strings(&["x", ""]), strings(&["a + 17"])))
        );
    }

    #[test]
    fn adjacent_literals_merge_and_templates_inline() {
        assert_eq!(
            template_of("'a' + 'b' + `c${d}e` + f;"),
            Ok((strings(&["abc", "e", ""]), strings(&["d", "f"])))
        );
    }

    #[test]
    fn escapes_template_syntax_in_literal_text() {
        assert_eq!(
            template_of("'`${' + x;"),
            Ok((strings(&["\\`\\${", ""]), strings(&["x"])))
        );
        assert_eq!(
            template_of("'cost: $' + '{x}' + y;"),
            Ok((strings(&["cost: \\${x}", ""]), strings(&["y"])))
        );
        assert_eq!(
            template_of("'it\\'s ' + x;"),
            Ok((strings(&["it\\'s ", ""]), strings(&["x"])))
        );
    }

    #[test]
    fn rejects_legacy_octal_escapes() {
        assert_eq!(string_to_template_text("'\\1'"), Err(Unflattenable::LegacyEscape));
        assert_eq!(string_to_template_text("'\\08'"), Err(Unflattenable::LegacyEscape));
        assert_eq!(string_to_template_text("'\\0'"), Ok("\\0".to_string()));
    }

    #[test]
    fn template_only_chains_have_no_string_literal() {
        assert_eq!(template_of("`a` + x;"), Err(Unflattenable::NoStringLiteral));
    }
}
