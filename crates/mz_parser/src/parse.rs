use std::ops::Range;

use mz_ast::Dialect;
use swc_common::{sync::Lrc, BytePos, FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_parser::{EsSyntax, Syntax, TsSyntax};

use crate::source::LineIndex;

/// Source text that does not conform to the selected grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line of the offending token.
    pub line: u32,
    pub message: String,
}

/// A parsed program together with the exact text it was parsed from.
///
/// Node spans are absolute positions in the SWC source map; `range` and
/// `snippet` translate them back into byte offsets of `text`.
pub struct ParsedProgram {
    pub program: Program,
    text: String,
    start: BytePos,
}

impl ParsedProgram {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte range of `span` within `text()`.
    pub fn range(&self, span: Span) -> Range<usize> {
        let lo = span.lo.0.saturating_sub(self.start.0) as usize;
        let hi = span.hi.0.saturating_sub(self.start.0) as usize;
        lo.min(self.text.len())..hi.min(self.text.len())
    }

    /// Source text covered by `span`.
    pub fn snippet(&self, span: Span) -> &str {
        &self.text[self.range(span)]
    }
}

/// Parse `source` as a script or module using the grammar for `dialect`.
///
/// Errors the parser recovered from are still reported: the rewrite engine
/// never works on a tree the parser had to guess at.
pub fn parse_program(source: &str, dialect: Dialect) -> Result<ParsedProgram, ParseError> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file =
        source_map.new_source_file(Lrc::new(FileName::Anon), source.to_string());
    let start = source_file.start_pos;

    let mut recovered = vec![];
    let parsed = swc_ecma_parser::parse_file_as_program(
        &source_file,
        syntax_for(dialect),
        EsVersion::latest(),
        None,
        &mut recovered,
    );

    let lines = LineIndex::new(source);
    let program = parsed.map_err(|e| to_parse_error(&e, start, &lines))?;
    if let Some(e) = recovered.first() {
        return Err(to_parse_error(e, start, &lines));
    }

    Ok(ParsedProgram {
        program,
        text: source.to_string(),
        start,
    })
}

fn syntax_for(dialect: Dialect) -> Syntax {
    match dialect {
        Dialect::Tsx => Syntax::Typescript(TsSyntax {
            tsx: true,
            decorators: true,
            ..Default::default()
        }),
        Dialect::Typescript => Syntax::Typescript(TsSyntax {
            decorators: true,
            ..Default::default()
        }),
        Dialect::Ecmascript => Syntax::Es(EsSyntax {
            jsx: true,
            decorators: true,
            ..Default::default()
        }),
    }
}

fn to_parse_error(
    error: &swc_ecma_parser::error::Error,
    start: BytePos,
    lines: &LineIndex,
) -> ParseError {
    let offset = error.span().lo.0.saturating_sub(start.0) as usize;
    ParseError {
        line: lines.line_number(offset),
        message: error.kind().msg().into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_ecma_ast::{ModuleItem, Stmt};

    fn statements(program: &Program) -> Vec<&Stmt> {
        match program {
            Program::Module(module) => module
                .body
                .iter()
                .filter_map(|item| match item {
                    ModuleItem::Stmt(stmt) => Some(stmt),
                    ModuleItem::ModuleDecl(_) => None,
                })
                .collect(),
            Program::Script(script) => script.body.iter().collect(),
        }
    }

    #[test]
    fn snippets_follow_node_spans() {
        let parsed = parse_program("let a = 1;\nfoo(a);\n", Dialect::Tsx).unwrap();
        let Stmt::Expr(stmt) = statements(&parsed.program)[1] else {
            panic!("expected an expression statement");
        };
        assert_eq!(parsed.snippet(stmt.expr.span()), "foo(a)");
        assert_eq!(parsed.range(stmt.expr.span()), 11..17);
    }

    #[test]
    fn accepts_jsx_and_type_annotations() {
        let source = "const el = <div title={t} />;\nfunction f(x: number): string { return `${x}`; }\n";
        assert!(parse_program(source, Dialect::Tsx).is_ok());
        assert!(parse_program("const x = <number>y;", Dialect::Typescript).is_ok());
        assert!(parse_program("const el = <a href={h}>x</a>;", Dialect::Ecmascript).is_ok());
    }

    #[test]
    fn reports_line_of_syntax_error() {
        let err = parse_program("let a = 1;\nlet = = 2;\n", Dialect::Tsx)
            .err()
            .expect("malformed input must not parse");
        assert_eq!(err.line, 2);
        assert!(!err.message.is_empty());
    }
}
