use mz_ast::{Dialect, Expr, FnExpr, Function, ModuleItem, Program, Stmt};
use mz_parser::{parse_program, Document, ParsedProgram};
use swc_ecma_visit::{Visit, VisitWith};

use crate::passes::{self, PassKind};

pub(crate) fn parse(source: &str) -> ParsedProgram {
    parse_program(source, Dialect::Tsx).expect("test source parses")
}

pub(crate) fn program_of(source: &str) -> Program {
    parse(source).program
}

pub(crate) fn statements(program: &Program) -> Vec<Stmt> {
    match program {
        Program::Module(module) => module
            .body
            .iter()
            .filter_map(|item| match item {
                ModuleItem::Stmt(stmt) => Some(stmt.clone()),
                ModuleItem::ModuleDecl(_) => None,
            })
            .collect(),
        Program::Script(script) => script.body.clone(),
    }
}

/// Expression of the first expression statement.
pub(crate) fn first_expr(parsed: &ParsedProgram) -> &Expr {
    let found = match &parsed.program {
        Program::Module(module) => module.body.iter().find_map(|item| match item {
            ModuleItem::Stmt(Stmt::Expr(stmt)) => Some(&*stmt.expr),
            _ => None,
        }),
        Program::Script(script) => script.body.iter().find_map(|stmt| match stmt {
            Stmt::Expr(stmt) => Some(&*stmt.expr),
            _ => None,
        }),
    };
    found.expect("source has an expression statement")
}

#[derive(Default)]
struct FirstFunction(Option<Function>);

impl Visit for FirstFunction {
    fn visit_fn_expr(&mut self, node: &FnExpr) {
        if self.0.is_none() {
            self.0 = Some((*node.function).clone());
        }
    }
}

/// Runs `check` on the first function expression in `source`.
pub(crate) fn first_fn_expr<R>(source: &str, check: impl FnOnce(&Function) -> R) -> R {
    let program = program_of(source);
    let mut finder = FirstFunction::default();
    program.visit_with(&mut finder);
    check(&finder.0.expect("source has a function expression"))
}

/// Runs a single pass once; returns the output and the changed lines.
pub(crate) fn rewrite(kind: PassKind, source: &str) -> (String, Vec<u32>) {
    let parsed = parse(source);
    let mut document = Document::new(source);
    let lines = document.apply(passes::collect(kind, &parsed));
    let output = document.into_text();
    if !lines.is_empty() {
        parse_program(&output, Dialect::Tsx)
            .unwrap_or_else(|e| panic!("{kind} produced unparsable output ({e}):\n{output}"));
    }
    (output, lines)
}

/// Output of a single pass, asserting that it left `source` alone.
pub(crate) fn unchanged(kind: PassKind, source: &str) {
    let (output, lines) = rewrite(kind, source);
    assert!(lines.is_empty(), "{kind} changed lines {lines:?}:\n{output}");
    assert_eq!(output, source);
}
