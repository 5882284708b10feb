//! `Math.pow(a, b)` → `a ** b`.

use mz_ast::Expr;
use mz_parser::{Edit, ParsedProgram};
use swc_common::Spanned;
use swc_ecma_visit::{Visit, VisitWith};

use crate::parens::{needs_parens, safe_start, Form};
use crate::syntax::{is_atom, plain_args, static_call};

pub(crate) fn collect(parsed: &ParsedProgram) -> Vec<Edit> {
    let mut pass = MathPow {
        parsed,
        edits: Vec::new(),
    };
    parsed.program.visit_with(&mut pass);
    pass.edits
}

struct MathPow<'p> {
    parsed: &'p ParsedProgram,
    edits: Vec<Edit>,
}

impl MathPow<'_> {
    fn rewrite(&self, expr: &Expr) -> Option<Edit> {
        let call = static_call(expr, "Math", "pow")?;
        let [base, exponent] = plain_args(&call.args)?[..] else {
            return None;
        };

        let range = self.parsed.range(call.span);
        let edit = self
            .operand(Edit::new(range.clone()), base)
            .text(" ** ");
        let edit = self
            .operand(edit, exponent)
            .parenthesized_if(needs_parens(self.parsed.text(), &range, Form::Exponent));
        safe_start(&edit, self.parsed.text()).then_some(edit)
    }

    fn operand(&self, edit: Edit, operand: &Expr) -> Edit {
        let wrap = !is_atom(operand);
        edit.text(if wrap { "(" } else { "" })
            .source(self.parsed.range(operand.span()))
            .text(if wrap { ")" } else { "" })
    }
}

impl Visit for MathPow<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        expr.visit_children_with(self);
        if let Some(edit) = self.rewrite(expr) {
            self.edits.push(edit);
        }
    }
}
