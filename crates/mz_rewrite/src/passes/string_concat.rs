//! `'Hello, ' + name + '!'` → `` `Hello, ${name}!` ``.

use mz_ast::{BinExpr, BinaryOp, Expr};
use mz_parser::{Edit, ParsedProgram};
use swc_ecma_visit::{Visit, VisitWith};

use crate::analysis::concat::{flatten, is_string_typed, Template};
use crate::parens::safe_start;
use crate::syntax::unparen;

pub(crate) fn collect(parsed: &ParsedProgram) -> Vec<Edit> {
    let mut pass = StringConcat {
        parsed,
        edits: Vec::new(),
    };
    parsed.program.visit_with(&mut pass);
    pass.edits
}

struct StringConcat<'p> {
    parsed: &'p ParsedProgram,
    edits: Vec<Edit>,
}

fn template_edit(range: std::ops::Range<usize>, template: Template) -> Edit {
    let mut quasis = template.quasis.into_iter();
    let mut edit = Edit::new(range).text(format!("`{}", quasis.next().unwrap_or_default()));
    for (hole, quasi) in template.holes.into_iter().zip(quasis) {
        edit = edit.text("${").source(hole).text(format!("}}{quasi}"));
    }
    edit.text("`")
}

impl StringConcat<'_> {
    fn rewrite(&self, bin: &BinExpr) -> Option<Edit> {
        let template = match flatten(self.parsed, bin) {
            Ok(template) => template,
            Err(reason) => {
                tracing::trace!(?reason, "concatenation kept");
                return None;
            }
        };
        let edit = template_edit(self.parsed.range(bin.span), template);
        safe_start(&edit, self.parsed.text()).then_some(edit)
    }

    /// Visit everything except the `+` nodes that belong to the chain.
    fn visit_chain_operands(&mut self, expr: &Expr) {
        match unparen(expr) {
            Expr::Bin(bin) if bin.op == BinaryOp::Add && is_string_typed(expr) => {
                self.visit_chain_operands(&bin.left);
                self.visit_chain_operands(&bin.right);
            }
            other => other.visit_with(self),
        }
    }
}

impl Visit for StringConcat<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        if let Expr::Bin(bin) = expr {
            if bin.op == BinaryOp::Add && is_string_typed(expr) {
                if let Some(edit) = self.rewrite(bin) {
                    self.edits.push(edit);
                    self.visit_chain_operands(&bin.left);
                    self.visit_chain_operands(&bin.right);
                    return;
                }
            }
        }
        expr.visit_children_with(self);
    }
}
