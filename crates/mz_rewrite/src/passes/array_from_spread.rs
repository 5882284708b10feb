//! `Array.from(x)` → `[...x]`.

use std::collections::HashSet;

use mz_ast::{CallExpr, Expr};
use mz_parser::{Edit, ParsedProgram};
use swc_common::{BytePos, Spanned};
use swc_ecma_visit::{Visit, VisitWith};

use crate::parens::safe_start;
use crate::syntax::{callee_member, plain_args, static_call, unparen};

pub(crate) fn collect(parsed: &ParsedProgram) -> Vec<Edit> {
    let mut pass = ArrayFromSpread {
        parsed,
        chained: HashSet::new(),
        edits: Vec::new(),
    };
    parsed.program.visit_with(&mut pass);
    pass.edits
}

struct ArrayFromSpread<'p> {
    parsed: &'p ParsedProgram,
    /// `Array.from` calls that are the receiver of a `.forEach`.
    chained: HashSet<BytePos>,
    edits: Vec<Edit>,
}

impl ArrayFromSpread<'_> {
    fn rewrite(&self, expr: &Expr) -> Option<Edit> {
        let call = static_call(expr, "Array", "from")?;
        if self.chained.contains(&call.span.lo) {
            return None;
        }
        let [source] = plain_args(&call.args)?[..] else {
            return None;
        };
        if matches!(unparen(source), Expr::Object(_)) {
            return None;
        }
        let edit = Edit::new(self.parsed.range(call.span))
            .text("[...")
            .source(self.parsed.range(source.span()))
            .text("]");
        safe_start(&edit, self.parsed.text()).then_some(edit)
    }
}

impl Visit for ArrayFromSpread<'_> {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if let Some((receiver, "forEach")) = callee_member(call) {
            if let Some(from) = static_call(unparen(receiver), "Array", "from") {
                self.chained.insert(from.span.lo);
            }
        }
        call.visit_children_with(self);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        expr.visit_children_with(self);
        if let Some(edit) = self.rewrite(expr) {
            self.edits.push(edit);
        }
    }
}
