//! `[1].concat(a, b)` → `[...[1], ...a, ...b]` when the receiver is known to
//! be an array.

use mz_ast::{Callee, Expr, Lit};
use mz_parser::{Edit, ParsedProgram};
use swc_common::Spanned;
use swc_ecma_visit::{Visit, VisitWith};

use crate::parens::safe_start;
use crate::syntax::{callee_member, ident_name, plain_args, static_call, unparen};

pub(crate) fn collect(parsed: &ParsedProgram) -> Vec<Edit> {
    let mut pass = ArrayConcat {
        parsed,
        edits: Vec::new(),
    };
    parsed.program.visit_with(&mut pass);
    pass.edits
}

struct ArrayConcat<'p> {
    parsed: &'p ParsedProgram,
    edits: Vec<Edit>,
}

/// Receivers that are arrays by construction.
fn is_array_typed(expr: &Expr) -> bool {
    match unparen(expr) {
        Expr::Array(_) => true,
        Expr::New(new) => ident_name(unparen(&new.callee)) == Some("Array"),
        expr @ Expr::Call(call) => {
            if static_call(expr, "Array", "from").is_some()
                || static_call(expr, "Array", "of").is_some()
            {
                return true;
            }
            if let Callee::Expr(callee) = &call.callee {
                if ident_name(unparen(callee)) == Some("Array") {
                    return true;
                }
            }
            matches!(callee_member(call), Some((_, "split")))
        }
        _ => false,
    }
}

/// Arguments `concat` appends as a single element, which spread would
/// iterate or reject.
fn is_single_element(expr: &Expr) -> bool {
    matches!(
        unparen(expr),
        Expr::Lit(
            Lit::Str(_) | Lit::Num(_) | Lit::Bool(_) | Lit::Null(_) | Lit::BigInt(_) | Lit::Regex(_)
        ) | Expr::Tpl(_)
            | Expr::Object(_)
            | Expr::Fn(_)
            | Expr::Arrow(_)
            | Expr::Class(_)
    )
}

impl ArrayConcat<'_> {
    fn rewrite(&self, expr: &Expr) -> Option<Edit> {
        let Expr::Call(call) = expr else {
            return None;
        };
        let (receiver, "concat") = callee_member(call)? else {
            return None;
        };
        if !is_array_typed(receiver) {
            return None;
        }
        let args = plain_args(&call.args)?;
        if args.is_empty() {
            return None;
        }

        let mut edit = Edit::new(self.parsed.range(call.span))
            .text("[...")
            .source(self.parsed.range(receiver.span()));
        for arg in args {
            edit = edit.text(if is_single_element(arg) { ", " } else { ", ..." });
            edit = edit.source(self.parsed.range(arg.span()));
        }
        let edit = edit.text("]");
        safe_start(&edit, self.parsed.text()).then_some(edit)
    }
}

impl Visit for ArrayConcat<'_> {
    fn visit_expr(&mut self, expr: &Expr) {
        expr.visit_children_with(self);
        if let Some(edit) = self.rewrite(expr) {
            self.edits.push(edit);
        }
    }
}
