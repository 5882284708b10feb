//! `Array.from(x).forEach(cb);` → `for (const item of x) { … }`.

use mz_ast::{Expr, ExprStmt};
use mz_parser::{Edit, ParsedProgram};
use swc_common::Spanned;
use swc_ecma_visit::{Visit, VisitWith};

use super::{for_of_edit, statement_range};
use crate::analysis::callback::{inline_callback, CallbackRules};
use crate::analysis::liveness::mentions;
use crate::syntax::{callee_member, plain_args, static_call, unparen};

const RULES: CallbackRules = CallbackRules {
    expression_body: true,
    extra_params: true,
};

pub(crate) fn collect(parsed: &ParsedProgram) -> Vec<Edit> {
    let mut pass = ArrayFromForEach {
        parsed,
        edits: Vec::new(),
    };
    parsed.program.visit_with(&mut pass);
    pass.edits
}

struct ArrayFromForEach<'p> {
    parsed: &'p ParsedProgram,
    edits: Vec<Edit>,
}

impl ArrayFromForEach<'_> {
    fn rewrite(&self, stmt: &ExprStmt) -> Option<Edit> {
        let Expr::Call(call) = unparen(&stmt.expr) else {
            return None;
        };
        let (receiver, "forEach") = callee_member(call)? else {
            return None;
        };
        let from = static_call(unparen(receiver), "Array", "from")?;
        let [iterable] = plain_args(&from.args)?[..] else {
            return None;
        };
        // Array-likes without an iterator only work with `Array.from`.
        if matches!(unparen(iterable), Expr::Object(_)) {
            return None;
        }
        let [callback] = plain_args(&call.args)?[..] else {
            return None;
        };

        let Some(inlined) = inline_callback(self.parsed, callback, RULES) else {
            tracing::trace!(span = ?stmt.span, "forEach callback cannot be inlined");
            return None;
        };
        if inlined.names.iter().any(|name| mentions(iterable, name)) {
            return None;
        }
        Some(for_of_edit(
            statement_range(self.parsed, stmt.span),
            &inlined,
            self.parsed.range(iterable.span()),
        ))
    }
}

impl Visit for ArrayFromForEach<'_> {
    fn visit_expr_stmt(&mut self, stmt: &ExprStmt) {
        if let Some(edit) = self.rewrite(stmt) {
            self.edits.push(edit);
        }
        stmt.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use crate::passes::PassKind;
    use crate::test_support::{rewrite, unchanged};

    const KIND: PassKind = PassKind::ArrayFromForEachToForOf;

    #[test]
    fn iterates_the_source_directly() {
        let (output, lines) = rewrite(
            KIND,
            "Array.from(set).forEach(value => {\n  use(value);\n});\n",
        );
        assert_eq!(output, "for (const value of set) {\n  use(value);\n}\n");
        assert_eq!(lines, vec![1]);
    }

    #[test]
    fn accepts_expression_bodies_and_unused_extra_params() {
        let (output, _) = rewrite(KIND, "Array.from(map).forEach(([k, v], i) => put(k, v));\n");
        assert_eq!(output, "for (const [k, v] of map) { put(k, v); }\n");
        let (output, _) = rewrite(KIND, "Array.from(xs).forEach(function (x) { x = f(x); g(x); });\n");
        assert_eq!(output, "for (let x of xs) { x = f(x); g(x); }\n");
    }

    #[test]
    fn nested_loops_are_rewritten_together() {
        let (output, lines) = rewrite(
            KIND,
            "Array.from(rows).forEach(row => {\n  Array.from(row).forEach(cell => draw(cell));\n});\n",
        );
        assert_eq!(
            output,
            "for (const row of rows) {\n  for (const cell of row) { draw(cell); }\n}\n"
        );
        assert_eq!(lines, vec![1, 2]);
    }

    #[test]
    fn skips_unsafe_shapes() {
        unchanged(KIND, "const r = Array.from(xs).forEach(x => use(x));\n");
        unchanged(KIND, "Array.from(xs, f).forEach(x => use(x));\n");
        unchanged(KIND, "Array.from({ length: 3 }).forEach(x => use(x));\n");
        unchanged(KIND, "Array.from(xs).forEach((x, i) => use(x, i));\n");
        unchanged(KIND, "Array.from(xs).forEach(x => { if (x) return; use(x); });\n");
        unchanged(KIND, "Array.from(xs).forEach(handle);\n");
        unchanged(KIND, "Array.from(xs).forEach(x => use(x), ctx);\n");
        unchanged(KIND, "Array.from(x.items).forEach(x => use(x));\n");
    }
}
