//! `document.querySelectorAll(sel).forEach(el => { … });` →
//! `for (const el of document.querySelectorAll(sel)) { … }`.
//!
//! Only receivers proven to be DOM collections qualify; an arbitrary
//! `.forEach` may belong to a type without an iterator.

use mz_ast::{Expr, ExprStmt};
use mz_parser::{Edit, ParsedProgram};
use swc_common::Spanned;
use swc_ecma_visit::{Visit, VisitWith};

use super::{for_of_edit, statement_range};
use crate::analysis::callback::{inline_callback, CallbackRules};
use crate::analysis::liveness::mentions;
use crate::analysis::provenance::chains_to_trusted_root;
use crate::syntax::{callee_member, plain_args, unparen};

const RULES: CallbackRules = CallbackRules {
    expression_body: false,
    extra_params: false,
};

pub(crate) fn collect(parsed: &ParsedProgram) -> Vec<Edit> {
    let mut pass = DomForEach {
        parsed,
        edits: Vec::new(),
    };
    parsed.program.visit_with(&mut pass);
    pass.edits
}

struct DomForEach<'p> {
    parsed: &'p ParsedProgram,
    edits: Vec<Edit>,
}

impl DomForEach<'_> {
    fn rewrite(&self, stmt: &ExprStmt) -> Option<Edit> {
        let Expr::Call(call) = unparen(&stmt.expr) else {
            return None;
        };
        let (receiver, "forEach") = callee_member(call)? else {
            return None;
        };
        if !chains_to_trusted_root(receiver) {
            return None;
        }
        let [callback] = plain_args(&call.args)?[..] else {
            return None;
        };
        let inlined = inline_callback(self.parsed, callback, RULES)?;
        if inlined.names.iter().any(|name| mentions(receiver, name)) {
            return None;
        }
        Some(for_of_edit(
            statement_range(self.parsed, stmt.span),
            &inlined,
            self.parsed.range(receiver.span()),
        ))
    }
}

impl Visit for DomForEach<'_> {
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

    const KIND: PassKind = PassKind::DomForEachToForOf;

    #[test]
    fn rewrites_document_queries() {
        let (output, lines) = rewrite(
            KIND,
            "document.querySelectorAll('.item').forEach(item => { item.remove(); });",
        );
        assert_eq!(
            output,
            "for (const item of document.querySelectorAll('.item')) { item.remove(); }"
        );
        assert_eq!(lines, vec![1]);
    }

    #[test]
    fn follows_window_to_document() {
        let (output, _) = rewrite(
            KIND,
            "window.document.fonts.forEach(function (font) { load(font); });\n",
        );
        assert_eq!(output, "for (const font of window.document.fonts) { load(font); }\n");
    }

    #[test]
    fn requires_a_trusted_root_and_a_plain_callback() {
        unchanged(KIND, "element.querySelectorAll('.item').forEach(item => { item.remove(); });");
        unchanged(KIND, "document.querySelectorAll('a').forEach(a => a.remove());");
        unchanged(KIND, "document.querySelectorAll('a').forEach((a, i) => { a.id = i; });");
        unchanged(KIND, "document.querySelectorAll('a').forEach(remove);");
        unchanged(KIND, "document.getElementById('a').forEach(a => { a.remove(); });");
        unchanged(
            KIND,
            "document.childNodes.forEach(function (node) { this.visit(node); });",
        );
    }

    #[test]
    fn stops_at_the_first_call_in_the_chain() {
        unchanged(
            KIND,
            "document.querySelectorAll('a').childNodes.forEach(n => { use(n); });",
        );
    }
}
