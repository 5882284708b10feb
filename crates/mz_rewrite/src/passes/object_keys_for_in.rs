//! `for (const k of Object.keys(o))` → `for (const k in o)`.

use mz_ast::{ForHead, ForOfStmt};
use mz_parser::{Edit, ParsedProgram};
use swc_common::Spanned;
use swc_ecma_visit::{Visit, VisitWith};

use crate::syntax::{plain_args, static_call, unparen};

pub(crate) fn collect(parsed: &ParsedProgram) -> Vec<Edit> {
    let mut pass = ObjectKeysForIn {
        parsed,
        edits: Vec::new(),
    };
    parsed.program.visit_with(&mut pass);
    pass.edits
}

struct ObjectKeysForIn<'p> {
    parsed: &'p ParsedProgram,
    edits: Vec<Edit>,
}

impl ObjectKeysForIn<'_> {
    fn rewrite(&self, stmt: &ForOfStmt) -> Option<Edit> {
        if stmt.is_await {
            return None;
        }
        let call = static_call(unparen(&stmt.right), "Object", "keys")?;
        let [object] = plain_args(&call.args)?[..] else {
            return None;
        };
        let left = match &stmt.left {
            ForHead::VarDecl(decl) => decl.span,
            ForHead::Pat(pat) => pat.span(),
            ForHead::UsingDecl(_) => return None,
        };
        Some(
            Edit::new(self.parsed.range(stmt.span))
                .text("for (")
                .source(self.parsed.range(left))
                .text(" in ")
                .source(self.parsed.range(object.span()))
                .text(") ")
                .source(self.parsed.range(stmt.body.span())),
        )
    }
}

impl Visit for ObjectKeysForIn<'_> {
    fn visit_for_of_stmt(&mut self, stmt: &ForOfStmt) {
        if let Some(edit) = self.rewrite(stmt) {
            self.edits.push(edit);
        }
        stmt.visit_children_with(self);
    }
}
