//! Counted loops over an array whose body only reads the current element:
//!
//! ```text
//! for (let i = 0; i < items.length; i++) { const item = items[i]; use(item); }
//! for (const item of items) { use(item); }
//! ```

use mz_ast::{
    BinaryOp, Decl, Expr, ForStmt, Lit, MemberProp, Pat, Stmt, UpdateOp, VarDecl, VarDeclKind,
    VarDeclOrExpr,
};
use mz_parser::{Edit, ParsedProgram};
use swc_common::Spanned;
use swc_ecma_visit::{Visit, VisitWith};

use super::statement_range;
use crate::analysis::liveness::{assigned_names, index_is_live, mentions};
use crate::syntax::{ident_name, member_prop_name, unparen};

pub(crate) fn collect(parsed: &ParsedProgram) -> Vec<Edit> {
    let mut pass = IndexedFor {
        parsed,
        edits: Vec::new(),
    };
    parsed.program.visit_with(&mut pass);
    pass.edits
}

struct IndexedFor<'p> {
    parsed: &'p ParsedProgram,
    edits: Vec<Edit>,
}

/// `let i = 0` → `i`.
fn zero_index(init: &VarDeclOrExpr) -> Option<&str> {
    let VarDeclOrExpr::VarDecl(decl) = init else {
        return None;
    };
    if decl.kind != VarDeclKind::Let {
        return None;
    }
    let [declarator] = &decl.decls[..] else {
        return None;
    };
    let Pat::Ident(binding) = &declarator.name else {
        return None;
    };
    match declarator.init.as_deref().map(unparen) {
        Some(Expr::Lit(Lit::Num(num))) if num.value == 0.0 => Some(binding.id.sym.as_ref()),
        _ => None,
    }
}

/// `i < items.length` → `items`.
fn length_bound<'a>(test: &'a Expr, index: &str) -> Option<&'a str> {
    let Expr::Bin(bin) = unparen(test) else {
        return None;
    };
    if bin.op != BinaryOp::Lt || ident_name(unparen(&bin.left)) != Some(index) {
        return None;
    }
    let Expr::Member(member) = unparen(&bin.right) else {
        return None;
    };
    if member_prop_name(&member.prop) != Some("length") {
        return None;
    }
    ident_name(unparen(&member.obj))
}

/// `i++` or `++i`.
fn is_increment(update: &Expr, index: &str) -> bool {
    match unparen(update) {
        Expr::Update(update) => {
            update.op == UpdateOp::PlusPlus && ident_name(unparen(&update.arg)) == Some(index)
        }
        _ => false,
    }
}

/// `const item = items[i];` → the declaration.
fn element_decl<'a>(stmt: &'a Stmt, array: &str, index: &str) -> Option<&'a VarDecl> {
    let Stmt::Decl(Decl::Var(decl)) = stmt else {
        return None;
    };
    let [declarator] = &decl.decls[..] else {
        return None;
    };
    let typed = match &declarator.name {
        Pat::Ident(binding) => binding.type_ann.is_some(),
        Pat::Array(array) => array.type_ann.is_some(),
        Pat::Object(object) => object.type_ann.is_some(),
        _ => return None,
    };
    if typed || mentions(&declarator.name, index) {
        return None;
    }
    let Some(Expr::Member(member)) = declarator.init.as_deref().map(unparen) else {
        return None;
    };
    let MemberProp::Computed(computed) = &member.prop else {
        return None;
    };
    let indexes = ident_name(unparen(&computed.expr)) == Some(index);
    (indexes && ident_name(unparen(&member.obj)) == Some(array)).then_some(&**decl)
}

fn keyword(kind: VarDeclKind) -> &'static str {
    match kind {
        VarDeclKind::Var => "var",
        VarDeclKind::Let => "let",
        VarDeclKind::Const => "const",
    }
}

impl IndexedFor<'_> {
    fn rewrite(&self, stmt: &ForStmt) -> Option<Edit> {
        let index = zero_index(stmt.init.as_ref()?)?;
        let array = length_bound(stmt.test.as_deref()?, index)?;
        if array == index || !is_increment(stmt.update.as_deref()?, index) {
            return None;
        }
        let Stmt::Block(body) = &*stmt.body else {
            return None;
        };
        let (first, rest) = body.stmts.split_first()?;
        let decl = element_decl(first, array, index)?;

        if index_is_live(index, rest) {
            tracing::trace!(index, "loop index is used beyond the element read");
            return None;
        }
        if rest.iter().any(|stmt| assigned_names(stmt).contains(array)) {
            return None;
        }

        let body_range = self.parsed.range(body.span);
        let first_end = statement_range(self.parsed, first.span()).end;
        Some(
            Edit::new(self.parsed.range(stmt.span))
                .text(format!("for ({} ", keyword(decl.kind)))
                .source(self.parsed.range(decl.decls[0].name.span()))
                .text(format!(" of {array}) {{"))
                .source(first_end..body_range.end),
        )
    }
}

impl Visit for IndexedFor<'_> {
    fn visit_for_stmt(&mut self, stmt: &ForStmt) {
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

    const KIND: PassKind = PassKind::IndexedForToForOf;

    #[test]
    fn consumes_the_element_declaration() {
        let (output, lines) = rewrite(
            KIND,
            "for (let i = 0; i < items.length; i++) { const item = items[i]; console.log(item); }",
        );
        assert_eq!(output, "for (const item of items) { console.log(item); }");
        assert_eq!(lines, vec![1]);
    }

    #[test]
    fn keeps_layout_and_keyword() {
        let (output, _) = rewrite(
            KIND,
            "for (let i = 0; i < rows.length; ++i) {\n  let [a, b] = rows[i];\n  a += b;\n  emit(a);\n}\n",
        );
        assert_eq!(output, "for (let [a, b] of rows) {\n  a += b;\n  emit(a);\n}\n");
    }

    #[test]
    fn live_index_blocks_the_rewrite() {
        unchanged(
            KIND,
            "for (let i = 0; i < items.length; i++) { const item = items[i]; console.log(item, i); }",
        );
    }

    #[test]
    fn shape_deviations_are_left_alone() {
        unchanged(KIND, "for (let i = 1; i < xs.length; i++) { const x = xs[i]; use(x); }");
        unchanged(KIND, "for (let i = 0; i <= xs.length; i++) { const x = xs[i]; use(x); }");
        unchanged(KIND, "for (let i = 0; i < xs.length; i += 1) { const x = xs[i]; use(x); }");
        unchanged(KIND, "for (let i = 0; i < xs.length; i++) { const x = ys[i]; use(x); }");
        unchanged(KIND, "for (let i = 0; i < xs.length; i++) { use(xs[i]); }");
        unchanged(KIND, "for (let i = 0; i < xs.length; i++) { const x = xs[i], y = 1; use(x, y); }");
        unchanged(KIND, "for (let i = 0; i < xs.length; i++) { const x = xs[i]; xs = []; }");
        unchanged(KIND, "for (let i = 0; i < a.b.length; i++) { const x = a.b[i]; use(x); }");
        unchanged(KIND, "for (let i = 0; i < xs.length; i++) use(xs[i]);");
    }
}
