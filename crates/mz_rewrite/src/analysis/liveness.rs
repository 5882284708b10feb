//! Identifier occurrence and reassignment queries.

use std::collections::HashSet;

use mz_ast::{
    AssignExpr, AssignTarget, BindingIdent, Expr, ForHead, ForInStmt, ForOfStmt, Ident, Pat,
    SimpleAssignTarget, Stmt, UpdateExpr,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::syntax::unparen;

pub struct IdentFinder<'n> {
    name: &'n str,
    found: bool,
}

impl Visit for IdentFinder<'_> {
    fn visit_stmt(&mut self, node: &Stmt) {
        if !self.found {
            node.visit_children_with(self);
        }
    }

    fn visit_expr(&mut self, node: &Expr) {
        if !self.found {
            node.visit_children_with(self);
        }
    }

    fn visit_ident(&mut self, ident: &Ident) {
        if ident.sym.as_ref() == self.name {
            self.found = true;
        }
    }
}

/// Whether any identifier node named `name` occurs in `node`, bindings and
/// shadowing declarations included.
pub fn mentions<N>(node: &N, name: &str) -> bool
where
    N: for<'n> VisitWith<IdentFinder<'n>> + ?Sized,
{
    let mut finder = IdentFinder { name, found: false };
    node.visit_with(&mut finder);
    finder.found
}

/// Loop-index liveness: whether `index` is referenced anywhere in the
/// statements that remain once the loop's element declaration is consumed.
pub fn index_is_live(index: &str, rest: &[Stmt]) -> bool {
    rest.iter().any(|stmt| mentions(stmt, index))
}

/// Collects every name written to by assignment, `++`/`--`, destructuring
/// assignment, or a bare `for…in`/`for…of` head.
#[derive(Default)]
pub struct AssignedNames {
    pub names: HashSet<String>,
}

impl AssignedNames {
    fn add_pattern(&mut self, pat: &Pat) {
        self.names.extend(bound_names(pat));
    }
}

/// Names an assignment writes directly; member targets write none.
pub fn assign_target_names(target: &AssignTarget) -> Vec<String> {
    match target {
        AssignTarget::Simple(SimpleAssignTarget::Ident(binding)) => {
            vec![binding.id.sym.to_string()]
        }
        AssignTarget::Simple(SimpleAssignTarget::Paren(paren)) => match unparen(&paren.expr) {
            Expr::Ident(ident) => vec![ident.sym.to_string()],
            _ => Vec::new(),
        },
        AssignTarget::Pat(pat) => bound_names(pat),
        AssignTarget::Simple(_) => Vec::new(),
    }
}

/// The variable `++`/`--` writes, if it is a plain name.
pub fn update_target_name(node: &UpdateExpr) -> Option<String> {
    match unparen(&node.arg) {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        _ => None,
    }
}

impl Visit for AssignedNames {
    fn visit_assign_expr(&mut self, node: &AssignExpr) {
        self.names.extend(assign_target_names(&node.left));
        node.visit_children_with(self);
    }

    fn visit_update_expr(&mut self, node: &UpdateExpr) {
        self.names.extend(update_target_name(node));
        node.visit_children_with(self);
    }

    fn visit_for_in_stmt(&mut self, node: &ForInStmt) {
        if let ForHead::Pat(pat) = &node.left {
            self.add_pattern(pat);
        }
        node.visit_children_with(self);
    }

    fn visit_for_of_stmt(&mut self, node: &ForOfStmt) {
        if let ForHead::Pat(pat) = &node.left {
            self.add_pattern(pat);
        }
        node.visit_children_with(self);
    }
}

/// Names a destructuring pattern binds or assigns.
#[derive(Default)]
pub struct PatternBindings {
    pub names: Vec<String>,
}

impl Visit for PatternBindings {
    fn visit_binding_ident(&mut self, node: &BindingIdent) {
        self.names.push(node.id.sym.to_string());
    }

    // Default values are expressions, not targets.
    fn visit_expr(&mut self, _: &Expr) {}
}

/// Names written anywhere inside `node`.
pub fn assigned_names<N>(node: &N) -> HashSet<String>
where
    N: VisitWith<AssignedNames> + ?Sized,
{
    let mut collector = AssignedNames::default();
    node.visit_with(&mut collector);
    collector.names
}

/// Names bound by every pattern inside `node`: a declaration pattern or a
/// whole parameter list.
pub fn bound_names<N>(node: &N) -> Vec<String>
where
    N: VisitWith<PatternBindings> + ?Sized,
{
    let mut bindings = PatternBindings::default();
    node.visit_with(&mut bindings);
    bindings.names
}
