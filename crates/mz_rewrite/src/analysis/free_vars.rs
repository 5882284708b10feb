//! Scope-bounded search for bindings a function body borrows from the
//! function that owns it.
//!
//! A plain `function` (declaration, expression, method) introduces its own
//! `this`, `arguments`, `super` and `new.target`, so the search stops at it.
//! Arrow functions introduce none of them and are searched through. The rule
//! is the same for every capture kind.
//!
//! Constructors, accessors and class field initialisers also rebind `this`,
//! but they are searched through: reporting a capture that is not there only
//! ever blocks a rewrite.

use mz_ast::{Expr, Function, Ident, MetaPropExpr, MetaPropKind, Stmt, Super, ThisExpr};
use swc_ecma_visit::{Visit, VisitWith};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    This,
    Arguments,
    Super,
    NewTarget,
}

impl Capture {
    pub const ALL: [Capture; 4] = [
        Capture::This,
        Capture::Arguments,
        Capture::Super,
        Capture::NewTarget,
    ];
}

pub struct CaptureFinder {
    capture: Capture,
    found: bool,
}

impl Visit for CaptureFinder {
    fn visit_function(&mut self, _: &Function) {}

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

    fn visit_this_expr(&mut self, _: &ThisExpr) {
        if self.capture == Capture::This {
            self.found = true;
        }
    }

    fn visit_ident(&mut self, ident: &Ident) {
        let name: &str = ident.sym.as_ref();
        match self.capture {
            Capture::Arguments if name == "arguments" => self.found = true,
            // `<this.Component />` names `this` through an identifier.
            Capture::This if name == "this" => self.found = true,
            _ => {}
        }
    }

    fn visit_super(&mut self, _: &Super) {
        if self.capture == Capture::Super {
            self.found = true;
        }
    }

    fn visit_meta_prop_expr(&mut self, node: &MetaPropExpr) {
        if self.capture == Capture::NewTarget && node.kind == MetaPropKind::NewTarget {
            self.found = true;
        }
    }
}

/// Whether `node` refers to `capture` owned by an enclosing plain function.
pub fn references<N>(node: &N, capture: Capture) -> bool
where
    N: VisitWith<CaptureFinder> + ?Sized,
{
    let mut finder = CaptureFinder {
        capture,
        found: false,
    };
    node.visit_with(&mut finder);
    finder.found
}

/// First capture found in the parameters or body of `function`.
pub fn function_capture(function: &Function) -> Option<Capture> {
    Capture::ALL.into_iter().find(|&capture| {
        function
            .params
            .iter()
            .any(|param| references(param, capture))
            || function
                .body
                .as_ref()
                .is_some_and(|body| references(body, capture))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::first_fn_expr;

    fn capture_of(source: &str) -> Option<Capture> {
        first_fn_expr(source, |function| function_capture(function))
    }

    #[test]
    fn detects_direct_references() {
        assert_eq!(capture_of("f(function () { return this.x; });"), Some(Capture::This));
        assert_eq!(capture_of("f(function () { return arguments[0]; });"), Some(Capture::Arguments));
        assert_eq!(capture_of("f(function () { return new.target; });"), Some(Capture::NewTarget));
        assert_eq!(capture_of("f(function (a = this) { return a; });"), Some(Capture::This));
        assert_eq!(capture_of("f(function (a) { return a.arguments; });"), None);
    }

    #[test]
    fn nested_arrows_are_transparent_for_every_capture() {
        assert_eq!(capture_of("f(function () { return () => this; });"), Some(Capture::This));
        assert_eq!(
            capture_of("f(function () { return () => arguments; });"),
            Some(Capture::Arguments)
        );
        assert_eq!(
            capture_of("f(function () { return () => new.target; });"),
            Some(Capture::NewTarget)
        );
    }

    #[test]
    fn nested_plain_functions_are_opaque_for_every_capture() {
        assert_eq!(capture_of("f(function () { return function () { return this; }; });"), None);
        assert_eq!(
            capture_of("f(function () { return function () { return arguments; }; });"),
            None
        );
        assert_eq!(
            capture_of("f(function () { return { m() { return super.m(); } }; });"),
            None
        );
    }
}
