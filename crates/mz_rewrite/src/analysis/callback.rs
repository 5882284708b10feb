//! Inlining of a `forEach` callback as the body of a `for…of` loop.
//!
//! The callback must behave the same when its body runs directly inside the
//! loop: no `return` (it would leave the enclosing function), no `var`
//! (it would hoist out of the callback), no `this`-like captures when the
//! callback is a plain function, and parameters that map onto a single loop
//! binding.

use std::collections::HashSet;
use std::ops::Range;

use mz_ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, Class, Constructor, Expr, Function, GetterProp, Pat,
    ReturnStmt, SetterProp, VarDecl, VarDeclKind,
};
use mz_parser::ParsedProgram;
use swc_common::Spanned;
use swc_ecma_visit::{Visit, VisitWith};

use super::free_vars::function_capture;
use super::liveness::{assigned_names, bound_names, mentions};
use crate::syntax::unparen;

/// Which callback shapes a pass accepts.
#[derive(Debug, Clone, Copy)]
pub struct CallbackRules {
    /// Accept `x => expr`, rendered as `{ expr; }`.
    pub expression_body: bool,
    /// Accept `([k, v], i) => …` when the extra parameters are unused.
    pub extra_params: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopBody {
    Block(Range<usize>),
    Expr(Range<usize>),
}

/// A callback accepted for inlining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineCallback {
    pub keyword: &'static str,
    pub binding: Range<usize>,
    pub body: LoopBody,
    /// Names the loop binding introduces.
    pub names: Vec<String>,
}

struct Parts<'a> {
    params: Vec<&'a Pat>,
    body: Body<'a>,
}

#[derive(Clone, Copy)]
enum Body<'a> {
    Block(&'a BlockStmt),
    Expr(&'a Expr),
}

impl Body<'_> {
    fn mentions(self, name: &str) -> bool {
        match self {
            Body::Block(block) => mentions(block, name),
            Body::Expr(expr) => mentions(expr, name),
        }
    }

    fn assigned(self) -> HashSet<String> {
        match self {
            Body::Block(block) => assigned_names(block),
            Body::Expr(expr) => assigned_names(expr),
        }
    }
}

/// Accepts `callback` as a loop body, or `None` when inlining could change
/// behaviour.
pub fn inline_callback(
    parsed: &ParsedProgram,
    callback: &Expr,
    rules: CallbackRules,
) -> Option<InlineCallback> {
    let parts = match unparen(callback) {
        Expr::Arrow(arrow) => arrow_parts(arrow)?,
        Expr::Fn(fn_expr) => {
            let function = &fn_expr.function;
            if function.is_async || function.is_generator || function.type_params.is_some() {
                return None;
            }
            if let Some(capture) = function_capture(function) {
                tracing::trace!(?capture, "callback captures its own binding");
                return None;
            }
            let body = function.body.as_ref()?;
            if let Some(ident) = &fn_expr.ident {
                if mentions(body, ident.sym.as_ref()) {
                    return None;
                }
            }
            Parts {
                params: function.params.iter().map(|param| &param.pat).collect(),
                body: Body::Block(body),
            }
        }
        _ => return None,
    };

    let (first, extra) = parts.params.split_first()?;
    if !simple_binding(first) {
        return None;
    }
    if !extra.is_empty() {
        let destructured = matches!(first, Pat::Array(_) | Pat::Object(_));
        if !rules.extra_params || !destructured {
            return None;
        }
        for param in extra {
            let Pat::Ident(binding) = param else {
                return None;
            };
            if binding.type_ann.is_some() || parts.body.mentions(binding.id.sym.as_ref()) {
                return None;
            }
        }
    }

    let names = bound_names(*first);
    let body = match parts.body {
        Body::Block(block) => {
            if escapes_loop_body(block) {
                return None;
            }
            LoopBody::Block(parsed.range(block.span))
        }
        Body::Expr(expr) if rules.expression_body => LoopBody::Expr(parsed.range(expr.span())),
        Body::Expr(_) => return None,
    };

    let reassigned = parts.body.assigned();
    let keyword = if names.iter().any(|name| reassigned.contains(name)) {
        "let"
    } else {
        "const"
    };

    Some(InlineCallback {
        keyword,
        binding: parsed.range(first.span()),
        body,
        names,
    })
}

fn arrow_parts(arrow: &ArrowExpr) -> Option<Parts<'_>> {
    if arrow.is_async || arrow.is_generator || arrow.type_params.is_some() {
        return None;
    }
    let body = match &*arrow.body {
        BlockStmtOrExpr::BlockStmt(block) => Body::Block(block),
        BlockStmtOrExpr::Expr(expr) => Body::Expr(expr),
    };
    Some(Parts {
        params: arrow.params.iter().collect(),
        body,
    })
}

/// A parameter that can be written as a `for…of` binding as-is.
fn simple_binding(pat: &Pat) -> bool {
    match pat {
        Pat::Ident(binding) => binding.type_ann.is_none(),
        Pat::Array(array) => array.type_ann.is_none(),
        Pat::Object(object) => object.type_ann.is_none(),
        _ => false,
    }
}

fn escapes_loop_body<N>(node: &N) -> bool
where
    N: VisitWith<EscapeFinder> + ?Sized,
{
    let mut finder = EscapeFinder::default();
    node.visit_with(&mut finder);
    finder.found
}

/// Finds `return` and `var` that belong to the callback itself.
#[derive(Default)]
pub struct EscapeFinder {
    found: bool,
}

impl Visit for EscapeFinder {
    fn visit_function(&mut self, _: &Function) {}
    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}
    fn visit_class(&mut self, _: &Class) {}
    fn visit_constructor(&mut self, _: &Constructor) {}
    fn visit_getter_prop(&mut self, _: &GetterProp) {}
    fn visit_setter_prop(&mut self, _: &SetterProp) {}

    fn visit_return_stmt(&mut self, _: &ReturnStmt) {
        self.found = true;
    }

    fn visit_var_decl(&mut self, node: &VarDecl) {
        if node.kind == VarDeclKind::Var {
            self.found = true;
        }
        node.visit_children_with(self);
    }
}
