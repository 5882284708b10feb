//! Small structural queries shared by the passes.

use mz_ast::{CallExpr, Callee, Expr, ExprOrSpread, MemberProp, Pat};

/// Look through any number of redundant parentheses.
pub(crate) fn unparen(expr: &Expr) -> &Expr {
    let mut expr = expr;
    while let Expr::Paren(paren) = expr {
        expr = &paren.expr;
    }
    expr
}

pub(crate) fn ident_name(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.as_ref()),
        _ => None,
    }
}

pub(crate) fn member_prop_name(prop: &MemberProp) -> Option<&str> {
    match prop {
        MemberProp::Ident(ident) => Some(ident.sym.as_ref()),
        _ => None,
    }
}

/// `(object, name)` when the callee of `call` is a non-computed member access.
pub(crate) fn callee_member(call: &CallExpr) -> Option<(&Expr, &str)> {
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Member(member) = unparen(callee) else {
        return None;
    };
    Some((&*member.obj, member_prop_name(&member.prop)?))
}

/// Matches `Object.method(...)` where `Object` is a bare identifier.
pub(crate) fn static_call<'a>(expr: &'a Expr, object: &str, method: &str) -> Option<&'a CallExpr> {
    let Expr::Call(call) = expr else {
        return None;
    };
    let (obj, name) = callee_member(call)?;
    (ident_name(unparen(obj)) == Some(object) && name == method).then_some(call)
}

/// The call's arguments, or `None` when any argument is spread.
pub(crate) fn plain_args(args: &[ExprOrSpread]) -> Option<Vec<&Expr>> {
    args.iter()
        .map(|arg| arg.spread.is_none().then_some(&*arg.expr))
        .collect()
}

/// Expressions that bind at least as tightly as a postfix/update expression,
/// so they can be an operand of `**` without parentheses.
pub(crate) fn is_atom(expr: &Expr) -> bool {
    match expr {
        Expr::New(new) => new.args.is_some(),
        Expr::Ident(_)
        | Expr::Lit(_)
        | Expr::This(_)
        | Expr::Array(_)
        | Expr::Object(_)
        | Expr::Tpl(_)
        | Expr::TaggedTpl(_)
        | Expr::Paren(_)
        | Expr::Member(_)
        | Expr::SuperProp(_)
        | Expr::Call(_)
        | Expr::OptChain(_)
        | Expr::MetaProp(_)
        | Expr::Update(_)
        | Expr::TsNonNull(_) => true,
        _ => false,
    }
}

/// Names bound by a simple identifier parameter.
pub(crate) fn pat_ident(pat: &Pat) -> Option<&str> {
    match pat {
        Pat::Ident(binding) => Some(binding.id.sym.as_ref()),
        _ => None,
    }
}
