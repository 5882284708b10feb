//! Call-chain provenance: proving that a receiver such as
//! `document.querySelectorAll('.item')` derives from a trusted global root
//! through known, iterable-returning members only.

use mz_ast::{Callee, Expr, MemberExpr};

use crate::syntax::{member_prop_name, unparen};

/// Members of one root whose result may be handed to `for…of`.
#[derive(Debug)]
pub struct TrustedRoot {
    pub name: &'static str,
    pub methods: &'static [&'static str],
    pub properties: &'static [&'static str],
}

/// Roots whose members are trusted. A property that names another root
/// (`window.document`) continues the chain from that root.
pub static TRUSTED_ROOTS: &[TrustedRoot] = &[
    TrustedRoot {
        name: "document",
        methods: &["querySelectorAll", "getElementsByName"],
        properties: &["childNodes", "fonts"],
    },
    TrustedRoot {
        name: "window",
        methods: &[],
        properties: &["document"],
    },
];

fn trusted_root(name: &str) -> Option<&'static TrustedRoot> {
    TRUSTED_ROOTS.iter().find(|root| root.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hop<'a> {
    name: &'a str,
    call: bool,
}

/// Decompose `root.a().b.c()` into `("root", [a(), b, c()])`.
fn decompose(expr: &Expr) -> Option<(&str, Vec<Hop<'_>>)> {
    let mut hops = Vec::new();
    let mut current = unparen(expr);
    loop {
        match current {
            Expr::Ident(ident) => {
                hops.reverse();
                return Some((ident.sym.as_ref(), hops));
            }
            Expr::Call(call) => {
                let Callee::Expr(callee) = &call.callee else {
                    return None;
                };
                let Expr::Member(member) = unparen(callee) else {
                    return None;
                };
                hops.push(hop(member, true)?);
                current = unparen(&member.obj);
            }
            Expr::Member(member) => {
                hops.push(hop(member, false)?);
                current = unparen(&member.obj);
            }
            _ => return None,
        }
    }
}

fn hop(member: &MemberExpr, call: bool) -> Option<Hop<'_>> {
    Some(Hop {
        name: member_prop_name(&member.prop)?,
        call,
    })
}

/// Whether `receiver` chains back to a trusted root and every hop is
/// whitelisted for the root it is taken from.
pub fn chains_to_trusted_root(receiver: &Expr) -> bool {
    let Some((root, hops)) = decompose(receiver) else {
        return false;
    };
    let Some(mut root) = trusted_root(root) else {
        return false;
    };
    let Some(last) = hops.last() else {
        return false;
    };
    let mut after_call = false;
    for hop in &hops {
        // A call result is a collection, never another root.
        if after_call {
            return false;
        }
        after_call = hop.call;
        let allowed = if hop.call {
            root.methods.contains(&hop.name)
        } else {
            root.properties.contains(&hop.name)
        };
        if !allowed {
            return false;
        }
        if !hop.call {
            if let Some(next) = trusted_root(hop.name) {
                root = next;
            }
        }
    }
    // The chain must end on a collection, not on another root.
    last.call || trusted_root(last.name).is_none()
}
