//! Rewrite engine that replaces outdated ECMAScript idioms with modern
//! syntax of the same behaviour.
//!
//! Passes (in the order they run):
//! - `var` → `const`/`let`
//! - `Object.assign({}, …)` → object spread
//! - `Array.from(x).forEach(cb)` → `for…of`
//! - `Array.from(x)` → `[...x]`
//! - `a.concat(b)` → array spread
//! - `Math.pow(a, b)` → `a ** b`
//! - indexed `for` loops → `for…of`
//! - `document.querySelectorAll(…).forEach(cb)` → `for…of`
//! - `for (k of Object.keys(o))` → `for (k in o)`
//! - string `+` chains → template literals
//! - anonymous `function` expressions → arrow functions
//! - `new Promise(…)` → `Promise.try(…)` (newly-available baseline only)
//!
//! Every pass is conservative: a candidate that fails any guard is left as
//! written.

pub mod analysis;
pub mod error;
mod parens;
pub mod passes;
mod syntax;
pub mod transform;

#[cfg(test)]
mod test_support;

pub use error::TransformError;
pub use mz_ast::{Baseline, Dialect};
pub use passes::{passes, PassKind};
pub use transform::{
    transform, transform_with, ChangeRecord, Convergence, TransformOptions, TransformResult,
};
