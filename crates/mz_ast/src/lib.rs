//! ECMAScript/TypeScript AST for modernize.
//!
//! Re-exports the standard SWC AST and adds the configuration vocabulary
//! shared by the parser, the rewrite engine and the CLI:
//! - `Dialect`: which grammar a source file is parsed with
//! - `Baseline`: which tier of rewrites is allowed to run

pub use swc_ecma_ast::*;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Grammar used to parse a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// TypeScript with JSX. Accepts plain JavaScript, JSX and type annotations.
    #[default]
    Tsx,
    /// TypeScript without JSX, so `<T>expr` casts parse.
    Typescript,
    /// Modern JavaScript with JSX.
    Ecmascript,
}

impl Dialect {
    /// Pick the dialect for a file extension (without the leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "ts" | "mts" | "cts" => Some(Dialect::Typescript),
            "tsx" => Some(Dialect::Tsx),
            "js" | "jsx" | "mjs" | "cjs" => Some(Dialect::Ecmascript),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Tsx => "tsx",
            Dialect::Typescript => "typescript",
            Dialect::Ecmascript => "ecmascript",
        })
    }
}

/// Returned when a dialect name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dialect '{0}' (expected 'tsx', 'typescript' or 'ecmascript')")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tsx" => Ok(Dialect::Tsx),
            "typescript" | "ts" => Ok(Dialect::Typescript),
            "ecmascript" | "js" => Ok(Dialect::Ecmascript),
            other => Err(UnknownDialect(other.to_string())),
        }
    }
}

/// Adoption tier that decides which rewrites may run.
///
/// `WidelyAvailable` only emits syntax every supported runtime understands.
/// `NewlyAvailable` additionally allows APIs that only recently became
/// available everywhere (currently `Promise.try`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Baseline {
    #[default]
    WidelyAvailable,
    NewlyAvailable,
}

impl Baseline {
    pub fn as_str(self) -> &'static str {
        match self {
            Baseline::WidelyAvailable => "widely-available",
            Baseline::NewlyAvailable => "newly-available",
        }
    }
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a baseline name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown baseline '{0}' (expected 'widely-available' or 'newly-available')")]
pub struct UnknownBaseline(pub String);

impl FromStr for Baseline {
    type Err = UnknownBaseline;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "widely-available" | "widely" => Ok(Baseline::WidelyAvailable),
            "newly-available" | "newly" => Ok(Baseline::NewlyAvailable),
            other => Err(UnknownBaseline(other.to_string())),
        }
    }
}
