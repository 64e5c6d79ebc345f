//! Boolean constraint expressions checked against retrieved values.
//!
//! An expression refers to the value under test as `v`:
//!
//! ```text
//! v >= 0 and v < 150
//! (v % 2 == 0 or v % 2 == 1) and v < 13
//! ops_in(v, {'Messiah', 'Water Music'})
//! ```
//!
//! Supported: numbers, quoted strings, `true`/`false`, `+ - * / %`,
//! `== != ~= < <= > >=`, `and`, `or`, `not`, parentheses and the membership
//! test `ops_in(value, {literal, ...})`. `and`/`or` short-circuit and require
//! boolean operands. Integers mixed with floats are compared and combined as
//! floats; `/` always yields a float and `%` is floored modulo.
//!
//! Expressions are pure: they see one value and nothing else.

mod error;
mod eval;
mod lexer;
mod parser;

pub use error::ExprError;

use crate::document::Scalar;
use parser::Expr;

/// Name of the membership helper, mentioned in violation reports.
pub(crate) const MEMBERSHIP_FN: &str = "ops_in";

/// A parsed constraint, reusable across many values.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    source: String,
    expr: Expr,
}

impl Constraint {
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        Ok(Self {
            source: source.to_string(),
            expr: parser::parse(source)?,
        })
    }

    /// Checks one value; `Err` when the expression cannot be evaluated for it
    /// or produces something other than a boolean.
    pub fn check(&self, value: &Scalar) -> Result<bool, ExprError> {
        match eval::eval(&self.expr, value)? {
            Scalar::Bool(b) => Ok(b),
            other => Err(ExprError::NotBoolean {
                found: other.kind().name(),
            }),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Parses and checks `expr` against one value. A blank expression accepts everything.
pub fn evaluate(expr: &str, value: &Scalar) -> Result<bool, ExprError> {
    if expr.trim().is_empty() {
        return Ok(true);
    }
    Constraint::parse(expr)?.check(value)
}
