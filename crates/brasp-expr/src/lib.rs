//! BRASP expressions: parse, inspect and evaluate the scalar expressions
//! that make up operation bodies.
//!
//! ```
//! use brasp_expr::{Expression, Value};
//! use std::collections::HashMap;
//!
//! let expr = Expression::parse("i - j").unwrap();
//! assert_eq!(expr.variables(), ["i", "j"]);
//!
//! let scope = HashMap::from([
//!     ("i".to_string(), Value::Num(2.0)),
//!     ("j".to_string(), Value::Num(1.0)),
//! ]);
//! assert_eq!(expr.evaluate(&scope).unwrap(), Value::Num(1.0));
//! ```
pub mod ast;
pub mod eval;
pub mod parser;
pub mod render;
pub mod value;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use eval::{evaluate, EvalError, Scope};
pub use parser::{parse_expr, ParseError};
pub use render::render_expr;
pub use value::Value;

use serde::{Serialize, Serializer};
use std::fmt;

/// A parsed expression together with the names it mentions.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    ast: Expr,
    variables: Vec<String>,
    functions: Vec<String>,
}

impl Expression {
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let ast = parse_expr(source)?;
        Ok(Self {
            source: source.to_string(),
            variables: ast.variables(),
            functions: ast.calls(),
            ast,
        })
    }

    /// The text this expression was parsed from, unchanged.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// Free identifiers (not in call position), in order of first use.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Names used in call position, in order of first use.
    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    /// First free identifier that is neither in `allowed` nor one of this
    /// expression's own call names.
    pub fn undeclared_variable(&self, allowed: &[&str]) -> Option<&str> {
        self.variables
            .iter()
            .map(String::as_str)
            .find(|v| !allowed.contains(v) && !self.functions.iter().any(|f| f.as_str() == *v))
    }

    pub fn evaluate<S: Scope + ?Sized>(&self, scope: &S) -> Result<Value, EvalError> {
        evaluate(&self.ast, scope)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Expression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}
