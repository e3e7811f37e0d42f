//! Operation model: the closed set of program steps
//!
//! Every constructor validates eagerly; an [`Operation`] that exists is
//! well-formed and never fails validation later during execution.
use crate::attention::AttentionOperation;
use crate::error::BraspError;
use crate::input::single_char;
use crate::scope::{qualify_calls, INDEX};
use brasp_expr::{Expr, Expression};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of an [`Operation`], with its display metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Initial,
    Boolean,
    Attention,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Initial => "initial",
            OperationKind::Boolean => "boolean",
            OperationKind::Attention => "attention",
        }
    }

    /// Background color used when rendering a program.
    pub fn color(&self) -> &'static str {
        match self {
            OperationKind::Initial => "#FFCCCC",
            OperationKind::Boolean => "#C6EFFC",
            OperationKind::Attention => "#ffe6cc",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a program.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    Initial(InitialOperation),
    Boolean(BooleanOperation),
    Attention(AttentionOperation),
}

impl Operation {
    pub fn initial(symbol: &str) -> Result<Self, BraspError> {
        InitialOperation::new(symbol).map(Operation::Initial)
    }

    pub fn boolean(name: impl Into<String>, expression: &str) -> Result<Self, BraspError> {
        BooleanOperation::new(name, expression).map(Operation::Boolean)
    }

    pub fn attention(
        name: impl Into<String>,
        tie: &str,
        mask: &str,
        score: &str,
        value: &str,
        default: &str,
    ) -> Result<Self, BraspError> {
        AttentionOperation::new(name, tie, mask, score, value, default).map(Operation::Attention)
    }

    pub fn name(&self) -> &str {
        match self {
            Operation::Initial(op) => op.name(),
            Operation::Boolean(op) => op.name(),
            Operation::Attention(op) => op.name(),
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Initial(_) => OperationKind::Initial,
            Operation::Boolean(_) => OperationKind::Boolean,
            Operation::Attention(_) => OperationKind::Attention,
        }
    }

    /// Names of the operations this one reads, in order of first use.
    pub fn functions(&self) -> &[String] {
        match self {
            Operation::Initial(_) => &[],
            Operation::Boolean(op) => op.functions(),
            Operation::Attention(op) => op.functions(),
        }
    }

    /// Left-hand side of the definition, e.g. `Q_a(i)`.
    pub fn head(&self) -> String {
        format!("{}({})", self.name(), INDEX)
    }

    /// Right-hand side of the definition; empty for initial operations.
    pub fn body(&self) -> String {
        match self {
            Operation::Initial(_) => String::new(),
            Operation::Boolean(op) => op.expression().source().to_string(),
            Operation::Attention(op) => op.body(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operation::Initial(_) => write!(f, "{}", self.head()),
            _ => write!(f, "{} := {}", self.head(), self.body()),
        }
    }
}

impl From<InitialOperation> for Operation {
    fn from(op: InitialOperation) -> Self {
        Operation::Initial(op)
    }
}

impl From<BooleanOperation> for Operation {
    fn from(op: BooleanOperation) -> Self {
        Operation::Boolean(op)
    }
}

impl From<AttentionOperation> for Operation {
    fn from(op: AttentionOperation) -> Self {
        Operation::Attention(op)
    }
}

// ============================================================================
// INITIAL
// ============================================================================

/// Detects one symbol: `Q_s(i)` is 1 where the input holds `s`, else 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitialOperation {
    name: String,
    symbol: char,
}

impl InitialOperation {
    pub fn new(symbol: &str) -> Result<Self, BraspError> {
        let symbol = single_char(symbol).ok_or_else(|| {
            BraspError::validation(format!(
                "initial symbol must be a single character, got {:?}",
                symbol
            ))
        })?;
        Ok(Self { name: format!("Q_{}", symbol), symbol })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> char {
        self.symbol
    }
}

// ============================================================================
// BOOLEAN
// ============================================================================

/// Pointwise expression over `i` and earlier operations read at `i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BooleanOperation {
    name: String,
    expression: Expression,
    #[serde(skip)]
    bound: Expr,
}

impl BooleanOperation {
    pub fn new(name: impl Into<String>, expression: &str) -> Result<Self, BraspError> {
        let name = name.into();
        let expression = checked_expression(&name, "boolean", expression, &[INDEX])?;
        let bound = qualify_calls(expression.ast());
        Ok(Self { name, expression, bound })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn functions(&self) -> &[String] {
        self.expression.functions()
    }

    /// Expression with call sites rewritten to scope identifiers.
    pub(crate) fn bound(&self) -> &Expr {
        &self.bound
    }
}

/// Parse `source` and check that every free variable is one of `allowed`
/// or a name the expression itself calls.
pub(crate) fn checked_expression(
    operation: &str,
    role: &str,
    source: &str,
    allowed: &[&str],
) -> Result<Expression, BraspError> {
    let expression = Expression::parse(source).map_err(|e| {
        BraspError::validation(format!(
            "`{}`: invalid {} expression `{}`: {}",
            operation, role, source, e
        ))
    })?;

    if let Some(variable) = expression.undeclared_variable(allowed) {
        return Err(BraspError::validation(format!(
            "`{}`: {} expression `{}` uses undeclared variable `{}`",
            operation, role, source, variable
        )));
    }

    Ok(expression)
}
