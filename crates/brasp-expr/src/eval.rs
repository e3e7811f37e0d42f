//! Expression evaluation against a name lookup
use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use thiserror::Error;

/// Resolves free identifiers during evaluation.
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<Value>;
}

impl<S: BuildHasher> Scope for HashMap<String, Value, S> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).copied()
    }
}

impl Scope for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("undefined symbol `{0}`")]
    UnboundName(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic domain error in `{0}`")]
    Domain(String),
    #[error("call to `{0}` was not bound to a position")]
    UnresolvedCall(String),
}

/// Evaluate `expr`, resolving identifiers through `scope`.
pub fn evaluate<S: Scope + ?Sized>(expr: &Expr, scope: &S) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(*value),
        Expr::Var(name) => scope
            .lookup(name)
            .ok_or_else(|| EvalError::UnboundName(name.clone())),
        Expr::Call { name, .. } => Err(EvalError::UnresolvedCall(name.clone())),
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, scope)?;
            Ok(match op {
                UnaryOp::Neg => Value::Num(-value.as_f64()),
                UnaryOp::Pos => Value::Num(value.as_f64()),
                UnaryOp::Not => Value::Bool(!value.is_truthy()),
            })
        }
        Expr::Binary { op, left, right } => match op {
            // Connectives short-circuit; everything else is strict.
            BinaryOp::And => {
                let left = evaluate(left, scope)?;
                if !left.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(evaluate(right, scope)?.is_truthy()))
            }
            BinaryOp::Or => {
                let left = evaluate(left, scope)?;
                if left.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(evaluate(right, scope)?.is_truthy()))
            }
            _ => {
                let left = evaluate(left, scope)?;
                let right = evaluate(right, scope)?;
                apply(*op, left, right)
            }
        },
        Expr::Conditional { condition, then, otherwise } => {
            if evaluate(condition, scope)?.is_truthy() {
                evaluate(then, scope)
            } else {
                evaluate(otherwise, scope)
            }
        }
    }
}

fn apply(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    let (a, b) = (left.as_f64(), right.as_f64());
    let result = match op {
        BinaryOp::Xor => return Ok(Value::Bool(left.is_truthy() != right.is_truthy())),
        BinaryOp::And => return Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => return Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        BinaryOp::Eq => return Ok(Value::Bool(a == b)),
        BinaryOp::Ne => return Ok(Value::Bool(a != b)),
        BinaryOp::Lt => return Ok(Value::Bool(a < b)),
        BinaryOp::Le => return Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => return Ok(Value::Bool(a > b)),
        BinaryOp::Ge => return Ok(Value::Bool(a >= b)),
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            a / b
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            // floored modulo: the result takes the sign of the divisor
            a - b * (a / b).floor()
        }
        BinaryOp::Pow => a.powf(b),
    };

    if result.is_nan() {
        return Err(EvalError::Domain(format!("{} {} {}", a, op.symbol(), b)));
    }
    Ok(Value::Num(result))
}
