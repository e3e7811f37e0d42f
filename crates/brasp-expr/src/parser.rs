use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::value::Value;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "expr.pest"]
struct ExprParser;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("invalid number literal `{0}`")]
    InvalidNumber(String),
    #[error("unexpected parse tree near `{0}`")]
    Malformed(String),
}

/// Parse an expression string into its syntax tree.
pub fn parse_expr(input: &str) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut pairs = ExprParser::parse(Rule::expression, input)
        .map_err(|e| ParseError::Syntax(e.to_string()))?;
    let expression = next(&mut pairs, input)?;
    let mut inner = expression.into_inner();
    build(next(&mut inner, input)?)
}

fn next<'i>(pairs: &mut Pairs<'i, Rule>, context: &str) -> Result<Pair<'i, Rule>, ParseError> {
    pairs
        .next()
        .ok_or_else(|| ParseError::Malformed(context.to_string()))
}

fn build(pair: Pair<Rule>) -> Result<Expr, ParseError> {
    let text = pair.as_str();
    match pair.as_rule() {
        Rule::conditional => {
            let mut inner = pair.into_inner();
            let condition = build(next(&mut inner, text)?)?;
            match inner.next() {
                None => Ok(condition),
                Some(then) => {
                    let then = build(then)?;
                    let otherwise = build(next(&mut inner, text)?)?;
                    Ok(Expr::conditional(condition, then, otherwise))
                }
            }
        }
        Rule::disjunction
        | Rule::exclusive
        | Rule::conjunction
        | Rule::equality
        | Rule::comparison
        | Rule::additive
        | Rule::multiplicative => {
            let mut inner = pair.into_inner();
            let mut left = build(next(&mut inner, text)?)?;
            while let Some(op) = inner.next() {
                let op = BinaryOp::from_symbol(op.as_str())
                    .ok_or_else(|| ParseError::Malformed(op.as_str().to_string()))?;
                let right = build(next(&mut inner, text)?)?;
                left = Expr::binary(op, left, right);
            }
            Ok(left)
        }
        Rule::unary => {
            let mut parts: Vec<Pair<Rule>> = pair.into_inner().collect();
            let operand = parts
                .pop()
                .ok_or_else(|| ParseError::Malformed(text.to_string()))?;
            let mut expr = build(operand)?;
            for prefix in parts.into_iter().rev() {
                let op = match prefix.as_rule() {
                    Rule::neg => UnaryOp::Neg,
                    Rule::pos => UnaryOp::Pos,
                    Rule::not_op => UnaryOp::Not,
                    _ => return Err(ParseError::Malformed(prefix.as_str().to_string())),
                };
                expr = Expr::unary(op, expr);
            }
            Ok(expr)
        }
        Rule::power => {
            let mut inner = pair.into_inner();
            let base = build(next(&mut inner, text)?)?;
            match inner.next() {
                None => Ok(base),
                Some(_pow_op) => {
                    let exponent = build(next(&mut inner, text)?)?;
                    Ok(Expr::binary(BinaryOp::Pow, base, exponent))
                }
            }
        }
        Rule::call => {
            let mut inner = pair.into_inner();
            let name = next(&mut inner, text)?.as_str().to_string();
            let args = inner.map(build).collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::Call { name, args })
        }
        Rule::identifier => Ok(Expr::Var(text.to_string())),
        Rule::boolean => Ok(Expr::Literal(Value::Bool(text == "true"))),
        Rule::number => text
            .parse::<f64>()
            .map(Expr::num)
            .map_err(|_| ParseError::InvalidNumber(text.to_string())),
        _ => Err(ParseError::Malformed(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expr {
        Expr::var(name)
    }

    #[test]
    fn test_precedence_of_arithmetic() {
        let expr = parse_expr("1 + 2 * i").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Add,
                Expr::num(1.0),
                Expr::binary(BinaryOp::Mul, Expr::num(2.0), var("i"))
            )
        );
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let expr = parse_expr("i - j - 1").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, var("i"), var("j")),
                Expr::num(1.0)
            )
        );
    }

    #[test]
    fn test_power_is_right_associative_and_binds_tighter_than_negation() {
        let expr = parse_expr("-2 ^ 3 ^ 2").unwrap();
        assert_eq!(
            expr,
            Expr::unary(
                UnaryOp::Neg,
                Expr::binary(
                    BinaryOp::Pow,
                    Expr::num(2.0),
                    Expr::binary(BinaryOp::Pow, Expr::num(3.0), Expr::num(2.0))
                )
            )
        );
    }

    #[test]
    fn test_masks_parse_as_comparisons() {
        assert_eq!(parse_expr("j<i").unwrap(), Expr::binary(BinaryOp::Lt, var("j"), var("i")));
        assert_eq!(parse_expr("i<=j").unwrap(), Expr::binary(BinaryOp::Le, var("i"), var("j")));
        assert_eq!(parse_expr("1").unwrap(), Expr::num(1.0));
    }

    #[test]
    fn test_call_with_whitespace() {
        let expr = parse_expr("Q_a ( j )").unwrap();
        assert_eq!(expr, Expr::Call { name: "Q_a".to_string(), args: vec![var("j")] });
    }

    #[test]
    fn test_keywords_and_identifiers() {
        let expr = parse_expr("not android or xor_flag").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Or,
                Expr::unary(UnaryOp::Not, var("android")),
                var("xor_flag")
            )
        );
    }

    #[test]
    fn test_conditional() {
        let expr = parse_expr("j < i ? 1 : 0").unwrap();
        assert_eq!(
            expr,
            Expr::conditional(
                Expr::binary(BinaryOp::Lt, var("j"), var("i")),
                Expr::num(1.0),
                Expr::num(0.0)
            )
        );
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert_eq!(parse_expr("   "), Err(ParseError::Empty));
        assert!(matches!(parse_expr("1 +"), Err(ParseError::Syntax(_))));
        assert!(matches!(parse_expr("f(i"), Err(ParseError::Syntax(_))));
        assert!(matches!(parse_expr("i j"), Err(ParseError::Syntax(_))));
    }
}
