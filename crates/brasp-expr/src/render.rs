use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::value::Value;
use std::fmt;

const CONDITIONAL: u8 = 0;
const UNARY: u8 = 8;
const ATOM: u8 = 10;

/// Render an expression as infix text that parses back to the same tree.
pub fn render_expr(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, CONDITIONAL);
    out
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Literal(Value::Num(n)) if n.is_sign_negative() => UNARY,
        Expr::Literal(_) | Expr::Var(_) | Expr::Call { .. } => ATOM,
        Expr::Unary { .. } => UNARY,
        Expr::Binary { op, .. } => op.precedence(),
        Expr::Conditional { .. } => CONDITIONAL,
    }
}

fn write_expr(out: &mut String, expr: &Expr, min: u8) {
    let wrap = precedence(expr) < min;
    if wrap {
        out.push('(');
    }

    match expr {
        Expr::Literal(value) => out.push_str(&value.to_string()),
        Expr::Var(name) => out.push_str(name),
        Expr::Call { name, args } => {
            out.push_str(name);
            out.push('(');
            for (k, arg) in args.iter().enumerate() {
                if k > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg, CONDITIONAL);
            }
            out.push(')');
        }
        Expr::Unary { op, operand } => {
            out.push_str(match op {
                UnaryOp::Neg => "-",
                UnaryOp::Pos => "+",
                UnaryOp::Not => "not ",
            });
            write_expr(out, operand, UNARY);
        }
        Expr::Binary { op: BinaryOp::Pow, left, right } => {
            // base is a primary in the grammar; exponent is a unary
            write_expr(out, left, ATOM);
            out.push_str(" ^ ");
            write_expr(out, right, UNARY);
        }
        Expr::Binary { op, left, right } => {
            let p = op.precedence();
            write_expr(out, left, p);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            write_expr(out, right, p + 1);
        }
        Expr::Conditional { condition, then, otherwise } => {
            write_expr(out, condition, CONDITIONAL + 1);
            out.push_str(" ? ");
            write_expr(out, then, CONDITIONAL);
            out.push_str(" : ");
            write_expr(out, otherwise, CONDITIONAL);
        }
    }

    if wrap {
        out.push(')');
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&render_expr(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expr;

    fn canonical(src: &str) -> String {
        render_expr(&parse_expr(src).unwrap())
    }

    #[test]
    fn test_render_normalizes_spacing() {
        assert_eq!(canonical("i-j"), "i - j");
        assert_eq!(canonical("Q_a( j )"), "Q_a(j)");
        assert_eq!(canonical("not(i<j)"), "not (i < j)");
    }

    #[test]
    fn test_render_keeps_needed_parentheses_only() {
        assert_eq!(canonical("(i - j) - 1"), "i - j - 1");
        assert_eq!(canonical("i - (j - 1)"), "i - (j - 1)");
        assert_eq!(canonical("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(canonical("(-2) ^ 2"), "(-2) ^ 2");
        assert_eq!(canonical("2 ^ 3 ^ 2"), "2 ^ 3 ^ 2");
    }

    #[test]
    fn test_render_parses_back() {
        for src in ["(j < i) ? +(f(j)) : 0", "a or b and not c", "-(i + 1) % 3", "x ? y ? 1 : 2 : 3"] {
            let expr = parse_expr(src).unwrap();
            assert_eq!(parse_expr(&render_expr(&expr)).unwrap(), expr, "render of {}", src);
        }
    }

    #[test]
    fn test_negative_literal_is_wrapped_as_base() {
        let expr = Expr::binary(BinaryOp::Pow, Expr::num(-1.0), Expr::num(2.0));
        assert_eq!(render_expr(&expr), "(-1) ^ 2");
    }
}
