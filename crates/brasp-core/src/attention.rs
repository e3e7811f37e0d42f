//! Attention operations: tie-break policy, mask and the three expressions
use crate::error::BraspError;
use crate::operation::checked_expression;
use crate::scope::{qualify_calls, INDEX, PARTNER};
use brasp_expr::{BinaryOp, Expr, Expression, UnaryOp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which partner to pick when several positions score exactly 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    Leftmost,
    Rightmost,
}

impl TieBreak {
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreak::Leftmost => "leftmost",
            TieBreak::Rightmost => "rightmost",
        }
    }

    /// Index of the chosen entry among those equal to exactly 1.
    pub fn select(&self, scores: &[f64]) -> Option<usize> {
        match self {
            TieBreak::Leftmost => scores.iter().position(|s| *s == 1.0),
            TieBreak::Rightmost => scores.iter().rposition(|s| *s == 1.0),
        }
    }
}

impl FromStr for TieBreak {
    type Err = BraspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leftmost" => Ok(TieBreak::Leftmost),
            "rightmost" => Ok(TieBreak::Rightmost),
            other => Err(BraspError::validation(format!(
                "invalid tie `{}`, expected `leftmost` or `rightmost`",
                other
            ))),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hard filter over (i, j) pairs. Only these five literal forms exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mask {
    #[serde(rename = "j<i")]
    Before,
    #[serde(rename = "i<j")]
    After,
    #[serde(rename = "j<=i")]
    AtOrBefore,
    #[serde(rename = "i<=j")]
    AtOrAfter,
    #[serde(rename = "1")]
    Unmasked,
}

impl Mask {
    pub const ALL: [Mask; 5] = [
        Mask::Before,
        Mask::After,
        Mask::AtOrBefore,
        Mask::AtOrAfter,
        Mask::Unmasked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mask::Before => "j<i",
            Mask::After => "i<j",
            Mask::AtOrBefore => "j<=i",
            Mask::AtOrAfter => "i<=j",
            Mask::Unmasked => "1",
        }
    }

    pub fn to_expr(&self) -> Expr {
        let (i, j) = (Expr::var(INDEX), Expr::var(PARTNER));
        match self {
            Mask::Before => Expr::binary(BinaryOp::Lt, j, i),
            Mask::After => Expr::binary(BinaryOp::Lt, i, j),
            Mask::AtOrBefore => Expr::binary(BinaryOp::Le, j, i),
            Mask::AtOrAfter => Expr::binary(BinaryOp::Le, i, j),
            Mask::Unmasked => Expr::num(1.0),
        }
    }

    /// Whether partner `j` is visible from output position `i`.
    pub fn admits(&self, i: usize, j: usize) -> bool {
        match self {
            Mask::Before => j < i,
            Mask::After => i < j,
            Mask::AtOrBefore => j <= i,
            Mask::AtOrAfter => i <= j,
            Mask::Unmasked => true,
        }
    }
}

impl FromStr for Mask {
    type Err = BraspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mask::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                BraspError::validation(format!(
                    "invalid mask `{}`, expected one of `j<i`, `i<j`, `j<=i`, `i<=j`, `1`",
                    s
                ))
            })
    }
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `tie [mask, score] value : default`
///
/// For each output position `i`, every partner `j` is scored with the
/// score expression under the mask; the value expression is read at the
/// selected partner, or the default expression at `i` when nothing scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttentionOperation {
    name: String,
    tie: TieBreak,
    mask: Mask,
    score: Expression,
    value: Expression,
    default: Expression,
    functions: Vec<String>,
    #[serde(skip)]
    compiled: CompiledAttention,
}

/// Expressions with call sites bound and the mask folded into the score.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompiledAttention {
    /// `mask ? +(score) : 0`
    pub(crate) score: Expr,
    pub(crate) value: Expr,
    pub(crate) default: Expr,
}

impl AttentionOperation {
    pub fn new(
        name: impl Into<String>,
        tie: &str,
        mask: &str,
        score: &str,
        value: &str,
        default: &str,
    ) -> Result<Self, BraspError> {
        let name = name.into();
        let tie: TieBreak = tie.parse()?;
        let mask: Mask = mask.parse()?;
        let score = checked_expression(&name, "score", score, &[INDEX, PARTNER])?;
        let value = checked_expression(&name, "value", value, &[INDEX, PARTNER])?;
        let default = checked_expression(&name, "default", default, &[INDEX])?;

        let mut functions: Vec<String> = Vec::new();
        for f in score
            .functions()
            .iter()
            .chain(value.functions())
            .chain(default.functions())
        {
            if !functions.contains(f) {
                functions.push(f.clone());
            }
        }

        let compiled = CompiledAttention {
            score: Expr::conditional(
                mask.to_expr(),
                Expr::unary(UnaryOp::Pos, qualify_calls(score.ast())),
                Expr::num(0.0),
            ),
            value: qualify_calls(value.ast()),
            default: qualify_calls(default.ast()),
        };

        Ok(Self { name, tie, mask, score, value, default, functions, compiled })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tie(&self) -> TieBreak {
        self.tie
    }

    pub fn mask(&self) -> Mask {
        self.mask
    }

    pub fn score(&self) -> &Expression {
        &self.score
    }

    pub fn value(&self) -> &Expression {
        &self.value
    }

    pub fn default_expression(&self) -> &Expression {
        &self.default
    }

    /// Union of the names called by all three expressions.
    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    pub fn body(&self) -> String {
        format!(
            "{} [{}, {}] {} : {}",
            self.tie,
            self.mask,
            self.score.source(),
            self.value.source(),
            self.default.source()
        )
    }

    pub(crate) fn compiled(&self) -> &CompiledAttention {
        &self.compiled
    }
}
