//! Call-site normalization and per-position bindings.
//!
//! Operation bodies refer to earlier operations with call syntax: `f(i)` is
//! the value of `f` at the output position, `f(j)` its value at the
//! candidate partner position. Before evaluation those call nodes are
//! rewritten into identifiers (`f@i`, `f@j`) that a `PositionScope`
//! resolves against the traces computed so far.
use brasp_expr::{Expr, Scope, Value};

/// Output position variable.
pub const INDEX: &str = "i";
/// Candidate partner position variable (attention only).
pub const PARTNER: &str = "j";

/// Scope identifier for `function` read at the position bound to `index`.
pub(crate) fn qualified(function: &str, index: &str) -> String {
    format!("{}@{}", function, index)
}

/// `f(i)` becomes `f@i` and `f(j)` becomes `f@j`. Calls with any other
/// argument are left alone and fail at evaluation time.
pub(crate) fn qualify_calls(expr: &Expr) -> Expr {
    expr.substitute_calls(&|name: &str, args: &[Expr]| match args {
        [Expr::Var(v)] if v == INDEX || v == PARTNER => Some(Expr::var(qualified(name, v))),
        _ => None,
    })
}

/// A referenced function and its trace.
pub(crate) type Binding<'t> = (&'t str, &'t [Value]);

/// Identifier lookup for one output position `i` and, when attending,
/// one partner position `j`.
pub(crate) struct PositionScope<'a, 't> {
    i: usize,
    j: Option<usize>,
    bindings: &'a [Binding<'t>],
    bare_names: bool,
}

impl<'a, 't> PositionScope<'a, 't> {
    pub(crate) fn point(i: usize, bindings: &'a [Binding<'t>]) -> Self {
        Self { i, j: None, bindings, bare_names: false }
    }

    pub(crate) fn pair(i: usize, j: usize, bindings: &'a [Binding<'t>]) -> Self {
        Self { i, j: Some(j), bindings, bare_names: false }
    }

    /// Also resolve a bare function name to its value at `i`. Only Boolean
    /// operations read their inputs this way.
    pub(crate) fn with_bare_names(mut self) -> Self {
        self.bare_names = true;
        self
    }

    fn trace_value(&self, function: &str, position: usize) -> Option<Value> {
        self.bindings
            .iter()
            .find(|(name, _)| *name == function)
            .and_then(|(_, trace)| trace.get(position).copied())
    }
}

impl Scope for PositionScope<'_, '_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        if name == INDEX {
            return Some(Value::from(self.i));
        }
        if name == PARTNER {
            return self.j.map(Value::from);
        }
        match name.rsplit_once('@') {
            Some((function, INDEX)) => self.trace_value(function, self.i),
            Some((function, PARTNER)) => self.trace_value(function, self.j?),
            Some(_) => None,
            None if self.bare_names => self.trace_value(name, self.i),
            None => None,
        }
    }
}
