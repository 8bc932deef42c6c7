//! Evaluation and coefficient extraction for parsed expressions.
//!
//! Identifiers resolve in this order: declared variables, bound values,
//! named constants (`pi`, `e`, `tau`). An identifier that resolves to nothing
//! is read as a product of single letters, so `xy` means `x * y` and `2ab`
//! means `2 * a * b`.
//!
//! - [`compile`] substitutes bound values and produces a [`Compiled`]
//!   function of the declared variables.
//! - [`line_coefficients`] and [`circle_parameters`] expand an equation into
//!   a polynomial in x and y and recognise the shape.

use std::collections::BTreeMap;

use crate::ast::{self, BinaryOp, Expr, Function, UnaryOp};
use crate::errors::{EvalError, ParseError, SourceContext};
use crate::parse::parse_equation;

enum Symbol {
    Var(usize),
    Const(f64),
}

fn resolve_one(name: &str, variables: &[&str], bindings: &[(&str, f64)]) -> Option<Symbol> {
    if let Some(i) = variables.iter().position(|v| *v == name) {
        return Some(Symbol::Var(i));
    }
    if let Some((_, v)) = bindings.iter().find(|(n, _)| *n == name) {
        return Some(Symbol::Const(*v));
    }
    ast::constant(name).map(Symbol::Const)
}

/// Resolve an identifier to a product of symbols.
fn resolve(name: &str, variables: &[&str], bindings: &[(&str, f64)]) -> Option<Vec<Symbol>> {
    if let Some(s) = resolve_one(name, variables, bindings) {
        return Some(vec![s]);
    }
    if name.chars().count() < 2 {
        return None;
    }
    name.char_indices()
        .map(|(i, c)| resolve_one(&name[i..i + c.len_utf8()], variables, bindings))
        .collect()
}

// ============================================================================
// Compiled functions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Const(f64),
    Var(usize),
    Neg(Box<Node>),
    Binary(Box<Node>, BinaryOp, Box<Node>),
    Call(Function, Box<Node>),
}

/// An expression with bound values substituted, callable on its variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    root: Node,
    arity: usize,
}

/// Turn `expr` into a function of `variables`, substituting `bindings`.
pub fn compile(
    expr: &Expr,
    variables: &[&str],
    bindings: &[(&str, f64)],
) -> Result<Compiled, EvalError> {
    Ok(Compiled {
        root: lower(expr, variables, bindings)?,
        arity: variables.len(),
    })
}

fn lower(expr: &Expr, variables: &[&str], bindings: &[(&str, f64)]) -> Result<Node, EvalError> {
    Ok(match expr {
        Expr::Number(v) => Node::Const(*v),
        Expr::Variable(name) => {
            let symbols = resolve(name, variables, bindings)
                .ok_or_else(|| EvalError::UnboundVariable { name: name.clone() })?;
            symbols
                .into_iter()
                .map(|s| match s {
                    Symbol::Var(i) => Node::Var(i),
                    Symbol::Const(v) => Node::Const(v),
                })
                .reduce(|a, b| Node::Binary(Box::new(a), BinaryOp::Mul, Box::new(b)))
                .unwrap_or(Node::Const(1.0))
        }
        Expr::FuncCall(call) => {
            Node::Call(call.func, Box::new(lower(&call.arg, variables, bindings)?))
        }
        Expr::BinaryOp(l, op, r) => Node::Binary(
            Box::new(lower(l, variables, bindings)?),
            *op,
            Box::new(lower(r, variables, bindings)?),
        ),
        Expr::UnaryOp(UnaryOp::Neg, e) => Node::Neg(Box::new(lower(e, variables, bindings)?)),
    })
}

impl Compiled {
    /// Number of variables the function expects
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Evaluate with `args` in declaration order. Missing arguments are zero.
    pub fn eval(&self, args: &[f64]) -> Result<f64, EvalError> {
        let v = eval_node(&self.root, args)?;
        if v.is_finite() { Ok(v) } else { Err(EvalError::NonFinite) }
    }
}

fn eval_node(node: &Node, args: &[f64]) -> Result<f64, EvalError> {
    Ok(match node {
        Node::Const(v) => *v,
        Node::Var(i) => args.get(*i).copied().unwrap_or(0.0),
        Node::Neg(e) => -eval_node(e, args)?,
        Node::Call(f, e) => f.apply(eval_node(e, args)?)?,
        Node::Binary(l, op, r) => {
            let (a, b) = (eval_node(l, args)?, eval_node(r, args)?);
            match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div if b == 0.0 => return Err(EvalError::DivisionByZero),
                BinaryOp::Div => a / b,
                BinaryOp::Pow => a.powf(b),
            }
        }
    })
}

// ============================================================================
// Polynomials in x and y
// ============================================================================

/// Sparse polynomial keyed by `(power of x, power of y)`.
#[derive(Debug, Clone, Default, PartialEq)]
struct Poly(BTreeMap<(u32, u32), f64>);

const MAX_POWER: f64 = 16.0;

impl Poly {
    fn constant(c: f64) -> Self {
        Poly(BTreeMap::from([((0, 0), c)]))
    }

    fn monomial(i: u32, j: u32) -> Self {
        Poly(BTreeMap::from([((i, j), 1.0)]))
    }

    fn coeff(&self, i: u32, j: u32) -> f64 {
        self.0.get(&(i, j)).copied().unwrap_or(0.0)
    }

    fn combine(&self, other: &Poly, sign: f64) -> Poly {
        let mut out = self.0.clone();
        for (k, c) in &other.0 {
            *out.entry(*k).or_insert(0.0) += sign * c;
        }
        Poly(out)
    }

    fn scale(&self, s: f64) -> Poly {
        Poly(self.0.iter().map(|(k, c)| (*k, c * s)).collect())
    }

    fn mul(&self, other: &Poly) -> Poly {
        let mut out = BTreeMap::new();
        for ((i1, j1), c1) in &self.0 {
            for ((i2, j2), c2) in &other.0 {
                *out.entry((i1 + i2, j1 + j2)).or_insert(0.0) += c1 * c2;
            }
        }
        Poly(out)
    }

    /// Terms whose coefficient is not negligible against the largest one.
    fn terms(&self) -> impl Iterator<Item = ((u32, u32), f64)> + '_ {
        let scale = self.0.values().fold(1.0_f64, |m, c| m.max(c.abs()));
        self.0
            .iter()
            .filter(move |(_, c)| c.abs() > 1e-12 * scale)
            .map(|(k, c)| (*k, *c))
    }

    fn as_constant(&self) -> Option<f64> {
        if self.terms().all(|(k, _)| k == (0, 0)) {
            Some(self.coeff(0, 0))
        } else {
            None
        }
    }

    fn is_finite(&self) -> bool {
        self.0.values().all(|c| c.is_finite())
    }

    fn degree(&self) -> u32 {
        self.terms().map(|((i, j), _)| i + j).max().unwrap_or(0)
    }
}

fn poly(expr: &Expr) -> Result<Poly, String> {
    match expr {
        Expr::Number(v) => Ok(Poly::constant(*v)),
        Expr::Variable(name) => {
            let symbols = resolve(name, &["x", "y"], &[])
                .ok_or_else(|| format!("unknown symbol `{name}`"))?;
            Ok(symbols.into_iter().fold(Poly::constant(1.0), |acc, s| {
                acc.mul(&match s {
                    Symbol::Var(0) => Poly::monomial(1, 0),
                    Symbol::Var(_) => Poly::monomial(0, 1),
                    Symbol::Const(c) => Poly::constant(c),
                })
            }))
        }
        Expr::UnaryOp(UnaryOp::Neg, e) => Ok(poly(e)?.scale(-1.0)),
        Expr::FuncCall(call) => {
            let arg = poly(&call.arg)?
                .as_constant()
                .ok_or_else(|| format!("{} of an expression in x or y", call.func.name()))?;
            call.func
                .apply(arg)
                .map(Poly::constant)
                .map_err(|e| e.to_string())
        }
        Expr::BinaryOp(l, op, r) => {
            let (a, b) = (poly(l)?, poly(r)?);
            match op {
                BinaryOp::Add => Ok(a.combine(&b, 1.0)),
                BinaryOp::Sub => Ok(a.combine(&b, -1.0)),
                BinaryOp::Mul => Ok(a.mul(&b)),
                BinaryOp::Div => match b.as_constant() {
                    Some(d) if d == 0.0 => Err("division by zero".to_string()),
                    Some(d) => Ok(a.scale(1.0 / d)),
                    None => Err("division by an expression in x or y".to_string()),
                },
                BinaryOp::Pow => {
                    let n = b
                        .as_constant()
                        .ok_or_else(|| "exponent depends on x or y".to_string())?;
                    if let Some(base) = a.as_constant() {
                        let v = base.powf(n);
                        if !v.is_finite() {
                            return Err(format!("{base}^{n} is not a finite real number"));
                        }
                        return Ok(Poly::constant(v));
                    }
                    if n < 0.0 || n.fract() != 0.0 || n > MAX_POWER {
                        return Err(format!("exponent {n} is not a small non-negative integer"));
                    }
                    Ok((0..n as u32).fold(Poly::constant(1.0), |acc, _| acc.mul(&a)))
                }
            }
        }
    }
}

/// `lhs - rhs` of `src` as a polynomial in x and y.
fn equation_poly(src: &str) -> Result<(Poly, SourceContext), ParseError> {
    let eq = parse_equation(src)?;
    let ctx = SourceContext::new("<equation>", src);
    let not_polynomial = |reason: String| ParseError::NotPolynomial {
        reason,
        src: ctx.named_source(),
        span: ctx.full_span(),
    };
    let p = poly(&eq.normalized()).map_err(not_polynomial)?;
    if !p.is_finite() {
        return Err(not_polynomial("a coefficient is not a finite number".to_string()));
    }
    Ok((p, ctx))
}

/// `(A, B, C)` of a linear equation rearranged to `Ax + By + C = 0`.
///
/// With `solve_for_y` the equation must contain y (the `y = mx + c` form).
pub fn line_coefficients(src: &str, solve_for_y: bool) -> Result<(f64, f64, f64), ParseError> {
    let (p, ctx) = equation_poly(src)?;
    let not_linear = |reason: &str| ParseError::NotLinear {
        reason: reason.to_string(),
        src: ctx.named_source(),
        span: ctx.full_span(),
    };
    if p.degree() > 1 {
        return Err(not_linear("contains a term of degree two or more"));
    }
    let (a, b, c) = (p.coeff(1, 0), p.coeff(0, 1), p.coeff(0, 0));
    if p.terms().all(|(k, _)| k == (0, 0)) {
        return Err(not_linear("neither x nor y appears"));
    }
    if solve_for_y && !p.terms().any(|(k, _)| k == (0, 1)) {
        return Err(not_linear("cannot be solved for y"));
    }
    if ![a, b, c].iter().all(|v| v.is_finite()) {
        return Err(not_linear("a coefficient is not a finite number"));
    }
    Ok((a, b, c))
}

/// `(h, k, r)` of a circle equation `(x - h)^2 + (y - k)^2 = r^2`, given in
/// any expanded or scaled form.
pub fn circle_parameters(src: &str) -> Result<(f64, f64, f64), ParseError> {
    let (p, ctx) = equation_poly(src)?;
    let not_circle = |reason: &str| ParseError::NotCircle {
        reason: reason.to_string(),
        src: ctx.named_source(),
        span: ctx.full_span(),
    };
    if p.degree() != 2 {
        return Err(not_circle("not a second-degree equation"));
    }
    if p.terms().any(|(k, _)| k == (1, 1)) {
        return Err(not_circle("has an xy term"));
    }
    let (ax, ay) = (p.coeff(2, 0), p.coeff(0, 2));
    if ax == 0.0 || (ax - ay).abs() > 1e-9 * ax.abs() {
        return Err(not_circle("x^2 and y^2 must have equal coefficients"));
    }
    let (d, e, f) = (p.coeff(1, 0) / ax, p.coeff(0, 1) / ax, p.coeff(0, 0) / ax);
    let (h, k) = (-d / 2.0, -e / 2.0);
    let r2 = h * h + k * k - f;
    if ![h, k, r2].iter().all(|v| v.is_finite()) {
        return Err(not_circle("center or radius is not a finite number"));
    }
    if r2 <= 0.0 {
        return Err(not_circle("radius squared is not positive"));
    }
    Ok((h, k, r2.sqrt()))
}
