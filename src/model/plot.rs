//! Function plots driven by parameters.
//!
//! A plot is built from expression strings whose free names are either the
//! plot variable (`x`, `t`, or `x`/`y`) or bound parameters. The parameter
//! values are substituted when the plot is compiled, and the plot compiles
//! itself again whenever a bound parameter changes.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{DVec2, dvec2};

use super::geometry::{point_along_open, push_unique};
use super::observable::{Derived, Emitter, Observable};
use super::parameter::Parameter;
use crate::algebra::{self, Compiled};
use crate::ast::Expr;
use crate::config::ModelConfig;
use crate::errors::{EvalError, ModelError};
use crate::log::{debug, warn};
use crate::parse::{parse_equation, parse_expression};
use crate::types::finite;

/// What a plot is built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotSource<'a> {
    /// `y = f(x)` over `x_range`
    Explicit { expr: &'a str, x_range: (f64, f64) },
    /// `(x(t), y(t))` over `t_range`
    Parametric {
        x: &'a str,
        y: &'a str,
        t_range: (f64, f64),
    },
    /// `F(x, y) = 0` inside a box
    Implicit {
        equation: &'a str,
        x_range: (f64, f64),
        y_range: (f64, f64),
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Explicit,
    Parametric,
    Implicit,
}

impl PlotKind {
    fn variables(self) -> &'static [&'static str] {
        match self {
            PlotKind::Explicit => &["x"],
            PlotKind::Parametric => &["t"],
            PlotKind::Implicit => &["x", "y"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PlotKind::Explicit => "explicit",
            PlotKind::Parametric => "parametric",
            PlotKind::Implicit => "implicit",
        }
    }
}

#[derive(Debug)]
pub struct Plot {
    emitter: Emitter,
    kind: PlotKind,
    exprs: Vec<Expr>,
    bindings: Vec<(String, Rc<Parameter>)>,
    compiled: RefCell<Vec<Compiled>>,
    range: (f64, f64),
    y_range: Option<(f64, f64)>,
    cfg: ModelConfig,
}

impl Observable for Plot {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }
}

impl Plot {
    pub fn new(
        source: PlotSource<'_>,
        bindings: &[(&str, &Rc<Parameter>)],
    ) -> Result<Rc<Plot>, ModelError> {
        Self::with_config(source, bindings, ModelConfig::global())
    }

    /// `y = expr` for x in `x_range`.
    pub fn explicit(
        expr: &str,
        x_range: (f64, f64),
        bindings: &[(&str, &Rc<Parameter>)],
    ) -> Result<Rc<Plot>, ModelError> {
        Self::new(PlotSource::Explicit { expr, x_range }, bindings)
    }

    /// `(x(t), y(t))` for t in `t_range`.
    pub fn parametric(
        x: &str,
        y: &str,
        t_range: (f64, f64),
        bindings: &[(&str, &Rc<Parameter>)],
    ) -> Result<Rc<Plot>, ModelError> {
        Self::new(PlotSource::Parametric { x, y, t_range }, bindings)
    }

    /// The zero set of `lhs - rhs` inside the given box.
    pub fn implicit(
        equation: &str,
        x_range: (f64, f64),
        y_range: (f64, f64),
        bindings: &[(&str, &Rc<Parameter>)],
    ) -> Result<Rc<Plot>, ModelError> {
        Self::new(
            PlotSource::Implicit {
                equation,
                x_range,
                y_range,
            },
            bindings,
        )
    }

    /// Parse and compile eagerly; an unknown name is an error here, not on
    /// the first recompute.
    pub fn with_config(
        source: PlotSource<'_>,
        bindings: &[(&str, &Rc<Parameter>)],
        cfg: ModelConfig,
    ) -> Result<Rc<Plot>, ModelError> {
        let (kind, exprs, range, y_range) = match source {
            PlotSource::Explicit { expr, x_range } => {
                (PlotKind::Explicit, vec![parse_expression(expr)?], x_range, None)
            }
            PlotSource::Parametric { x, y, t_range } => (
                PlotKind::Parametric,
                vec![parse_expression(x)?, parse_expression(y)?],
                t_range,
                None,
            ),
            PlotSource::Implicit {
                equation,
                x_range,
                y_range,
            } => (
                PlotKind::Implicit,
                vec![parse_equation(equation)?.normalized()],
                x_range,
                Some(y_range),
            ),
        };
        for (lo, hi) in std::iter::once(range).chain(y_range) {
            finite(lo)?;
            finite(hi)?;
        }

        let bindings: Vec<(String, Rc<Parameter>)> = bindings
            .iter()
            .map(|(name, p)| (name.to_string(), Rc::clone(p)))
            .collect();
        let compiled = compile_all(kind, &exprs, &bindings)?;

        let plot = Rc::new(Plot {
            emitter: Emitter::new(),
            kind,
            exprs,
            bindings,
            compiled: RefCell::new(compiled),
            range,
            y_range,
            cfg,
        });
        let params: Vec<Rc<Parameter>> = plot.bindings.iter().map(|(_, p)| Rc::clone(p)).collect();
        Ok(params
            .iter()
            .fold(Derived::new(plot), |d, p| d.on(p))
            .build(|plot| plot.relambdify()))
    }

    fn relambdify(&self) {
        match compile_all(self.kind, &self.exprs, &self.bindings) {
            Ok(compiled) => {
                *self.compiled.borrow_mut() = compiled;
                debug!(kind = self.kind.name(), "plot recompiled");
            }
            Err(err) => warn!(%err, "plot recompile failed, keeping previous function"),
        }
    }

    pub fn kind(&self) -> PlotKind {
        self.kind
    }

    /// Domain of the plot variable (x for explicit and implicit, t for parametric).
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn y_range(&self) -> Option<(f64, f64)> {
        self.y_range
    }

    pub fn config(&self) -> &ModelConfig {
        &self.cfg
    }

    /// Names of the bound parameters, in binding order
    pub fn parameter_names(&self) -> Vec<&str> {
        self.bindings.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// The curve point at plot variable `t`.
    pub fn eval(&self, t: f64) -> Result<DVec2, ModelError> {
        let compiled = self.compiled.borrow();
        match (self.kind, compiled.as_slice()) {
            (PlotKind::Explicit, [f]) => Ok(dvec2(t, f.eval(&[t])?)),
            (PlotKind::Parametric, [x, y]) => Ok(dvec2(x.eval(&[t])?, y.eval(&[t])?)),
            _ => Err(ModelError::UnsupportedTrack {
                reason: "an implicit plot has no parameterisation",
            }),
        }
    }

    /// `F(x, y)` of an implicit plot.
    pub fn eval_implicit(&self, x: f64, y: f64) -> Result<f64, ModelError> {
        let compiled = self.compiled.borrow();
        match (self.kind, compiled.as_slice()) {
            (PlotKind::Implicit, [f]) => Ok(f.eval(&[x, y])?),
            _ => Err(ModelError::UnsupportedTrack {
                reason: "only implicit plots define F(x, y)",
            }),
        }
    }

    /// `n` evenly spaced curve points; points that fail to evaluate are
    /// skipped. Implicit plots return their zero set instead.
    pub fn sample(&self, n: usize) -> Vec<DVec2> {
        if self.kind == PlotKind::Implicit {
            return self.sample_zero_set(n);
        }
        let n = n.max(2);
        let (lo, hi) = self.range;
        (0..n)
            .filter_map(|i| {
                let t = lo + (hi - lo) * i as f64 / (n - 1) as f64;
                self.eval(t).ok()
            })
            .collect()
    }

    /// Points where `F` changes sign along the edges of an `n` by `n` grid,
    /// located by linear interpolation. Empty for non-implicit plots.
    pub fn sample_zero_set(&self, n: usize) -> Vec<DVec2> {
        let Some((y_lo, y_hi)) = self.y_range else {
            return Vec::new();
        };
        let (x_lo, x_hi) = self.range;
        let n = n.max(1);
        let xs: Vec<f64> = (0..=n).map(|i| x_lo + (x_hi - x_lo) * i as f64 / n as f64).collect();
        let ys: Vec<f64> = (0..=n).map(|j| y_lo + (y_hi - y_lo) * j as f64 / n as f64).collect();
        let grid: Vec<Vec<Option<f64>>> = ys
            .iter()
            .map(|&y| xs.iter().map(|&x| self.eval_implicit(x, y).ok()).collect())
            .collect();

        let mut out = Vec::new();
        let mut edge = |p: DVec2, fp: Option<f64>, q: DVec2, fq: Option<f64>| {
            let (Some(fp), Some(fq)) = (fp, fq) else {
                return;
            };
            if fp == 0.0 {
                push_unique(&mut out, p, self.cfg.merge_eps);
            } else if fq != 0.0 && fp.signum() != fq.signum() {
                push_unique(&mut out, p.lerp(q, fp / (fp - fq)), self.cfg.merge_eps);
            }
        };
        for j in 0..=n {
            for i in 0..=n {
                let p = dvec2(xs[i], ys[j]);
                if i < n {
                    edge(p, grid[j][i], dvec2(xs[i + 1], ys[j]), grid[j][i + 1]);
                }
                if j < n {
                    edge(p, grid[j][i], dvec2(xs[i], ys[j + 1]), grid[j + 1][i]);
                }
            }
        }
        out
    }

    /// The curve point `ratio` of the way along its arc length, measured on
    /// `plot_samples` samples. `None` for implicit plots.
    pub fn point_at_ratio(&self, ratio: f64) -> Option<DVec2> {
        if self.kind == PlotKind::Implicit {
            return None;
        }
        point_along_open(&self.sample(self.cfg.plot_samples), ratio)
    }
}

fn compile_all(
    kind: PlotKind,
    exprs: &[Expr],
    bindings: &[(String, Rc<Parameter>)],
) -> Result<Vec<Compiled>, EvalError> {
    let values: Vec<(&str, f64)> = bindings.iter().map(|(n, p)| (n.as_str(), p.value())).collect();
    exprs
        .iter()
        .map(|e| algebra::compile(e, kind.variables(), &values))
        .collect()
}
