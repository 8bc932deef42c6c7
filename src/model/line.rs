//! Two-point lines.
//!
//! A `Line` tracks two points and caches its general form `Ax + By + C = 0`,
//! rebuilding it whenever an endpoint moves. The line is treated as infinite
//! for intersections, projections and reflections.

use std::cell::Cell;
use std::rc::Rc;

use glam::{DVec2, DVec3};

use super::geometry::{self, Line2};
use super::latex;
use super::observable::{Derived, Emitter, Observable};
use super::point::Point;
use crate::algebra;
use crate::config::ModelConfig;
use crate::errors::ModelError;
use crate::log::warn;
use crate::types::{PointLike, Value};

#[derive(Debug)]
pub struct Line {
    emitter: Emitter,
    start: Rc<Point>,
    end: Rc<Point>,
    coefficients: Cell<(f64, f64, f64)>,
    cfg: ModelConfig,
}

impl Observable for Line {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }
}

impl Line {
    /// A line through two points; moving either point updates the line.
    pub fn from_points(
        start: impl Into<PointLike>,
        end: impl Into<PointLike>,
    ) -> Result<Rc<Line>, ModelError> {
        Self::from_points_with_config(start, end, ModelConfig::global())
    }

    pub fn from_points_with_config(
        start: impl Into<PointLike>,
        end: impl Into<PointLike>,
        cfg: ModelConfig,
    ) -> Result<Rc<Line>, ModelError> {
        let start = start.into().into_point()?;
        let end = end.into().into_point()?;
        Ok(Self::between(start, end, cfg))
    }

    pub(crate) fn between(start: Rc<Point>, end: Rc<Point>, cfg: ModelConfig) -> Rc<Line> {
        let line = Rc::new(Line {
            emitter: Emitter::new(),
            start: Rc::clone(&start),
            end: Rc::clone(&end),
            coefficients: Cell::new((0.0, 0.0, 0.0)),
            cfg,
        });
        Derived::new(line)
            .on(&start)
            .on(&end)
            .build(|line| line.rebuild())
    }

    fn rebuild(&self) {
        self.coefficients.set(self.analytic().coefficients());
    }

    pub fn start(&self) -> &Rc<Point> {
        &self.start
    }

    pub fn end(&self) -> &Rc<Point> {
        &self.end
    }

    pub fn config(&self) -> &ModelConfig {
        &self.cfg
    }

    /// Snapshot of the current geometry.
    pub fn analytic(&self) -> Line2 {
        Line2::new(self.start.xy(), self.end.xy())
    }

    /// Cached `(A, B, C)` of `Ax + By + C = 0`.
    pub fn coefficients(&self) -> (f64, f64, f64) {
        self.coefficients.get()
    }

    pub fn is_degenerate(&self) -> bool {
        self.analytic().is_degenerate(self.cfg.eps)
    }

    pub fn direction(&self) -> DVec2 {
        self.analytic().dir()
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    pub fn midpoint(&self) -> DVec3 {
        (self.start.position() + self.end.position()) * 0.5
    }

    /// `start + t * (end - start)`
    pub fn point_at(&self, t: f64) -> DVec3 {
        self.start.position().lerp(self.end.position(), t)
    }

    fn is_vertical(&self) -> bool {
        let d = self.direction();
        d.x.abs() <= self.cfg.eps * d.length().max(1.0)
    }

    fn is_horizontal(&self) -> bool {
        let d = self.direction();
        d.y.abs() <= self.cfg.eps * d.length().max(1.0)
    }

    /// Slope; vertical lines report signed infinity.
    pub fn slope(&self) -> f64 {
        let d = self.direction();
        if self.is_vertical() {
            if d.y >= 0.0 {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            }
        } else {
            d.y / d.x
        }
    }

    /// Where the line crosses the y axis; `None` for vertical lines.
    pub fn y_intercept(&self) -> Option<f64> {
        if self.is_vertical() {
            return None;
        }
        let (_, b, c) = self.coefficients();
        Some(-c / b)
    }

    /// Where the line crosses the x axis; `None` for horizontal lines.
    pub fn x_intercept(&self) -> Option<f64> {
        if self.is_horizontal() {
            return None;
        }
        let (a, _, c) = self.coefficients();
        Some(-c / a)
    }

    /// Inclination against the positive x axis, in degrees within [0, 180).
    pub fn angle_of_inclination(&self) -> f64 {
        let d = self.direction();
        d.y.atan2(d.x).to_degrees().rem_euclid(180.0)
    }

    pub fn distance_to_point(&self, p: DVec2) -> Option<f64> {
        geometry::distance_to_line(self.analytic(), p, &self.cfg)
    }

    pub fn contains(&self, p: DVec2) -> bool {
        self.distance_to_point(p)
            .is_some_and(|d| d <= self.cfg.tangent_eps)
    }

    pub fn is_parallel(&self, other: &Line) -> bool {
        let (d1, d2) = (self.direction(), other.direction());
        geometry::cross(d1, d2).abs() <= self.cfg.eps * d1.length() * d2.length()
    }

    pub fn is_perpendicular(&self, other: &Line) -> bool {
        let (d1, d2) = (self.direction(), other.direction());
        d1.dot(d2).abs() <= self.cfg.eps * d1.length() * d2.length()
    }

    /// One-shot intersection of the infinite extensions.
    ///
    /// `None` for parallel or coincident lines. Not reactive: wrap the two
    /// lines in an `Intersection` to follow them.
    pub fn intersection(&self, other: &Line) -> Option<DVec3> {
        geometry::intersect_lines(self.analytic(), other.analytic(), &self.cfg)
            .map(|p| p.extend(0.0))
    }

    pub fn project(&self, p: DVec2) -> Option<DVec2> {
        geometry::project(self.analytic(), p, &self.cfg)
    }

    pub fn reflect(&self, p: DVec2) -> Option<DVec2> {
        geometry::reflect(self.analytic(), p, &self.cfg)
    }

    // ------------------------------------------------------------------
    // Reactive constructions
    // ------------------------------------------------------------------

    /// A line through `through` with this line's direction.
    pub fn parallel_line(
        self: &Rc<Self>,
        through: impl Into<PointLike>,
    ) -> Result<Rc<Line>, ModelError> {
        let through = through.into().into_point()?;
        let end = self.offset_point(&through, |d| d);
        Ok(Self::between(through, end, self.cfg))
    }

    /// A line through `through` at a right angle to this line.
    pub fn perpendicular_line(
        self: &Rc<Self>,
        through: impl Into<PointLike>,
    ) -> Result<Rc<Line>, ModelError> {
        let through = through.into().into_point()?;
        let end = self.offset_point(&through, DVec2::perp);
        Ok(Self::between(through, end, self.cfg))
    }

    /// `anchor + f(direction)`, following both the anchor and this line.
    fn offset_point(self: &Rc<Self>, anchor: &Rc<Point>, f: fn(DVec2) -> DVec2) -> Rc<Point> {
        let (line, anchor) = (Rc::clone(self), Rc::clone(anchor));
        Derived::new(Point::computed(anchor.position()))
            .on(&line)
            .on(&anchor)
            .build(move |p| p.store(anchor.position() + f(line.direction()).extend(0.0)))
    }

    /// The mirror image of `point` across this line.
    ///
    /// While the line is degenerate the point keeps its last position.
    pub fn reflect_over_line(self: &Rc<Self>, point: &Rc<Point>) -> Rc<Point> {
        self.follow_point(point, |line, p| line.reflect(p), "reflection")
    }

    /// The foot of the perpendicular from `point` onto this line.
    pub fn projection_on_line(self: &Rc<Self>, point: &Rc<Point>) -> Rc<Point> {
        self.follow_point(point, |line, p| line.project(p), "projection")
    }

    fn follow_point(
        self: &Rc<Self>,
        point: &Rc<Point>,
        f: fn(&Line, DVec2) -> Option<DVec2>,
        what: &'static str,
    ) -> Rc<Point> {
        let (line, point) = (Rc::clone(self), Rc::clone(point));
        Derived::new(Point::computed(point.position()))
            .on(&line)
            .on(&point)
            .build(move |p| match f(&line, point.xy()) {
                Some(q) => p.store(q.extend(point.z())),
                None => warn!(what, "degenerate line, keeping previous position"),
            })
    }

    /// `y = m x + c`, where either value may be a live parameter.
    pub fn from_slope_and_intercept(
        slope: impl Into<Value>,
        intercept: impl Into<Value>,
    ) -> Result<Rc<Line>, ModelError> {
        let (m, c) = (slope.into().checked()?, intercept.into().checked()?);
        let point_at = |x: f64| {
            let (m, c) = (m.clone(), c.clone());
            Derived::new(Point::computed(DVec3::ZERO))
                .on_value(&m)
                .on_value(&c)
                .build(move |p| p.store(DVec3::new(x, m.get() * x + c.get(), 0.0)))
        };
        Ok(Self::between(point_at(0.0), point_at(1.0), ModelConfig::global()))
    }

    /// Parse `Ax + By + C = 0` (any linear equation in x and y).
    pub fn from_general_equation(src: &str) -> Result<Rc<Line>, ModelError> {
        let (a, b, c) = algebra::line_coefficients(src, false)?;
        Self::from_coefficients(a, b, c)
    }

    /// Parse `y = m x + c`; the equation must be solvable for y.
    pub fn from_normal_equation(src: &str) -> Result<Rc<Line>, ModelError> {
        let (a, b, c) = algebra::line_coefficients(src, true)?;
        Self::from_coefficients(a, b, c)
    }

    fn from_coefficients(a: f64, b: f64, c: f64) -> Result<Rc<Line>, ModelError> {
        let (p, q) = if b.abs() > a.abs() * 1e-12 {
            (DVec3::new(0.0, -c / b, 0.0), DVec3::new(1.0, -(a + c) / b, 0.0))
        } else {
            let x = -c / a;
            (DVec3::new(x, 0.0, 0.0), DVec3::new(x, 1.0, 0.0))
        };
        Ok(Self::between(
            Point::try_at(p)?,
            Point::try_at(q)?,
            ModelConfig::global(),
        ))
    }

    // ------------------------------------------------------------------
    // Equation forms
    // ------------------------------------------------------------------

    fn prec(&self) -> usize {
        self.cfg.latex_precision
    }

    /// `y = mx + c`
    pub fn slope_intercept_latex(&self) -> String {
        let p = self.prec();
        if self.is_vertical() {
            return format!("x = {}", latex::num(self.start.x(), p));
        }
        let c = self.y_intercept().unwrap_or(0.0);
        format!(
            "y = {}",
            latex::linear_combination(&[(self.slope(), "x"), (c, "")], p)
        )
    }

    /// `y - y_1 = m(x - x_1)`
    pub fn point_slope_latex(&self) -> String {
        let p = self.prec();
        let (x1, y1) = (self.start.x(), self.start.y());
        if self.is_vertical() {
            return format!("x = {}", latex::num(x1, p));
        }
        if self.is_horizontal() {
            return format!("y = {}", latex::num(y1, p));
        }
        let inner = latex::shifted("x", x1, p);
        let rhs = if inner == "x" {
            latex::linear_combination(&[(self.slope(), "x")], p)
        } else {
            match latex::num(self.slope(), p).as_str() {
                "1" => inner,
                "-1" => format!("-({inner})"),
                m => format!("{m}({inner})"),
            }
        };
        format!("{} = {}", latex::shifted("y", y1, p), rhs)
    }

    /// `Ax + By + C = 0`, leading coefficient positive, integers reduced.
    pub fn general_latex(&self) -> String {
        let (a, b, c) = normalized_coefficients(self.coefficients());
        format!(
            "{} = 0",
            latex::linear_combination(&[(a, "x"), (b, "y"), (c, "")], self.prec())
        )
    }

    /// `(y - y_1)/(y_2 - y_1) = (x - x_1)/(x_2 - x_1)`
    pub fn two_point_latex(&self) -> String {
        let p = self.prec();
        let (s, e) = (self.start.xy(), self.end.xy());
        if self.is_vertical() {
            return format!("x = {}", latex::num(s.x, p));
        }
        if self.is_horizontal() {
            return format!("y = {}", latex::num(s.y, p));
        }
        format!(
            "{} = {}",
            latex::frac(&latex::shifted("y", s.y, p), &latex::num(e.y - s.y, p)),
            latex::frac(&latex::shifted("x", s.x, p), &latex::num(e.x - s.x, p)),
        )
    }

    /// `x/a + y/b = 1`; `None` for lines through the origin.
    pub fn intercept_latex(&self) -> Option<String> {
        let p = self.prec();
        let (_, _, c) = self.coefficients();
        if latex::num(c, p) == "0" {
            return None;
        }
        let term = |var: &str, at: Option<f64>| at.map(|v| latex::frac(var, &latex::num(v, p)));
        let terms: Vec<String> = [term("x", self.x_intercept()), term("y", self.y_intercept())]
            .into_iter()
            .flatten()
            .collect();
        Some(format!("{} = 1", terms.join(" + ")))
    }

    /// `x = x_1 + dx t, y = y_1 + dy t`
    pub fn parametric_latex(&self) -> String {
        let p = self.prec();
        let (s, d) = (self.start.xy(), self.direction());
        format!(
            "x = {},\\ y = {}",
            latex::linear_combination(&[(s.x, ""), (d.x, "t")], p),
            latex::linear_combination(&[(s.y, ""), (d.y, "t")], p),
        )
    }

    /// `(x - x_1)/dx = (y - y_1)/dy`
    pub fn symmetric_latex(&self) -> String {
        let p = self.prec();
        let (s, d) = (self.start.xy(), self.direction());
        if self.is_vertical() {
            return format!("x = {}", latex::num(s.x, p));
        }
        if self.is_horizontal() {
            return format!("y = {}", latex::num(s.y, p));
        }
        format!(
            "{} = {}",
            latex::frac(&latex::shifted("x", s.x, p), &latex::num(d.x, p)),
            latex::frac(&latex::shifted("y", s.y, p), &latex::num(d.y, p)),
        )
    }
}

/// Flip so the leading coefficient is positive; divide out a common integer
/// factor when all three are integral, else scale the leading one to 1.
fn normalized_coefficients((a, b, c): (f64, f64, f64)) -> (f64, f64, f64) {
    let lead = if a.abs() > 1e-12 { a } else { b };
    if lead == 0.0 {
        return (a, b, c);
    }
    let sign = lead.signum();
    let (a, b, c) = (a * sign, b * sign, c * sign);
    let integral = |v: f64| (v - v.round()).abs() < 1e-9;
    if integral(a) && integral(b) && integral(c) {
        let g = gcd(gcd(a.round().abs() as u64, b.round().abs() as u64), c.round().abs() as u64);
        if g > 1 {
            let g = g as f64;
            return (a / g, b / g, c / g);
        }
        return (a, b, c);
    }
    let lead = lead.abs();
    (a / lead, b / lead, c / lead)
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}
