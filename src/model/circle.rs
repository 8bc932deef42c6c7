//! Circles by center and radius.
//!
//! The radius is either fixed (validated positive at construction) or driven
//! by a parameter. A driven radius that drops to zero or below leaves the
//! circle degenerate: it has no intersections and derived points stay put.

use std::cell::Cell;
use std::f64::consts::PI;
use std::rc::Rc;

use glam::{DVec2, DVec3};

use super::geometry::{Circle2, unit};
use super::latex;
use super::line::Line;
use super::observable::{Derived, Emitter, Observable};
use super::parameter::Parameter;
use super::point::Point;
use crate::algebra;
use crate::config::ModelConfig;
use crate::errors::ModelError;
use crate::log::warn;
use crate::types::{PointLike, Value};

#[derive(Debug)]
pub struct Circle {
    emitter: Emitter,
    center: Rc<Point>,
    radius: Value,
    analytic: Cell<Circle2>,
    cfg: ModelConfig,
}

impl Observable for Circle {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }
}

impl Circle {
    pub fn new(
        center: impl Into<PointLike>,
        radius: impl Into<Value>,
    ) -> Result<Rc<Circle>, ModelError> {
        Self::with_config(center, radius, ModelConfig::global())
    }

    pub fn with_config(
        center: impl Into<PointLike>,
        radius: impl Into<Value>,
        cfg: ModelConfig,
    ) -> Result<Rc<Circle>, ModelError> {
        let radius = radius.into();
        if let Value::Fixed(r) = radius {
            if !(r.is_finite() && r > 0.0) {
                return Err(ModelError::InvalidRadius { value: r });
            }
        }
        let center = center.into().into_point()?;
        let circle = Rc::new(Circle {
            emitter: Emitter::new(),
            center: Rc::clone(&center),
            radius: radius.clone(),
            analytic: Cell::new(Circle2 {
                center: DVec2::ZERO,
                radius: 0.0,
            }),
            cfg,
        });
        Ok(Derived::new(circle)
            .on(&center)
            .on_value(&radius)
            .build(|c| c.rebuild()))
    }

    fn rebuild(&self) {
        self.analytic.set(Circle2 {
            center: self.center.xy(),
            radius: self.radius.get(),
        });
    }

    /// A circle around `center` passing through `point`.
    pub fn from_center_and_point(
        center: impl Into<PointLike>,
        point: impl Into<PointLike>,
    ) -> Result<Rc<Circle>, ModelError> {
        let center = center.into().into_point()?;
        let point = point.into().into_point()?;
        let radius = distance_parameter(&center, &point, 1.0);
        Self::new(center, radius)
    }

    /// The circle with diameter `a`-`b`.
    pub fn from_two_points(
        a: impl Into<PointLike>,
        b: impl Into<PointLike>,
    ) -> Result<Rc<Circle>, ModelError> {
        let a = a.into().into_point()?;
        let b = b.into().into_point()?;
        let center = Point::midpoint(&a, &b);
        let radius = distance_parameter(&a, &b, 0.5);
        Self::new(center, radius)
    }

    /// Parse `(x - h)^2 + (y - k)^2 = r^2` or its expanded form.
    pub fn from_equation(src: &str) -> Result<Rc<Circle>, ModelError> {
        let (h, k, r) = algebra::circle_parameters(src)?;
        Self::new((h, k), r)
    }

    pub fn center(&self) -> &Rc<Point> {
        &self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius.get()
    }

    pub fn radius_value(&self) -> &Value {
        &self.radius
    }

    pub fn config(&self) -> &ModelConfig {
        &self.cfg
    }

    /// Cached geometry, refreshed whenever the center or radius changes.
    pub fn analytic(&self) -> Circle2 {
        self.analytic.get()
    }

    pub fn is_degenerate(&self) -> bool {
        self.radius() <= 0.0
    }

    pub fn area(&self) -> f64 {
        PI * self.radius().powi(2)
    }

    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.radius()
    }

    /// Inside or on the boundary.
    pub fn contains(&self, p: DVec2) -> bool {
        let c = self.analytic();
        c.center.distance(p) <= c.radius + self.cfg.tangent_eps
    }

    /// Point on the circle at `angle` radians.
    pub fn point_at(&self, angle: f64) -> DVec3 {
        let c = self.analytic();
        (c.center + unit(angle) * c.radius).extend(self.center.z())
    }

    /// A point riding the circle at the given angle (radians).
    pub fn point_on_circle(self: &Rc<Self>, angle: impl Into<Value>) -> Rc<Point> {
        let (circle, angle) = (Rc::clone(self), angle.into());
        Derived::new(Point::computed(circle.point_at(angle.get())))
            .on(&circle)
            .on_value(&angle)
            .build(move |p| {
                if circle.is_degenerate() {
                    warn!(radius = circle.radius(), "degenerate circle, keeping previous position");
                } else {
                    p.store(circle.point_at(angle.get()));
                }
            })
    }

    /// The tangent line touching the circle at the given angle (radians).
    ///
    /// The line starts at the touching point and runs counterclockwise.
    pub fn tangent_line(self: &Rc<Self>, angle: impl Into<Value>) -> Rc<Line> {
        let angle = angle.into();
        let touch = self.point_on_circle(angle.clone());
        let anchor = Rc::clone(&touch);
        let ahead = Derived::new(Point::computed(DVec3::ZERO))
            .on(&anchor)
            .on_value(&angle)
            .build(move |p| p.store(anchor.position() + unit(angle.get()).perp().extend(0.0)));
        Line::between(touch, ahead, self.cfg)
    }

    /// `(x - h)^2 + (y - k)^2 = r^2`
    pub fn equation_latex(&self) -> String {
        let p = self.cfg.latex_precision;
        let c = self.analytic();
        let square = |var: &str, at: f64| {
            let s = latex::shifted(var, at, p);
            if s == var { format!("{var}^2") } else { format!("({s})^2") }
        };
        format!(
            "{} + {} = {}",
            square("x", c.center.x),
            square("y", c.center.y),
            latex::num(c.radius * c.radius, p)
        )
    }
}

/// `scale * |a - b|`, following both points.
fn distance_parameter(a: &Rc<Point>, b: &Rc<Point>, scale: f64) -> Rc<Parameter> {
    let (a, b) = (Rc::clone(a), Rc::clone(b));
    Derived::new(Parameter::computed(0.0))
        .on(&a)
        .on(&b)
        .build(move |r| r.store(a.distance_to(&b) * scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn fixed_radius_must_be_positive() {
        assert!(matches!(
            Circle::new((0.0, 0.0), 0.0),
            Err(ModelError::InvalidRadius { .. })
        ));
        assert!(Circle::new((0.0, 0.0), -1.0).is_err());
        assert!(Circle::new((0.0, 0.0), f64::NAN).is_err());
    }

    #[test]
    fn parameter_radius_drives_geometry() {
        let r = Parameter::new(1.0);
        let c = Circle::new((0.0, 0.0), &r).unwrap();
        r.set_value(3.0).unwrap();
        assert_eq!(c.analytic().radius, 3.0);
        assert!((c.area() - 9.0 * PI).abs() < 1e-12);
        r.set_value(-1.0).unwrap();
        assert!(c.is_degenerate());
    }

    #[test]
    fn center_and_point_tracks_both() {
        let center = Point::new(0.0, 0.0);
        let rim = Point::new(3.0, 4.0);
        let c = Circle::from_center_and_point(&center, &rim).unwrap();
        assert_eq!(c.radius(), 5.0);
        rim.set(0.0, 2.0).unwrap();
        assert_eq!(c.radius(), 2.0);
        center.set(0.0, 1.0).unwrap();
        assert_eq!(c.radius(), 1.0);
    }

    #[test]
    fn two_points_span_a_diameter() {
        let c = Circle::from_two_points((-2.0, 0.0), (2.0, 0.0)).unwrap();
        assert_eq!(c.center().xy(), DVec2::ZERO);
        assert_eq!(c.radius(), 2.0);
        assert!(c.contains(dvec2(0.0, 2.0)));
        assert!(!c.contains(dvec2(0.0, 2.1)));
    }

    #[test]
    fn point_on_circle_follows_angle_and_keeps_position_when_degenerate() {
        let r = Parameter::new(2.0);
        let angle = Parameter::new(0.0);
        let c = Circle::new((1.0, 1.0), &r).unwrap();
        let p = c.point_on_circle(&angle);
        assert!((p.xy() - dvec2(3.0, 1.0)).length() < 1e-12);

        angle.set_value(FRAC_PI_2).unwrap();
        assert!((p.xy() - dvec2(1.0, 3.0)).length() < 1e-12);

        r.set_value(0.0).unwrap();
        assert!((p.xy() - dvec2(1.0, 3.0)).length() < 1e-12);
    }

    #[test]
    fn tangent_is_perpendicular_to_radius() {
        let c = Circle::new((0.0, 0.0), 2.0).unwrap();
        let angle = Parameter::new(0.0);
        let t = c.tangent_line(&angle);
        assert!((t.start().xy() - dvec2(2.0, 0.0)).length() < 1e-12);
        assert_eq!(t.slope(), f64::INFINITY);

        angle.set_value(FRAC_PI_2).unwrap();
        assert!((t.start().xy() - dvec2(0.0, 2.0)).length() < 1e-12);
        assert!(t.slope().abs() < 1e-12);
    }

    #[test]
    fn equation_round_trip() {
        let c = Circle::from_equation("(x - 1)^2 + (y + 2)^2 = 9").unwrap();
        assert!((c.center().xy() - dvec2(1.0, -2.0)).length() < 1e-12);
        assert!((c.radius() - 3.0).abs() < 1e-12);
        insta::assert_snapshot!(c.equation_latex(), @"(x - 1)^2 + (y + 2)^2 = 9");

        let unit = Circle::from_equation("x**2 + y**2 = 4").unwrap();
        insta::assert_snapshot!(unit.equation_latex(), @"x^2 + y^2 = 4");

        assert!(Circle::from_equation("x^2 + 2y^2 = 4").is_err());
        assert!(Circle::from_equation("x^2 + y^2 = -4").is_err());
    }
}
