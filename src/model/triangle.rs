//! Triangles with persistent sides and angles.
//!
//! The three side lines and three angles are created once at construction
//! and share the triangle's vertex points, so moving a vertex moves exactly
//! the sub-entities that touch it. Scalar properties are computed on access.

use std::rc::Rc;

use glam::{DVec2, DVec3};

use super::angle::Angle;
use super::geometry::{self, cross};
use super::line::Line;
use super::observable::{Derived, Emitter, Observable};
use super::point::Point;
use crate::config::ModelConfig;
use crate::errors::ModelError;
use crate::types::PointLike;

#[derive(Debug)]
pub struct Triangle {
    emitter: Emitter,
    points: [Rc<Point>; 3],
    /// AB, BC, CA
    sides: [Rc<Line>; 3],
    /// At A, B, C
    angles: [Rc<Angle>; 3],
    cfg: ModelConfig,
}

impl Observable for Triangle {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    fn remove(&self) {
        if self.emitter.is_removed() {
            return;
        }
        self.emitter.remove();
        for side in &self.sides {
            side.remove();
        }
        for angle in &self.angles {
            angle.remove();
        }
    }
}

impl Triangle {
    pub fn new(
        a: impl Into<PointLike>,
        b: impl Into<PointLike>,
        c: impl Into<PointLike>,
    ) -> Result<Rc<Triangle>, ModelError> {
        let a = a.into().into_point()?;
        let b = b.into().into_point()?;
        let c = c.into().into_point()?;
        let cfg = ModelConfig::global();

        let side = |p: &Rc<Point>, q: &Rc<Point>| Line::between(Rc::clone(p), Rc::clone(q), cfg);
        let sides = [side(&a, &b), side(&b, &c), side(&c, &a)];
        let corner = |from: &Rc<Point>, at: &Rc<Point>, to: &Rc<Point>| {
            Angle::between(Rc::clone(from), Rc::clone(at), Rc::clone(to), false)
        };
        let angles = [corner(&b, &a, &c), corner(&c, &b, &a), corner(&a, &c, &b)];

        let triangle = Rc::new(Triangle {
            emitter: Emitter::new(),
            points: [Rc::clone(&a), Rc::clone(&b), Rc::clone(&c)],
            sides,
            angles,
            cfg,
        });
        Ok(Derived::new(triangle)
            .on(&a)
            .on(&b)
            .on(&c)
            .build(|_| {}))
    }

    pub fn points(&self) -> &[Rc<Point>; 3] {
        &self.points
    }

    pub fn sides(&self) -> &[Rc<Line>; 3] {
        &self.sides
    }

    pub fn angles(&self) -> &[Rc<Angle>; 3] {
        &self.angles
    }

    pub fn point_index(&self, index: usize) -> Result<&Rc<Point>, ModelError> {
        self.points.get(index).ok_or(ModelError::InvalidIndex {
            entity: "triangle point",
            index,
            len: 3,
        })
    }

    /// Side `index`: 0 = AB, 1 = BC, 2 = CA.
    pub fn side(&self, index: usize) -> Result<&Rc<Line>, ModelError> {
        self.sides.get(index).ok_or(ModelError::InvalidIndex {
            entity: "triangle side",
            index,
            len: 3,
        })
    }

    /// Interior angle at vertex `index`.
    pub fn angle(&self, index: usize) -> Result<&Rc<Angle>, ModelError> {
        self.angles.get(index).ok_or(ModelError::InvalidIndex {
            entity: "triangle angle",
            index,
            len: 3,
        })
    }

    fn corners(&self) -> [DVec2; 3] {
        [self.points[0].xy(), self.points[1].xy(), self.points[2].xy()]
    }

    /// Opposite side lengths `(a, b, c)` = (|BC|, |CA|, |AB|).
    fn side_lengths(&self) -> (f64, f64, f64) {
        let [a, b, c] = self.corners();
        (b.distance(c), c.distance(a), a.distance(b))
    }

    pub fn area(&self) -> f64 {
        geometry::signed_area(&self.corners()).abs()
    }

    pub fn perimeter(&self) -> f64 {
        let (a, b, c) = self.side_lengths();
        a + b + c
    }

    pub fn centroid(&self) -> DVec3 {
        self.points
            .iter()
            .fold(DVec3::ZERO, |acc, p| acc + p.position())
            / 3.0
    }

    /// Weighted by opposite side lengths; the first vertex when collapsed.
    pub fn incenter(&self) -> DVec3 {
        let [pa, pb, pc] = self.corners();
        let (a, b, c) = self.side_lengths();
        let sum = a + b + c;
        if sum <= self.cfg.eps {
            return pa.extend(0.0);
        }
        ((pa * a + pb * b + pc * c) / sum).extend(0.0)
    }

    /// `None` for collinear vertices.
    pub fn circumcenter(&self) -> Option<DVec3> {
        let [a, b, c] = self.corners();
        let d = 2.0 * cross(b - a, c - a);
        let scale = (b - a).length() * (c - a).length();
        if scale <= self.cfg.eps || d.abs() <= self.cfg.eps * scale {
            return None;
        }
        let (ab, ac) = (b - a, c - a);
        let ux = (ac.y * ab.length_squared() - ab.y * ac.length_squared()) / d;
        let uy = (ab.x * ac.length_squared() - ac.x * ab.length_squared()) / d;
        Some((a + DVec2::new(ux, uy)).extend(0.0))
    }

    /// `A + B + C - 2O`; `None` for collinear vertices.
    pub fn orthocenter(&self) -> Option<DVec3> {
        let o = self.circumcenter()?;
        let [a, b, c] = self.corners();
        Some((a + b + c).extend(0.0) - o * 2.0)
    }

    pub fn circumcircle_radius(&self) -> Option<f64> {
        let o = self.circumcenter()?;
        Some(o.truncate().distance(self.points[0].xy()))
    }

    pub fn inradius(&self) -> f64 {
        let p = self.perimeter();
        if p <= self.cfg.eps { 0.0 } else { 2.0 * self.area() / p }
    }

    pub fn is_right(&self) -> bool {
        let [a, b, c] = self.corners();
        [(a, b, c), (b, c, a), (c, a, b)].iter().any(|&(at, p, q)| {
            let (u, v) = (p - at, q - at);
            let scale = u.length() * v.length();
            scale > self.cfg.eps && u.dot(v).abs() <= 1e-9 * scale
        })
    }
}
