//! Angles at a vertex between two rays.

use std::rc::Rc;

use glam::{DVec2, DVec3};

use super::geometry::cross;
use super::latex;
use super::line::Line;
use super::observable::{Derived, Emitter, Observable};
use super::point::Point;
use crate::config::ModelConfig;
use crate::errors::ModelError;
use crate::log::warn;
use crate::types::{Degrees, PointLike};

/// The angle `from`-`vertex`-`to`.
///
/// Purely derived from its three points. `clockwise` only affects the
/// directed sweep; the plain measure is always in [0, 180].
#[derive(Debug)]
pub struct Angle {
    emitter: Emitter,
    from: Rc<Point>,
    vertex: Rc<Point>,
    to: Rc<Point>,
    clockwise: bool,
    cfg: ModelConfig,
}

impl Observable for Angle {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }
}

impl Angle {
    pub fn from_three_points(
        from: impl Into<PointLike>,
        vertex: impl Into<PointLike>,
        to: impl Into<PointLike>,
        clockwise: bool,
    ) -> Result<Rc<Angle>, ModelError> {
        let from = from.into().into_point()?;
        let vertex = vertex.into().into_point()?;
        let to = to.into().into_point()?;
        Ok(Self::between(from, vertex, to, clockwise))
    }

    pub(crate) fn between(
        from: Rc<Point>,
        vertex: Rc<Point>,
        to: Rc<Point>,
        clockwise: bool,
    ) -> Rc<Angle> {
        let angle = Rc::new(Angle {
            emitter: Emitter::new(),
            from: Rc::clone(&from),
            vertex: Rc::clone(&vertex),
            to: Rc::clone(&to),
            clockwise,
            cfg: ModelConfig::global(),
        });
        Derived::new(angle)
            .on(&from)
            .on(&vertex)
            .on(&to)
            .build(|_| {})
    }

    /// The angle where two lines meet, opening along each line's direction.
    ///
    /// While the lines are parallel the vertex stays where it last was.
    pub fn angle_between_lines(l1: &Rc<Line>, l2: &Rc<Line>) -> Rc<Angle> {
        let (a, b) = (Rc::clone(l1), Rc::clone(l2));
        let vertex = Derived::new(Point::computed(l1.start().position()))
            .on(&a)
            .on(&b)
            .build(move |p| match a.intersection(&b) {
                Some(q) => p.store(q),
                None => warn!("parallel lines, keeping previous vertex"),
            });
        let ray = |line: &Rc<Line>| {
            let (line, vertex) = (Rc::clone(line), Rc::clone(&vertex));
            Derived::new(Point::computed(DVec3::ZERO))
                .on(&line)
                .on(&vertex)
                .build(move |p| p.store(vertex.position() + line.direction().extend(0.0)))
        };
        let (from, to) = (ray(l1), ray(l2));
        Self::between(from, vertex, to, false)
    }

    pub fn from_point(&self) -> &Rc<Point> {
        &self.from
    }

    pub fn vertex(&self) -> &Rc<Point> {
        &self.vertex
    }

    pub fn to_point(&self) -> &Rc<Point> {
        &self.to
    }

    pub fn is_clockwise(&self) -> bool {
        self.clockwise
    }

    fn rays(&self) -> (DVec2, DVec2) {
        let v = self.vertex.xy();
        (self.from.xy() - v, self.to.xy() - v)
    }

    /// Undirected measure in [0, π]; zero when either ray has no length.
    pub fn radians(&self) -> f64 {
        let (u, v) = self.rays();
        let norms = u.length() * v.length();
        if norms <= self.cfg.eps {
            return 0.0;
        }
        (u.dot(v) / norms).clamp(-1.0, 1.0).acos()
    }

    /// Undirected measure in degrees.
    pub fn degrees(&self) -> f64 {
        Degrees::from_radians(self.radians()).raw()
    }

    /// Sweep from the `from` ray to the `to` ray, in [0, 360).
    ///
    /// Counterclockwise unless the angle was built clockwise.
    pub fn sweep_degrees(&self) -> f64 {
        let (u, v) = self.rays();
        if u.length() * v.length() <= self.cfg.eps {
            return 0.0;
        }
        let ccw = cross(u, v).atan2(u.dot(v)).to_degrees().rem_euclid(360.0);
        let sweep = if self.clockwise {
            (360.0 - ccw).rem_euclid(360.0)
        } else {
            ccw
        };
        // rem_euclid can round up to exactly 360
        if sweep >= 360.0 { 0.0 } else { sweep }
    }

    pub fn latex(&self) -> String {
        latex::degrees(self.degrees(), self.cfg.latex_precision)
    }

    /// Unit direction halving the angle.
    ///
    /// For a straight angle the bisector turns a quarter from the `from` ray
    /// in the sweep direction. `None` when either ray has no length.
    pub fn bisector_direction(&self) -> Option<DVec2> {
        let (u, v) = self.rays();
        let (u, v) = (u.try_normalize()?, v.try_normalize()?);
        match (u + v).try_normalize() {
            Some(b) => Some(b),
            None if self.clockwise => Some(-u.perp()),
            None => Some(u.perp()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn right_angle() {
        let a = Angle::from_three_points((1.0, 0.0), (0.0, 0.0), (0.0, 1.0), false).unwrap();
        assert!((a.degrees() - 90.0).abs() < 1e-12);
        assert!((a.sweep_degrees() - 90.0).abs() < 1e-12);
        insta::assert_snapshot!(a.latex(), @r"90^\circ");
    }

    #[test]
    fn clockwise_sweep_is_the_complement() {
        let a = Angle::from_three_points((1.0, 0.0), (0.0, 0.0), (0.0, 1.0), true).unwrap();
        assert!((a.degrees() - 90.0).abs() < 1e-12);
        assert!((a.sweep_degrees() - 270.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_rays_clamp() {
        let zero = Angle::from_three_points((0.0, 0.0), (0.0, 0.0), (1.0, 0.0), false).unwrap();
        assert_eq!(zero.degrees(), 0.0);
        assert_eq!(zero.bisector_direction(), None);

        let straight =
            Angle::from_three_points((1.0, 0.0), (0.0, 0.0), (-1.0, 0.0), false).unwrap();
        assert!((straight.degrees() - 180.0).abs() < 1e-12);
        assert!(!straight.degrees().is_nan());
        assert_eq!(straight.bisector_direction(), Some(dvec2(0.0, 1.0)));

        let same = Angle::from_three_points((2.0, 2.0), (0.0, 0.0), (1.0, 1.0), false).unwrap();
        assert!(same.degrees() < 1e-5);
    }

    #[test]
    fn follows_its_points() {
        let to = Point::new(0.0, 1.0);
        let a = Angle::from_three_points((1.0, 0.0), (0.0, 0.0), &to, false).unwrap();
        to.set(-1.0, 1.0).unwrap();
        assert!((a.degrees() - 135.0).abs() < 1e-9);
        let b = a.bisector_direction().unwrap();
        assert!((b.y.atan2(b.x).to_degrees() - 67.5).abs() < 1e-9);
    }

    #[test]
    fn angle_between_moving_lines() {
        let tip = Point::new(1.0, 1.0);
        let l1 = Line::from_points((0.0, 0.0), (1.0, 0.0)).unwrap();
        let l2 = Line::from_points((0.0, 0.0), &tip).unwrap();
        let a = Angle::angle_between_lines(&l1, &l2);
        assert!((a.degrees() - 45.0).abs() < 1e-9);
        assert_eq!(a.vertex().xy(), DVec2::ZERO);

        tip.set(0.0, 1.0).unwrap();
        assert!((a.degrees() - 90.0).abs() < 1e-9);

        // parallel: vertex holds, measure collapses
        tip.set(1.0, 0.0).unwrap();
        assert_eq!(a.vertex().xy(), DVec2::ZERO);
        assert!(a.degrees().abs() < 1e-9);
    }
}
