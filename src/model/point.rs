//! Points: the leaf geometry of the model.
//!
//! A free point is moved with [`Point::set`] and friends. A computed point is
//! produced by a factory (polar placement, rotation, projection, ...) and
//! follows its inputs; setting it directly is an error.

use std::cell::Cell;
use std::rc::Rc;

use glam::{DVec2, DVec3};

use super::observable::{Derived, Emitter, Observable};
use crate::errors::ModelError;
use crate::types::{PointLike, Value, finite_vec};

#[derive(Debug)]
pub struct Point {
    emitter: Emitter,
    pos: Cell<DVec3>,
    computed: bool,
}

impl Observable for Point {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }
}

impl Point {
    /// A free point in the plane (z = 0).
    pub fn new(x: f64, y: f64) -> Rc<Point> {
        Self::at(DVec3::new(x, y, 0.0))
    }

    /// A free point with all three coordinates.
    pub fn new3(x: f64, y: f64, z: f64) -> Rc<Point> {
        Self::at(DVec3::new(x, y, z))
    }

    /// A free point from a vector (unchecked, use `try_at` for user input).
    pub fn at(pos: DVec3) -> Rc<Point> {
        Rc::new(Point {
            emitter: Emitter::new(),
            pos: Cell::new(pos),
            computed: false,
        })
    }

    /// A free point, rejecting NaN and infinite coordinates.
    pub fn try_at(pos: DVec3) -> Result<Rc<Point>, ModelError> {
        Ok(Self::at(finite_vec(pos)?))
    }

    /// A point whose only legal mutation path is its upstream dependencies.
    pub(crate) fn computed(pos: DVec3) -> Rc<Point> {
        Rc::new(Point {
            emitter: Emitter::new(),
            pos: Cell::new(pos),
            computed: true,
        })
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.pos.get().x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.pos.get().y
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.pos.get().z
    }

    #[inline]
    pub fn position(&self) -> DVec3 {
        self.pos.get()
    }

    /// Position projected onto the plane
    #[inline]
    pub fn xy(&self) -> DVec2 {
        self.pos.get().truncate()
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.position().distance(other.position())
    }

    /// Move to `(x, y, 0)` and notify once.
    pub fn set(&self, x: f64, y: f64) -> Result<(), ModelError> {
        self.set_with(DVec3::new(x, y, 0.0), true)
    }

    /// Move to `(x, y, z)` and notify once.
    pub fn set_xyz(&self, x: f64, y: f64, z: f64) -> Result<(), ModelError> {
        self.set_with(DVec3::new(x, y, z), true)
    }

    /// Move, optionally without notifying listeners.
    pub fn set_with(&self, pos: DVec3, notify: bool) -> Result<(), ModelError> {
        self.check_free()?;
        self.pos.set(finite_vec(pos)?);
        if notify {
            self.notify();
        }
        Ok(())
    }

    /// Change x only. Each coordinate setter notifies on its own.
    pub fn set_x(&self, x: f64) -> Result<(), ModelError> {
        let p = self.position();
        self.set_with(DVec3::new(x, p.y, p.z), true)
    }

    pub fn set_y(&self, y: f64) -> Result<(), ModelError> {
        let p = self.position();
        self.set_with(DVec3::new(p.x, y, p.z), true)
    }

    pub fn set_z(&self, z: f64) -> Result<(), ModelError> {
        let p = self.position();
        self.set_with(DVec3::new(p.x, p.y, z), true)
    }

    fn check_free(&self) -> Result<(), ModelError> {
        if self.computed {
            Err(ModelError::ComputedEntity { entity: "point" })
        } else {
            Ok(())
        }
    }

    /// Internal write used by recompute closures; does not notify.
    pub(crate) fn store(&self, pos: DVec3) {
        if pos.is_finite() {
            self.pos.set(pos);
        } else {
            crate::log::warn!(?pos, "ignoring non-finite recomputed position");
        }
    }

    /// Internal write followed by a notification.
    pub(crate) fn store_and_notify(&self, pos: DVec3) {
        self.store(pos);
        self.notify();
    }

    // ------------------------------------------------------------------
    // Derived point factories
    // ------------------------------------------------------------------

    /// `origin + radius * (cos angle, sin angle)`, angle in radians.
    pub fn from_polar(
        origin: impl Into<PointLike>,
        radius: impl Into<Value>,
        angle: impl Into<Value>,
    ) -> Result<Rc<Point>, ModelError> {
        let origin = origin.into().into_point()?;
        let radius = radius.into();
        let angle = angle.into();
        let builder = Derived::new(Point::computed(origin.position()))
            .on(&origin)
            .on_value(&radius)
            .on_value(&angle);
        Ok(builder.build(move |p| {
            let (sin, cos) = angle.get().sin_cos();
            p.store(origin.position() + DVec3::new(cos, sin, 0.0) * radius.get());
        }))
    }

    /// `point` rotated counterclockwise about `center` by `angle` radians.
    pub fn rotate_about_point(
        point: &Rc<Point>,
        center: &Rc<Point>,
        angle: impl Into<Value>,
    ) -> Rc<Point> {
        let angle = angle.into();
        let (point, center) = (Rc::clone(point), Rc::clone(center));
        Derived::new(Point::computed(point.position()))
            .on(&point)
            .on(&center)
            .on_value(&angle)
            .build(move |p| {
                let c = center.position();
                let rel = DVec2::from_angle(angle.get()).rotate((point.position() - c).truncate());
                p.store(c + rel.extend(point.z() - c.z));
            })
    }

    /// A point `buff` away from `anchor` along `direction` (normalised).
    pub fn next_to_model(anchor: &Rc<Point>, direction: DVec2, buff: f64) -> Rc<Point> {
        let dir = direction.normalize_or_zero().extend(0.0);
        let anchor = Rc::clone(anchor);
        Derived::new(Point::computed(anchor.position()))
            .on(&anchor)
            .build(move |p| p.store(anchor.position() + dir * buff))
    }

    /// The midpoint of two points.
    pub fn midpoint(a: &Rc<Point>, b: &Rc<Point>) -> Rc<Point> {
        let (a, b) = (Rc::clone(a), Rc::clone(b));
        Derived::new(Point::computed(DVec3::ZERO))
            .on(&a)
            .on(&b)
            .build(move |p| p.store((a.position() + b.position()) * 0.5))
    }

    /// `point + offset`, following `point`.
    pub fn translated(point: &Rc<Point>, offset: DVec3) -> Rc<Point> {
        let point = Rc::clone(point);
        Derived::new(Point::computed(DVec3::ZERO))
            .on(&point)
            .build(move |p| p.store(point.position() + offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Parameter;
    use std::f64::consts::FRAC_PI_2;

    fn counter<T: Observable>(entity: &T) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let hits = Rc::clone(&count);
        entity.emitter().on_change(move || hits.set(hits.get() + 1));
        count
    }

    #[test]
    fn set_notifies_once() {
        let p = Point::new(0.0, 0.0);
        let hits = counter(&*p);
        p.set(1.0, 2.0).unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(p.position(), DVec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn coordinate_setters_notify_each() {
        let p = Point::new(0.0, 0.0);
        let hits = counter(&*p);
        p.set_x(1.0).unwrap();
        p.set_y(2.0).unwrap();
        p.set_z(3.0).unwrap();
        assert_eq!(hits.get(), 3);
        assert_eq!(p.position(), DVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn quiet_set_does_not_notify() {
        let p = Point::new(0.0, 0.0);
        let hits = counter(&*p);
        p.set_with(DVec3::new(4.0, 4.0, 0.0), false).unwrap();
        assert_eq!(hits.get(), 0);
        assert_eq!(p.x(), 4.0);
    }

    #[test]
    fn set_rejects_non_finite() {
        let p = Point::new(1.0, 1.0);
        assert!(matches!(p.set(f64::NAN, 0.0), Err(ModelError::Numeric(_))));
        assert_eq!(p.x(), 1.0);
    }

    #[test]
    fn computed_point_rejects_set() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(2.0, 2.0);
        let m = Point::midpoint(&a, &b);
        assert!(matches!(
            m.set(5.0, 5.0),
            Err(ModelError::ComputedEntity { .. })
        ));
        assert_eq!(m.xy(), DVec2::new(1.0, 1.0));
    }

    #[test]
    fn from_polar_follows_angle_parameter() {
        let angle = Parameter::new(0.0);
        let p = Point::from_polar((1.0, 1.0), 2.0, &angle).unwrap();
        assert!((p.xy() - DVec2::new(3.0, 1.0)).length() < 1e-12);
        angle.set_value(FRAC_PI_2).unwrap();
        assert!((p.xy() - DVec2::new(1.0, 3.0)).length() < 1e-12);
    }

    #[test]
    fn rotate_about_point_tracks_both_inputs() {
        let p = Point::new(2.0, 0.0);
        let c = Point::new(1.0, 0.0);
        let r = Point::rotate_about_point(&p, &c, FRAC_PI_2);
        assert!((r.xy() - DVec2::new(1.0, 1.0)).length() < 1e-12);
        c.set(0.0, 0.0).unwrap();
        assert!((r.xy() - DVec2::new(0.0, 2.0)).length() < 1e-12);
    }

    #[test]
    fn next_to_model_keeps_offset() {
        let a = Point::new(0.0, 0.0);
        let n = Point::next_to_model(&a, DVec2::new(0.0, 3.0), 0.5);
        a.set(1.0, 1.0).unwrap();
        assert!((n.xy() - DVec2::new(1.0, 1.5)).length() < 1e-12);
    }

    #[test]
    fn derived_point_keeps_identity_and_notifies() {
        let a = Point::new(0.0, 0.0);
        let t = Point::translated(&a, DVec3::new(1.0, 0.0, 0.0));
        let hits = counter(&*t);
        a.set(2.0, 0.0).unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(t.x(), 3.0);
    }
}
