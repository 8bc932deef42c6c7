//! Points that ride along a shape at a given ratio of its length.

use std::f64::consts::TAU;
use std::rc::Rc;

use glam::DVec3;

use super::circle::Circle;
use super::line::Line;
use super::observable::{Derived, Observable};
use super::plot::{Plot, PlotKind};
use super::point::Point;
use super::polygon::Polygon;
use crate::errors::ModelError;
use crate::log::warn;
use crate::types::Value;

/// A shape a point can be traced along.
#[derive(Debug, Clone)]
pub enum Track {
    /// From start (0) to end (1)
    Line(Rc<Line>),
    /// Counterclockwise from angle zero
    Circle(Rc<Circle>),
    /// Around the perimeter from the first vertex
    Polygon(Rc<Polygon>),
    /// By arc length over the plot range
    Plot(Rc<Plot>),
}

impl Track {
    pub fn source(&self) -> Rc<dyn Observable> {
        match self {
            Track::Line(l) => Rc::clone(l) as Rc<dyn Observable>,
            Track::Circle(c) => Rc::clone(c) as Rc<dyn Observable>,
            Track::Polygon(p) => Rc::clone(p) as Rc<dyn Observable>,
            Track::Plot(p) => Rc::clone(p) as Rc<dyn Observable>,
        }
    }

    /// Position at `ratio`, or `None` when the shape is degenerate.
    pub fn point_at_ratio(&self, ratio: f64) -> Option<DVec3> {
        match self {
            Track::Line(l) => Some(l.point_at(ratio)),
            Track::Circle(c) if c.is_degenerate() => None,
            Track::Circle(c) => Some(c.point_at(ratio * TAU)),
            Track::Polygon(p) => Some(p.point_at_ratio(ratio)),
            Track::Plot(p) => p.point_at_ratio(ratio).map(|v| v.extend(0.0)),
        }
    }
}

impl From<&Rc<Line>> for Track {
    fn from(l: &Rc<Line>) -> Self {
        Track::Line(Rc::clone(l))
    }
}

impl From<&Rc<Circle>> for Track {
    fn from(c: &Rc<Circle>) -> Self {
        Track::Circle(Rc::clone(c))
    }
}

impl From<&Rc<Polygon>> for Track {
    fn from(p: &Rc<Polygon>) -> Self {
        Track::Polygon(Rc::clone(p))
    }
}

impl From<&Rc<Plot>> for Track {
    fn from(p: &Rc<Plot>) -> Self {
        Track::Plot(Rc::clone(p))
    }
}

impl Point {
    /// A point at `ratio` along `track`, following both the shape and the ratio.
    pub fn point_at_ratio_along_shape(
        track: impl Into<Track>,
        ratio: impl Into<Value>,
    ) -> Result<Rc<Point>, ModelError> {
        let (track, ratio) = (track.into(), ratio.into());
        if let Track::Plot(plot) = &track {
            if plot.kind() == PlotKind::Implicit {
                return Err(ModelError::UnsupportedTrack {
                    reason: "an implicit plot has no parameterisation",
                });
            }
        }
        let initial = track.point_at_ratio(ratio.get()).unwrap_or(DVec3::ZERO);
        Ok(Derived::new(Point::computed(initial))
            .on_dyn(track.source())
            .on_value(&ratio)
            .build(move |p| match track.point_at_ratio(ratio.get()) {
                Some(pos) => p.store(pos),
                None => warn!(ratio = ratio.get(), "degenerate track, keeping previous position"),
            }))
    }
}
