//! Reactive intersections between pairs of shapes.
//!
//! An [`Intersection`] owns a fixed number of slot points, sized for the most
//! results the shape pair can produce. Every recompute merges the current
//! results into the leading slots in place, so handles to those points stay
//! valid across changes. The number of live slots is tracked explicitly;
//! trailing slots keep their last coordinates and stop being notified.

use std::cell::Cell;
use std::rc::Rc;

use enum_dispatch::enum_dispatch;
use glam::{DVec2, DVec3};

use super::circle::Circle;
use super::geometry::{self, push_unique};
use super::line::Line;
use super::observable::{Derived, Emitter, Observable};
use super::point::Point;
use super::polygon::Polygon;
use crate::config::ModelConfig;
use crate::errors::ModelError;
use crate::log::debug;

/// Analytic solver for one kind of shape pair.
#[enum_dispatch]
pub trait Solve {
    /// Upper bound on the number of results
    fn capacity(&self) -> usize;

    /// Current intersection points, in a stable order.
    fn solve(&self, cfg: &ModelConfig) -> Vec<DVec2>;

    fn sources(&self) -> Vec<Rc<dyn Observable>>;
}

fn erased<T: Observable + 'static>(shape: &Rc<T>) -> Rc<dyn Observable> {
    Rc::clone(shape) as Rc<dyn Observable>
}

#[derive(Debug, Clone)]
pub struct LineLine {
    pub a: Rc<Line>,
    pub b: Rc<Line>,
}

impl Solve for LineLine {
    fn capacity(&self) -> usize {
        1
    }

    fn solve(&self, cfg: &ModelConfig) -> Vec<DVec2> {
        geometry::intersect_lines(self.a.analytic(), self.b.analytic(), cfg)
            .into_iter()
            .collect()
    }

    fn sources(&self) -> Vec<Rc<dyn Observable>> {
        vec![erased(&self.a), erased(&self.b)]
    }
}

#[derive(Debug, Clone)]
pub struct LineCircle {
    pub line: Rc<Line>,
    pub circle: Rc<Circle>,
}

impl Solve for LineCircle {
    fn capacity(&self) -> usize {
        2
    }

    fn solve(&self, cfg: &ModelConfig) -> Vec<DVec2> {
        geometry::intersect_line_circle(self.line.analytic(), self.circle.analytic(), cfg)
    }

    fn sources(&self) -> Vec<Rc<dyn Observable>> {
        vec![erased(&self.line), erased(&self.circle)]
    }
}

#[derive(Debug, Clone)]
pub struct CircleCircle {
    pub a: Rc<Circle>,
    pub b: Rc<Circle>,
}

impl Solve for CircleCircle {
    fn capacity(&self) -> usize {
        2
    }

    fn solve(&self, cfg: &ModelConfig) -> Vec<DVec2> {
        geometry::intersect_circles(self.a.analytic(), self.b.analytic(), cfg)
    }

    fn sources(&self) -> Vec<Rc<dyn Observable>> {
        vec![erased(&self.a), erased(&self.b)]
    }
}

/// Edge crossings of two polygons; shared edge stretches contribute both
/// of their endpoints.
#[derive(Debug, Clone)]
pub struct PolygonPolygon {
    pub a: Rc<Polygon>,
    pub b: Rc<Polygon>,
}

impl Solve for PolygonPolygon {
    fn capacity(&self) -> usize {
        2 * self.a.len() * self.b.len()
    }

    fn solve(&self, cfg: &ModelConfig) -> Vec<DVec2> {
        let mut out = Vec::new();
        for ea in self.a.edges() {
            for eb in self.b.edges() {
                for p in geometry::intersect_segments(ea, eb, cfg) {
                    push_unique(&mut out, p, cfg.merge_eps);
                }
            }
        }
        out
    }

    fn sources(&self) -> Vec<Rc<dyn Observable>> {
        vec![erased(&self.a), erased(&self.b)]
    }
}

#[derive(Debug, Clone)]
pub struct LinePolygon {
    pub line: Rc<Line>,
    pub polygon: Rc<Polygon>,
}

impl Solve for LinePolygon {
    fn capacity(&self) -> usize {
        2 * self.polygon.len()
    }

    fn solve(&self, cfg: &ModelConfig) -> Vec<DVec2> {
        let line = self.line.analytic();
        let mut out = Vec::new();
        for edge in self.polygon.edges() {
            for p in geometry::intersect_line_segment(line, edge, cfg) {
                push_unique(&mut out, p, cfg.merge_eps);
            }
        }
        out
    }

    fn sources(&self) -> Vec<Rc<dyn Observable>> {
        vec![erased(&self.line), erased(&self.polygon)]
    }
}

/// The supported shape pairs.
#[enum_dispatch(Solve)]
#[derive(Debug, Clone)]
pub enum ShapePair {
    LineLine,
    LineCircle,
    CircleCircle,
    PolygonPolygon,
    LinePolygon,
}

#[derive(Debug)]
pub struct Intersection {
    emitter: Emitter,
    pair: ShapePair,
    slots: Vec<Rc<Point>>,
    live: Cell<usize>,
    cfg: ModelConfig,
}

impl Observable for Intersection {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    fn remove(&self) {
        if self.emitter.is_removed() {
            return;
        }
        self.emitter.remove();
        for slot in &self.slots {
            slot.remove();
        }
    }
}

impl Intersection {
    pub fn new(pair: impl Into<ShapePair>) -> Rc<Intersection> {
        Self::with_config(pair, ModelConfig::global())
    }

    /// Allocate the slots, merge the first result, then follow both shapes.
    pub fn with_config(pair: impl Into<ShapePair>, cfg: ModelConfig) -> Rc<Intersection> {
        let pair = pair.into();
        let slots = (0..pair.capacity())
            .map(|_| Point::computed(DVec3::ZERO))
            .collect();
        let sources = pair.sources();
        let intersection = Rc::new(Intersection {
            emitter: Emitter::new(),
            pair,
            slots,
            live: Cell::new(0),
            cfg,
        });
        sources
            .into_iter()
            .fold(Derived::new(intersection), Derived::on_dyn)
            .build(|ix| ix.merge())
    }

    pub fn line_line(a: &Rc<Line>, b: &Rc<Line>) -> Rc<Intersection> {
        Self::new(LineLine {
            a: Rc::clone(a),
            b: Rc::clone(b),
        })
    }

    pub fn line_circle(line: &Rc<Line>, circle: &Rc<Circle>) -> Rc<Intersection> {
        Self::new(LineCircle {
            line: Rc::clone(line),
            circle: Rc::clone(circle),
        })
    }

    pub fn circle_circle(a: &Rc<Circle>, b: &Rc<Circle>) -> Rc<Intersection> {
        Self::new(CircleCircle {
            a: Rc::clone(a),
            b: Rc::clone(b),
        })
    }

    pub fn polygon_polygon(a: &Rc<Polygon>, b: &Rc<Polygon>) -> Rc<Intersection> {
        Self::new(PolygonPolygon {
            a: Rc::clone(a),
            b: Rc::clone(b),
        })
    }

    pub fn line_polygon(line: &Rc<Line>, polygon: &Rc<Polygon>) -> Rc<Intersection> {
        Self::new(LinePolygon {
            line: Rc::clone(line),
            polygon: Rc::clone(polygon),
        })
    }

    /// Write the current results into the leading slots.
    fn merge(&self) {
        let mut results = self.pair.solve(&self.cfg);
        results.truncate(self.slots.len());
        self.live.set(results.len());
        for (slot, p) in self.slots.iter().zip(&results) {
            slot.store_and_notify(p.extend(0.0));
        }
        debug!(live = results.len(), capacity = self.slots.len(), "intersection recomputed");
    }

    /// Recompute from the current shapes and notify, as an upstream change would.
    pub fn recompute(&self) {
        self.merge();
        self.notify();
    }

    pub fn pair(&self) -> &ShapePair {
        &self.pair
    }

    /// Number of slots allocated at construction
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of real results
    pub fn len(&self) -> usize {
        self.live.get()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_live(&self, index: usize) -> bool {
        index < self.len()
    }

    /// Handles to the live slots, in result order.
    pub fn points(&self) -> Vec<Rc<Point>> {
        self.slots[..self.len()].to_vec()
    }

    /// Positions of the live slots.
    pub fn positions(&self) -> Vec<DVec3> {
        self.slots[..self.len()].iter().map(|p| p.position()).collect()
    }

    /// Slot `index`, live or not. The handle never changes.
    pub fn point_index(&self, index: usize) -> Result<&Rc<Point>, ModelError> {
        self.slots.get(index).ok_or(ModelError::InvalidIndex {
            entity: "intersection slot",
            index,
            len: self.slots.len(),
        })
    }

    /// Slot `index` if it currently holds a result.
    pub fn get(&self, index: usize) -> Option<&Rc<Point>> {
        if self.is_live(index) {
            self.slots.get(index)
        } else {
            None
        }
    }
}
