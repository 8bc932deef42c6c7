//! Closed polygons over shared vertex points.

use std::rc::Rc;

use glam::{DVec2, DVec3};

use super::geometry::{self, Segment2};
use super::observable::{Derived, Emitter, Observable};
use super::point::Point;
use crate::config::ModelConfig;
use crate::errors::ModelError;
use crate::types::PointLike;

#[derive(Debug)]
pub struct Polygon {
    emitter: Emitter,
    vertices: Vec<Rc<Point>>,
    cfg: ModelConfig,
}

impl Observable for Polygon {
    fn emitter(&self) -> &Emitter {
        &self.emitter
    }
}

impl Polygon {
    /// A polygon through the given vertices, in order. Needs at least three.
    pub fn new<I, P>(vertices: I) -> Result<Rc<Polygon>, ModelError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PointLike>,
    {
        Self::with_config(vertices, ModelConfig::global())
    }

    pub fn with_config<I, P>(vertices: I, cfg: ModelConfig) -> Result<Rc<Polygon>, ModelError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PointLike>,
    {
        let vertices = vertices
            .into_iter()
            .map(|v| v.into().into_point())
            .collect::<Result<Vec<_>, _>>()?;
        if vertices.len() < 3 {
            return Err(ModelError::TooFewVertices {
                entity: "polygon",
                needed: 3,
                got: vertices.len(),
            });
        }
        let polygon = Rc::new(Polygon {
            emitter: Emitter::new(),
            vertices: vertices.clone(),
            cfg,
        });
        // No cached state: moving a vertex only relays the change.
        let builder = vertices.iter().fold(Derived::new(polygon), |b, v| b.on(v));
        Ok(builder.build(|_| {}))
    }

    pub fn vertices(&self) -> &[Rc<Point>] {
        &self.vertices
    }

    pub fn vertex(&self, index: usize) -> Result<&Rc<Point>, ModelError> {
        self.vertices.get(index).ok_or(ModelError::InvalidIndex {
            entity: "polygon vertex",
            index,
            len: self.vertices.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.cfg
    }

    pub fn positions(&self) -> Vec<DVec2> {
        self.vertices.iter().map(|v| v.xy()).collect()
    }

    /// Edges in vertex order, the last one closing back to the first.
    pub fn edges(&self) -> Vec<Segment2> {
        let pts = self.positions();
        let n = pts.len();
        (0..n)
            .map(|i| Segment2 {
                a: pts[i],
                b: pts[(i + 1) % n],
            })
            .collect()
    }

    /// Shoelace area, positive for counterclockwise vertex order.
    pub fn signed_area(&self) -> f64 {
        geometry::signed_area(&self.positions())
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn perimeter(&self) -> f64 {
        self.edges().iter().map(|e| e.a.distance(e.b)).sum()
    }

    /// The point `ratio` of the way around the perimeter from the first vertex.
    pub fn point_at_ratio(&self, ratio: f64) -> DVec3 {
        geometry::point_along_closed(&self.positions(), ratio)
            .unwrap_or(DVec2::ZERO)
            .extend(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn square() -> Rc<Polygon> {
        Polygon::new([(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]).unwrap()
    }

    #[test]
    fn needs_three_vertices() {
        assert!(matches!(
            Polygon::new([(0.0, 0.0), (1.0, 0.0)]),
            Err(ModelError::TooFewVertices { got: 2, .. })
        ));
    }

    #[test]
    fn measures() {
        let sq = square();
        assert_eq!(sq.area(), 4.0);
        assert_eq!(sq.signed_area(), 4.0);
        assert_eq!(sq.perimeter(), 8.0);
        assert_eq!(sq.edges().len(), 4);
        assert_eq!(sq.point_at_ratio(0.25), DVec3::new(2.0, 0.0, 0.0));
        assert_eq!(sq.point_at_ratio(1.0), DVec3::ZERO);
    }

    #[test]
    fn vertex_index_is_checked() {
        let sq = square();
        assert!(sq.vertex(3).is_ok());
        assert!(matches!(
            sq.vertex(4),
            Err(ModelError::InvalidIndex { index: 4, len: 4, .. })
        ));
    }

    #[test]
    fn moving_a_shared_vertex_notifies() {
        let a = Point::new(0.0, 0.0);
        let tri =
            Polygon::new([PointLike::from(&a), (1.0, 0.0).into(), (0.0, 1.0).into()]).unwrap();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        tri.on_change(move || h.set(h.get() + 1));
        a.set(-1.0, 0.0).unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(tri.area(), 1.0);
    }
}
