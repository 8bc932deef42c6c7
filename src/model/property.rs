//! Named read-only properties and reactive mirroring of them.
//!
//! Every entity exposes a small set of named values. A mirror (`from_property`)
//! copies one of them into a computed point or parameter and keeps it in sync.
//! Missing or mistyped properties are logged, never raised.

use std::rc::Rc;

use glam::DVec3;

use super::angle::Angle;
use super::circle::Circle;
use super::intersection::Intersection;
use super::line::Line;
use super::observable::{Derived, Observable};
use super::parameter::Parameter;
use super::plot::Plot;
use super::point::Point;
use super::polygon::Polygon;
use super::triangle::Triangle;
use crate::log::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    Position(DVec3),
    Flag(bool),
    Text(String),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_position(&self) -> Option<DVec3> {
        match self {
            PropertyValue::Position(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            PropertyValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Named values an entity can be asked for.
pub trait Properties: Observable {
    /// Every name `property` may answer
    fn property_names(&self) -> &'static [&'static str];

    /// Current value of `name`; `None` if unknown or currently undefined.
    fn property(&self, name: &str) -> Option<PropertyValue>;
}

use PropertyValue::{Flag, Number, Position, Text};

impl Properties for Point {
    fn property_names(&self) -> &'static [&'static str] {
        &["x", "y", "z", "position", "computed"]
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        Some(match name {
            "x" => Number(self.x()),
            "y" => Number(self.y()),
            "z" => Number(self.z()),
            "position" => Position(self.position()),
            "computed" => Flag(self.is_computed()),
            _ => return None,
        })
    }
}

impl Properties for Parameter {
    fn property_names(&self) -> &'static [&'static str] {
        &["value", "computed"]
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        Some(match name {
            "value" => Number(self.value()),
            "computed" => Flag(self.is_computed()),
            _ => return None,
        })
    }
}

impl Properties for Line {
    fn property_names(&self) -> &'static [&'static str] {
        &[
            "start",
            "end",
            "midpoint",
            "length",
            "slope",
            "y_intercept",
            "inclination",
            "degenerate",
            "equation",
        ]
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        Some(match name {
            "start" => Position(self.start().position()),
            "end" => Position(self.end().position()),
            "midpoint" => Position(self.midpoint()),
            "length" => Number(self.length()),
            "slope" => Number(self.slope()),
            "y_intercept" => Number(self.y_intercept()?),
            "inclination" => Number(self.angle_of_inclination()),
            "degenerate" => Flag(self.is_degenerate()),
            "equation" => Text(self.general_latex()),
            _ => return None,
        })
    }
}

impl Properties for Circle {
    fn property_names(&self) -> &'static [&'static str] {
        &["center", "radius", "area", "circumference", "degenerate", "equation"]
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        Some(match name {
            "center" => Position(self.center().position()),
            "radius" => Number(self.radius()),
            "area" => Number(self.area()),
            "circumference" => Number(self.circumference()),
            "degenerate" => Flag(self.is_degenerate()),
            "equation" => Text(self.equation_latex()),
            _ => return None,
        })
    }
}

impl Properties for Polygon {
    fn property_names(&self) -> &'static [&'static str] {
        &["vertices", "area", "signed_area", "perimeter"]
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        Some(match name {
            "vertices" => Number(self.len() as f64),
            "area" => Number(self.area()),
            "signed_area" => Number(self.signed_area()),
            "perimeter" => Number(self.perimeter()),
            _ => return None,
        })
    }
}

impl Properties for Triangle {
    fn property_names(&self) -> &'static [&'static str] {
        &[
            "area",
            "perimeter",
            "centroid",
            "incenter",
            "circumcenter",
            "orthocenter",
            "inradius",
            "circumradius",
            "right",
        ]
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        Some(match name {
            "area" => Number(self.area()),
            "perimeter" => Number(self.perimeter()),
            "centroid" => Position(self.centroid()),
            "incenter" => Position(self.incenter()),
            "circumcenter" => Position(self.circumcenter()?),
            "orthocenter" => Position(self.orthocenter()?),
            "inradius" => Number(self.inradius()),
            "circumradius" => Number(self.circumcircle_radius()?),
            "right" => Flag(self.is_right()),
            _ => return None,
        })
    }
}

impl Properties for Angle {
    fn property_names(&self) -> &'static [&'static str] {
        &["degrees", "radians", "sweep", "vertex", "latex"]
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        Some(match name {
            "degrees" => Number(self.degrees()),
            "radians" => Number(self.radians()),
            "sweep" => Number(self.sweep_degrees()),
            "vertex" => Position(self.vertex().position()),
            "latex" => Text(self.latex()),
            _ => return None,
        })
    }
}

impl Properties for Intersection {
    fn property_names(&self) -> &'static [&'static str] {
        &["count", "capacity", "first", "second"]
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        Some(match name {
            "count" => Number(self.len() as f64),
            "capacity" => Number(self.capacity() as f64),
            "first" => Position(self.get(0)?.position()),
            "second" => Position(self.get(1)?.position()),
            _ => return None,
        })
    }
}

impl Properties for Plot {
    fn property_names(&self) -> &'static [&'static str] {
        &["kind", "range_start", "range_end"]
    }

    fn property(&self, name: &str) -> Option<PropertyValue> {
        Some(match name {
            "kind" => Text(self.kind().name().to_string()),
            "range_start" => Number(self.range().0),
            "range_end" => Number(self.range().1),
            _ => return None,
        })
    }
}

impl Point {
    /// A point mirroring a position-valued property of `entity`.
    ///
    /// Returns `None` (and logs) if the property is missing or not a position
    /// right now. Later gaps keep the last mirrored position.
    pub fn from_property<E: Properties + 'static>(entity: &Rc<E>, name: &str) -> Option<Rc<Point>> {
        let Some(initial) = entity.property(name).and_then(|v| v.as_position()) else {
            warn!(name = %name, "property is missing or not a position");
            return None;
        };
        let (entity, name) = (Rc::clone(entity), name.to_string());
        Some(
            Derived::new(Point::computed(initial))
                .on(&entity)
                .build(move |p| {
                    match entity.property(&name).and_then(|v| v.as_position()) {
                        Some(pos) => p.store(pos),
                        None => warn!(
                            name = %name,
                            "mirrored property unreadable, keeping previous position"
                        ),
                    }
                }),
        )
    }
}

impl Parameter {
    /// A computed parameter mirroring a numeric property of `entity`.
    pub fn from_property<E: Properties + 'static>(
        entity: &Rc<E>,
        name: &str,
    ) -> Option<Rc<Parameter>> {
        let Some(initial) = entity.property(name).and_then(|v| v.as_number()) else {
            warn!(name = %name, "property is missing or not a number");
            return None;
        };
        let (entity, name) = (Rc::clone(entity), name.to_string());
        Some(
            Derived::new(Parameter::computed(initial))
                .on(&entity)
                .build(move |p| {
                    match entity.property(&name).and_then(|v| v.as_number()) {
                        Some(v) => p.store(v),
                        None => warn!(
                            name = %name,
                            "mirrored property unreadable, keeping previous value"
                        ),
                    }
                }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_name_is_known() {
        let line = Line::from_points((0.0, 1.0), (1.0, 3.0)).unwrap();
        for name in line.property_names() {
            assert!(line.property(name).is_some(), "{name}");
        }
        assert_eq!(line.property("colour"), None);
        assert_eq!(line.property("slope"), Some(Number(2.0)));
    }

    #[test]
    fn mirrored_parameter_follows_the_source() {
        let circle = Circle::new((0.0, 0.0), 1.0).unwrap();
        let tri = Triangle::new((0.0, 0.0), (4.0, 0.0), (0.0, 3.0)).unwrap();
        let area = Parameter::from_property(&tri, "area").unwrap();
        assert_eq!(area.value(), 6.0);
        assert!(area.is_computed());

        tri.point_index(1).unwrap().set(8.0, 0.0).unwrap();
        assert_eq!(area.value(), 12.0);

        assert!(Parameter::from_property(&circle, "center").is_none());
        assert!(Parameter::from_property(&circle, "colour").is_none());
    }

    #[test]
    fn mirrored_point_keeps_last_position_when_undefined() {
        let a = Line::from_points((0.0, 0.0), (1.0, 0.0)).unwrap();
        let b = Line::from_points((0.0, -1.0), (0.0, 1.0)).unwrap();
        let ix = Intersection::line_line(&a, &b);
        let mirror = Point::from_property(&ix, "first").unwrap();
        assert_eq!(mirror.position(), DVec3::ZERO);

        // Rotate b until it is parallel to a: no intersection any more
        b.start().set(-1.0, 1.0).unwrap();
        b.end().set(1.0, 1.0).unwrap();
        assert!(ix.is_empty());
        assert_eq!(mirror.position(), DVec3::new(0.0, 0.0, 0.0));
    }
}
