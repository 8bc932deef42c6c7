//! A reactive geometry model.
//!
//! Points and parameters are the leaves. Lines, circles, triangles, angles,
//! intersections, plots and traced points are derived from them and recompute
//! synchronously whenever something upstream changes:
//!
//! ```
//! use geomodel::prelude::*;
//!
//! let a = Line::from_points((-3.0, 0.0), (3.0, 0.0)).unwrap();
//! let b = Line::from_points((0.0, -2.0), (0.0, 2.0)).unwrap();
//! let ix = Intersection::line_line(&a, &b);
//! assert_eq!(ix.len(), 1);
//!
//! b.start().set(1.0, -2.0).unwrap();
//! b.end().set(1.0, 2.0).unwrap();
//! assert!((ix.positions()[0].x - 1.0).abs() < 1e-12);
//! ```
//!
//! Equation strings such as `"x**2 + y**2 = 4"` or `"y = 2x + 1"` are parsed
//! with a pest grammar (see [`parse`]) and recognised in [`algebra`].
#![cfg_attr(not(feature = "tracing"), allow(unused_variables))]

use pest_derive::Parser;

pub mod algebra;
pub mod ast;
pub mod config;
pub mod errors;
pub mod log;
pub mod model;
pub mod parse;
pub mod types;

#[derive(Parser)]
#[grammar = "equation.pest"]
pub struct EquationParser;

pub use config::ModelConfig;
pub use errors::{EvalError, ModelError, ParseError};
pub use types::{Degrees, NumericError, PointLike, Value};

/// Everything needed to build and observe a model.
pub mod prelude {
    pub use crate::config::ModelConfig;
    pub use crate::errors::{EvalError, ModelError, ParseError};
    pub use crate::model::{
        Angle, AnimationDriver, ChainedParameter, Circle, Easing, FixedStepDriver, Intersection,
        Line, Observable, Parameter, Plot, PlotKind, PlotSource, Point, Polygon, Properties,
        PropertyValue, ShapePair, Track, Triangle, Tween,
    };
    pub use crate::types::{Degrees, PointLike, Value};
}
