//! The reactive geometry model
//!
//! This module is organized into submodules:
//! - `observable`: Emitter, the Observable trait and the Derived wiring helper
//! - `point`, `parameter`: leaf entities that are mutated directly
//! - `animation`: tweens and a fixed-step driver for parameters
//! - `line`, `circle`, `polygon`, `triangle`, `angle`: derived shapes
//! - `intersection`: live intersection points of two shapes
//! - `plot`, `trace`: function plots and points riding along shapes
//! - `property`: named entity properties and mirroring
//! - `geometry`: plain analytic kernels on glam vectors
//! - `latex`: number and equation formatting

pub mod angle;
pub mod animation;
pub mod circle;
pub mod geometry;
pub mod intersection;
pub mod latex;
pub mod line;
pub mod observable;
pub mod parameter;
pub mod plot;
pub mod point;
pub mod polygon;
pub mod property;
pub mod trace;
pub mod triangle;

// Re-export commonly used items
pub use angle::Angle;
pub use animation::{AnimationDriver, Easing, FixedStepDriver, Tween};
pub use circle::Circle;
pub use intersection::{
    CircleCircle, Intersection, LineCircle, LineLine, LinePolygon, PolygonPolygon, ShapePair,
    Solve,
};
pub use line::Line;
pub use observable::{Derived, Emitter, Observable};
pub use parameter::{ChainedParameter, Parameter};
pub use plot::{Plot, PlotKind, PlotSource};
pub use point::Point;
pub use polygon::Polygon;
pub use property::{Properties, PropertyValue};
pub use trace::Track;
pub use triangle::Triangle;
