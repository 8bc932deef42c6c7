//! Small typed values shared across the model.
//!
//! - `NumericError`: validation failures for raw floats
//! - `Degrees`: angle measure used for display values
//! - `PointLike`: "coordinates or an existing point" at API boundaries
//! - `Value`: "a fixed number or a live parameter" for driven quantities

use std::fmt;
use std::rc::Rc;

use glam::{DVec2, DVec3};

use crate::model::{Observable, Parameter, Point};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Reject NaN and infinities.
#[inline]
pub fn finite(val: f64) -> Result<f64, NumericError> {
    if val.is_nan() {
        Err(NumericError::NaN)
    } else if val.is_infinite() {
        Err(NumericError::Infinite)
    } else {
        Ok(val)
    }
}

/// Reject anything that is not a finite, strictly positive number.
#[inline]
pub fn positive(val: f64) -> Result<f64, NumericError> {
    let val = finite(val)?;
    if val == 0.0 {
        Err(NumericError::Zero)
    } else if val < 0.0 {
        Err(NumericError::Negative)
    } else {
        Ok(val)
    }
}

/// Validate all three components of a coordinate triple.
#[inline]
pub fn finite_vec(v: DVec3) -> Result<DVec3, NumericError> {
    finite(v.x)?;
    finite(v.y)?;
    finite(v.z)?;
    Ok(v)
}

/// Angle in degrees
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl Degrees {
    #[inline]
    pub fn from_radians(rad: f64) -> Self {
        Degrees(rad.to_degrees())
    }

    #[inline]
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Something that can be interpreted as a point.
///
/// Plain coordinates become a fresh, freely movable point; a reference is
/// shared so the caller keeps control of it.
#[derive(Clone, Debug)]
pub enum PointLike {
    Coordinates(DVec3),
    Reference(Rc<Point>),
}

impl PointLike {
    /// Resolve to a point handle.
    ///
    /// Non-finite coordinates are rejected here so no point ever holds them.
    pub fn into_point(self) -> Result<Rc<Point>, NumericError> {
        match self {
            PointLike::Coordinates(v) => Ok(Point::at(finite_vec(v)?)),
            PointLike::Reference(p) => Ok(p),
        }
    }

    /// Current position without creating anything
    pub fn position(&self) -> DVec3 {
        match self {
            PointLike::Coordinates(v) => *v,
            PointLike::Reference(p) => p.position(),
        }
    }
}

impl From<(f64, f64)> for PointLike {
    fn from((x, y): (f64, f64)) -> Self {
        PointLike::Coordinates(DVec3::new(x, y, 0.0))
    }
}

impl From<(f64, f64, f64)> for PointLike {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        PointLike::Coordinates(DVec3::new(x, y, z))
    }
}

impl From<[f64; 2]> for PointLike {
    fn from([x, y]: [f64; 2]) -> Self {
        PointLike::Coordinates(DVec3::new(x, y, 0.0))
    }
}

impl From<DVec2> for PointLike {
    fn from(v: DVec2) -> Self {
        PointLike::Coordinates(v.extend(0.0))
    }
}

impl From<DVec3> for PointLike {
    fn from(v: DVec3) -> Self {
        PointLike::Coordinates(v)
    }
}

impl From<Rc<Point>> for PointLike {
    fn from(p: Rc<Point>) -> Self {
        PointLike::Reference(p)
    }
}

impl From<&Rc<Point>> for PointLike {
    fn from(p: &Rc<Point>) -> Self {
        PointLike::Reference(Rc::clone(p))
    }
}

/// A scalar input that is either fixed or driven by a parameter.
#[derive(Clone, Debug)]
pub enum Value {
    Fixed(f64),
    Param(Rc<Parameter>),
}

impl Value {
    /// Current scalar
    pub fn get(&self) -> f64 {
        match self {
            Value::Fixed(v) => *v,
            Value::Param(p) => p.value(),
        }
    }

    /// Reject a fixed NaN or infinity. Parameters are validated on write.
    pub fn checked(self) -> Result<Value, NumericError> {
        match self {
            Value::Fixed(v) => Ok(Value::Fixed(finite(v)?)),
            param => Ok(param),
        }
    }

    /// The parameter to subscribe to, if any
    pub fn source(&self) -> Option<Rc<dyn Observable>> {
        match self {
            Value::Fixed(_) => None,
            Value::Param(p) => Some(Rc::clone(p) as Rc<dyn Observable>),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Fixed(v)
    }
}

impl From<Rc<Parameter>> for Value {
    fn from(p: Rc<Parameter>) -> Self {
        Value::Param(p)
    }
}

impl From<&Rc<Parameter>> for Value {
    fn from(p: &Rc<Parameter>) -> Self {
        Value::Param(Rc::clone(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_rejects_nan_and_infinity() {
        assert_eq!(finite(f64::NAN), Err(NumericError::NaN));
        assert_eq!(finite(f64::INFINITY), Err(NumericError::Infinite));
        assert_eq!(finite(-3.5), Ok(-3.5));
    }

    #[test]
    fn positive_rejects_zero_and_negative() {
        assert_eq!(positive(0.0), Err(NumericError::Zero));
        assert_eq!(positive(-1.0), Err(NumericError::Negative));
        assert_eq!(positive(2.0), Ok(2.0));
    }

    #[test]
    fn fixed_values_must_be_finite() {
        assert_eq!(Value::from(f64::NAN).checked().unwrap_err(), NumericError::NaN);
        assert_eq!(Value::from(2.0).checked().unwrap().get(), 2.0);
    }

    #[test]
    fn point_like_coordinates_make_fresh_points() {
        let a = PointLike::from((1.0, 2.0)).into_point().unwrap();
        let b = PointLike::from((1.0, 2.0)).into_point().unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(a.position(), DVec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn point_like_reference_is_shared() {
        let p = Point::new(3.0, 4.0);
        let q = PointLike::from(&p).into_point().unwrap();
        assert!(Rc::ptr_eq(&p, &q));
    }

    #[test]
    fn point_like_rejects_nan() {
        assert!(PointLike::from((f64::NAN, 0.0)).into_point().is_err());
    }

    #[test]
    fn degrees_round_trip_radians() {
        let d = Degrees::from_radians(std::f64::consts::FRAC_PI_2);
        assert!((d.raw() - 90.0).abs() < 1e-12);
        assert!((d.to_radians() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
