//! Error types with rich diagnostics using miette
//!
//! Parse errors carry source spans so malformed equation strings point at the
//! offending text. Model errors describe misuse of the reactive graph.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::types::NumericError;

/// Source context for error reporting
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Name of the source ("<equation>", "<expression>", ...)
    pub name: String,
    /// The full source text
    pub source: String,
}

impl SourceContext {
    /// Create a new source context
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a NamedSource for miette
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.clone())
    }

    /// Span covering the whole source
    pub fn full_span(&self) -> SourceSpan {
        (0, self.source.len()).into()
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Errors raised while turning an equation string into something usable
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("syntax error: {message}")]
    #[diagnostic(code(geomodel::parse::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("unknown function: {name}")]
    #[diagnostic(
        code(geomodel::parse::unknown_function),
        help("supported functions: sin, cos, tan, asin, acos, atan, sqrt, exp, ln, log, abs")
    )]
    UnknownFunction {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not a known function")]
        span: SourceSpan,
    },

    #[error("expected an equation with `=`")]
    #[diagnostic(
        code(geomodel::parse::missing_equals),
        help("write both sides, e.g. `2x + 3y - 6 = 0`")
    )]
    MissingEquals {
        #[source_code]
        src: NamedSource<String>,
        #[label("no `=` in this input")]
        span: SourceSpan,
    },

    #[error("not a polynomial in x and y: {reason}")]
    #[diagnostic(code(geomodel::parse::not_polynomial))]
    NotPolynomial {
        reason: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("cannot extract coefficients")]
        span: SourceSpan,
    },

    #[error("not a line equation: {reason}")]
    #[diagnostic(
        code(geomodel::parse::not_linear),
        help("a line has the form `Ax + By + C = 0` with A and B not both zero")
    )]
    NotLinear {
        reason: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("this equation")]
        span: SourceSpan,
    },

    #[error("not a circle equation: {reason}")]
    #[diagnostic(
        code(geomodel::parse::not_circle),
        help("a circle has the form `(x - h)^2 + (y - k)^2 = r^2` with r > 0")
    )]
    NotCircle {
        reason: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("this equation")]
        span: SourceSpan,
    },
}

// ============================================================================
// Evaluation Errors
// ============================================================================

/// Errors that occur while evaluating a parsed expression
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("unbound variable: {name}")]
    #[diagnostic(
        code(geomodel::eval::unbound_variable),
        help("bind it to a parameter or use one of the plot variables")
    )]
    UnboundVariable { name: String },

    #[error("division by zero")]
    #[diagnostic(code(geomodel::eval::division_by_zero))]
    DivisionByZero,

    #[error("{function} is undefined at {value}")]
    #[diagnostic(code(geomodel::eval::domain))]
    Domain { function: &'static str, value: f64 },

    #[error("result is NaN or infinite")]
    #[diagnostic(code(geomodel::eval::non_finite))]
    NonFinite,
}

// ============================================================================
// Model Errors
// ============================================================================

/// Errors from building or mutating entities of the model
#[derive(Error, Diagnostic, Debug)]
pub enum ModelError {
    #[error("invalid index {index} for {entity} (has {len})")]
    #[diagnostic(code(geomodel::model::invalid_index))]
    InvalidIndex {
        entity: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{entity} is computed from other entities and cannot be set directly")]
    #[diagnostic(
        code(geomodel::model::computed_entity),
        help("move one of the entities it depends on instead")
    )]
    ComputedEntity { entity: &'static str },

    #[error("invalid coordinate or value: {0}")]
    #[diagnostic(code(geomodel::model::numeric))]
    Numeric(#[from] NumericError),

    #[error("invalid radius: {value}")]
    #[diagnostic(code(geomodel::model::invalid_radius), help("radius must be > 0"))]
    InvalidRadius { value: f64 },

    #[error("{entity} needs at least {needed} vertices, got {got}")]
    #[diagnostic(code(geomodel::model::too_few_vertices))]
    TooFewVertices {
        entity: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("cannot trace along this shape: {reason}")]
    #[diagnostic(code(geomodel::model::unsupported_track))]
    UnsupportedTrack { reason: &'static str },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),
}
