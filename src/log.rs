//! Conditional logging macros.
//!
//! When the `tracing` feature is enabled, these re-export `tracing` macros.
//! When disabled, they expand to no-ops so the model costs nothing to a host
//! that does not collect traces.

#[cfg(feature = "tracing")]
pub use tracing::{debug, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __geomodel_debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __geomodel_warn {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{__geomodel_debug as debug, __geomodel_warn as warn};
