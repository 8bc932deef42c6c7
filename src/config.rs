//! Tolerances and formatting defaults.

/// Model configuration (tolerances and output precision).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelConfig {
    /// Parallel / zero-length detection
    pub eps: f64,
    /// Distance band around the radius treated as tangency
    pub tangent_eps: f64,
    /// Results closer than this are merged into one point
    pub merge_eps: f64,
    /// Decimals kept when formatting LaTeX numbers (trailing zeros trimmed)
    pub latex_precision: usize,
    /// Default sample count for plots
    pub plot_samples: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            eps: 1e-9,
            tangent_eps: 1e-7,
            merge_eps: 1e-7,
            latex_precision: 2,
            plot_samples: 200,
        }
    }
}

impl ModelConfig {
    /// The configuration used by constructors that do not take one.
    pub fn global() -> Self {
        Self::default()
    }

    pub fn with_eps(self, eps: f64) -> Self {
        Self { eps, ..self }
    }

    pub fn with_latex_precision(self, latex_precision: usize) -> Self {
        Self {
            latex_precision,
            ..self
        }
    }
}
