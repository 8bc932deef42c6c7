//! Number and term formatting for LaTeX equation strings.

/// Format `v` with at most `precision` decimals, trailing zeros trimmed.
pub fn num(v: f64, precision: usize) -> String {
    let s = format!("{:.*}", precision, v);
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s == "-0" { "0".to_string() } else { s }
}

/// `x - 3`, `x + 3`, or `x` when the shift rounds to zero.
pub fn shifted(var: &str, value: f64, precision: usize) -> String {
    let mag = num(value.abs(), precision);
    if mag == "0" {
        var.to_string()
    } else if value > 0.0 {
        format!("{var} - {mag}")
    } else {
        format!("{var} + {mag}")
    }
}

/// `2x - y + 3` from `[(2, "x"), (-1, "y"), (3, "")]`.
///
/// Terms whose coefficient rounds to zero are dropped; an empty sum is `0`.
pub fn linear_combination(terms: &[(f64, &str)], precision: usize) -> String {
    let mut out = String::new();
    for &(coef, var) in terms {
        let mag = num(coef.abs(), precision);
        if mag == "0" {
            continue;
        }
        let body = match (mag.as_str(), var.is_empty()) {
            ("1", false) => var.to_string(),
            (_, true) => mag,
            (m, false) => format!("{m}{var}"),
        };
        if out.is_empty() {
            if coef < 0.0 {
                out.push('-');
            }
        } else {
            out.push_str(if coef < 0.0 { " - " } else { " + " });
        }
        out.push_str(&body);
    }
    if out.is_empty() { "0".to_string() } else { out }
}

pub fn frac(numerator: &str, denominator: &str) -> String {
    format!("\\frac{{{numerator}}}{{{denominator}}}")
}

pub fn degrees(value: f64, precision: usize) -> String {
    format!("{}^\\circ", num(value, precision))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_trim_trailing_zeros() {
        assert_eq!(num(2.0, 2), "2");
        assert_eq!(num(2.5, 2), "2.5");
        assert_eq!(num(1.0 / 3.0, 2), "0.33");
        assert_eq!(num(-0.0001, 2), "0");
    }

    #[test]
    fn shifted_flips_sign() {
        assert_eq!(shifted("x", 3.0, 2), "x - 3");
        assert_eq!(shifted("y", -1.5, 2), "y + 1.5");
        assert_eq!(shifted("x", 0.0, 2), "x");
    }

    #[test]
    fn linear_combination_skips_zero_and_unit_coefficients() {
        assert_eq!(
            linear_combination(&[(2.0, "x"), (-1.0, "y"), (3.0, "")], 2),
            "2x - y + 3"
        );
        assert_eq!(linear_combination(&[(0.0, "x"), (-4.0, "")], 2), "-4");
        assert_eq!(linear_combination(&[(0.0, "x")], 2), "0");
    }
}
