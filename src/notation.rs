use crate::{FunctionKind, TabvarError, approximate, tolerance};

/// Typeset `terms` (highest exponent first) as a polynomial in `var`.
///
/// Zero terms are dropped and unit coefficients are written as a bare sign, except on the
/// constant term. A polynomial with no non-zero term is written `0`.
pub fn polynomial(terms: &[(f64, u8)], var: &str) -> Result<String, TabvarError> {
    let mut block = String::new();

    for &(coeff, exp) in terms.iter().filter(|(coeff, _)| !tolerance::is_zero(*coeff)) {
        let value = approximate(coeff)?;
        let leading = block.is_empty();
        if !leading && !value.is_negative() {
            block.push('+');
        }

        if exp == 0 {
            block.push_str(&value.to_string());
            continue;
        }
        match (value.numer(), value.denom()) {
            (1, 1) => {}
            (-1, 1) => block.push('-'),
            _ => block.push_str(&value.to_string()),
        }
        block.push_str(var);
        if exp > 1 {
            block.push_str(&format!("^{exp}"));
        }
    }

    if block.is_empty() {
        return Ok("0".to_owned());
    }
    Ok(rewrite(&block))
}

/// Clean up the artifacts of term-by-term concatenation and switch to display-style
/// fractions. Applying it twice changes nothing.
pub fn rewrite(block: &str) -> String {
    let mut out = block.replace("++", "+").replace("+-", "-");
    if let Some(stripped) = out.strip_suffix("+0") {
        out = stripped.to_owned();
    }
    out.replace("\\dfrac", "\\frac").replace("\\frac", "\\dfrac")
}

/// The right-hand side of `y = ...` for `kind`, in `x`.
pub fn function(kind: &FunctionKind) -> Result<String, TabvarError> {
    let num = polynomial(&kind.numerator(), "x")?;
    match kind.denominator() {
        Some(den) => Ok(format!("\\dfrac{{{num}}}{{{}}}", polynomial(&den, "x")?)),
        None => Ok(num),
    }
}

#[cfg(test)]
mod tests {
    use assertables::{assert_contains, assert_not_contains};
    use pretty_assertions as pa;

    use super::*;

    fn quadratic(a: f64, b: f64, c: f64) -> String {
        function(&FunctionKind::Quadratic { a, b, c }).unwrap()
    }

    #[test]
    fn zero_terms_are_omitted() {
        let text = quadratic(1.0, 0.0, -3.0);
        pa::assert_eq!(text, "x^2-3");
        assert_contains!(text, "x^2");
        assert_contains!(text, "-3");
        assert_not_contains!(text, "+0");
        assert_not_contains!(text, "++");
    }

    #[test]
    fn missing_leading_term_reads_as_linear() {
        pa::assert_eq!(quadratic(0.0, 5.0, 2.0), "5x+2");
    }

    #[test]
    fn unit_coefficients_become_signs() {
        let kind = FunctionKind::Cubic {
            a: -1.0,
            b: 0.5,
            c: 1.0,
            d: 0.0,
        };
        pa::assert_eq!(function(&kind).unwrap(), "-x^3+\\dfrac{1}{2}x^2+x");
        pa::assert_eq!(quadratic(-1.0, -1.0, -1.0), "-x^2-x-1");
        pa::assert_eq!(quadratic(0.0, 0.0, 1.0), "1");
    }

    #[test]
    fn all_zero_is_zero() {
        pa::assert_eq!(quadratic(0.0, 0.0, 0.0), "0");
    }

    #[test]
    fn negative_fractions_keep_one_sign() {
        pa::assert_eq!(quadratic(2.0, -0.25, 0.0), "2x^2-\\dfrac{1}{4}x");
    }

    #[test]
    fn rational_kinds_are_stacked() {
        let kind = FunctionKind::Rational11 {
            a: 1.0,
            b: 0.0,
            c: 1.0,
            d: -1.0,
        };
        pa::assert_eq!(function(&kind).unwrap(), "\\dfrac{x}{x-1}");

        let kind = FunctionKind::Rational21 {
            a: 1.0,
            b: 0.0,
            c: 1.0,
            m: 2.0,
            n: 0.0,
        };
        pa::assert_eq!(function(&kind).unwrap(), "\\dfrac{x^2+1}{2x}");
    }

    #[test]
    fn biquadratic_skips_odd_powers() {
        let kind = FunctionKind::Biquadratic {
            a: 1.0,
            b: -2.0,
            c: 0.0,
        };
        pa::assert_eq!(function(&kind).unwrap(), "x^4-2x^2");
    }

    #[test]
    fn rewrite_is_idempotent() {
        let once = rewrite("x^2++\\frac{1}{2}x+-3+0");
        pa::assert_eq!(once, "x^2+\\dfrac{1}{2}x-3");
        pa::assert_eq!(rewrite(&once), once);
        // Only a trailing "+0" is an artifact.
        pa::assert_eq!(rewrite("x+0.5"), "x+0.5");
    }
}
