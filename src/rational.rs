use std::fmt;

use num_integer::Integer;
use num_traits::ToPrimitive;
use snafu::prelude::*;

use crate::{
    InvalidCoefficientsSnafu, NonFiniteSnafu, OverflowSnafu, TabvarError,
    tolerance::{self, RELATIVE},
};

/// Upper bound on continued fraction terms. Convergent denominators grow at least as fast
/// as the Fibonacci numbers, so this is far beyond what an `i64` can hold.
const MAX_TERMS: usize = 64;

/// An exact fraction in lowest terms with a positive denominator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    num: i64,
    den: i64,
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, den: 1 };

    /// Build `num/den` in lowest terms, moving the sign onto the numerator.
    pub fn new(num: i64, den: i64) -> Result<Self, TabvarError> {
        ensure!(
            den != 0,
            InvalidCoefficientsSnafu {
                reason: format!("fraction {num}/0 has a zero denominator"),
            }
        );
        let g = num.gcd(&den);
        let sign = if den < 0 { -1 } else { 1 };
        Ok(Self {
            num: sign * num / g,
            den: sign * den / g,
        })
    }

    pub const fn integer(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    pub fn numer(&self) -> i64 {
        self.num
    }

    pub fn denom(&self) -> i64 {
        self.den
    }

    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    pub fn is_negative(&self) -> bool {
        self.num < 0
    }

    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl std::ops::Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            num: -self.num,
            den: self.den,
        }
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Rational::integer(n)
    }
}

/// Typeset form: `3`, `\frac{1}{2}` or `-\frac{1}{2}`.
impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else if self.num < 0 {
            write!(f, "-\\frac{{{}}}{{{}}}", -self.num, self.den)
        } else {
            write!(f, "\\frac{{{}}}{{{}}}", self.num, self.den)
        }
    }
}

/// Convert `x` to a small-denominator fraction lying within `|x|·10⁻⁶` of it.
///
/// Integer-valued input (zero included) is returned directly. Otherwise the continued
/// fraction of `x` is expanded, accumulating convergents `h/k`, until the tolerance is met.
/// The convergent found is expanded again until it reproduces itself, so approximating an
/// approximation is a no-op.
///
/// The stop test is relative, so exact recovery of `p/q` is only guaranteed for
/// `|p/q| ≤ 1` and `q ≤ 1000`. Larger fractions may come back as a nearby convergent:
/// `1742/581` gives `1739/580`.
///
/// # Errors
/// [`TabvarError::NonFinite`] for `NaN` or infinite input, [`TabvarError::Overflow`] when a
/// convergent no longer fits in an `i64`.
pub fn approximate(x: f64) -> Result<Rational, TabvarError> {
    ensure!(x.is_finite(), NonFiniteSnafu { value: x });

    let mut best = expand(x)?;
    loop {
        // Each pass can only shorten the expansion, so this terminates.
        let again = expand(best.to_f64())?;
        if again == best {
            return Ok(best);
        }
        best = again;
    }
}

fn expand(x: f64) -> Result<Rational, TabvarError> {
    // Covers zero, where the expansion is undefined.
    if let Some(n) = tolerance::nearest_integer(x) {
        let n = n.to_i64().context(OverflowSnafu { value: x })?;
        return Ok(Rational::integer(n));
    }

    let limit = x.abs() * RELATIVE;
    let (mut h1, mut h2) = (1i64, 0i64);
    let (mut k1, mut k2) = (0i64, 1i64);
    let mut b = x;

    for _ in 0..MAX_TERMS {
        let a = b.floor();
        let term = a.to_i64().context(OverflowSnafu { value: x })?;

        let h = term
            .checked_mul(h1)
            .and_then(|v| v.checked_add(h2))
            .context(OverflowSnafu { value: x })?;
        let k = term
            .checked_mul(k1)
            .and_then(|v| v.checked_add(k2))
            .context(OverflowSnafu { value: x })?;
        (h2, h1) = (h1, h);
        (k2, k1) = (k1, k);

        if (x - h1 as f64 / k1 as f64).abs() <= limit {
            break;
        }
        let remainder = b - a;
        if remainder == 0.0 {
            break;
        }
        b = 1.0 / remainder;
    }

    Rational::new(h1, k1)
}

#[cfg(test)]
mod tests {
    use assertables::{assert_err, assert_ok};
    use pretty_assertions as pa;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn zero_short_circuits() {
        let r = assert_ok!(approximate(0.0));
        pa::assert_eq!(r, Rational::ZERO);
        let r = assert_ok!(approximate(-0.0));
        pa::assert_eq!(r, Rational::ZERO);
    }

    #[test]
    fn integers_pass_through() {
        pa::assert_eq!(approximate(7.0).unwrap(), Rational::integer(7));
        pa::assert_eq!(approximate(-12.0).unwrap(), Rational::integer(-12));
        pa::assert_eq!(approximate(0.1 * 30.0).unwrap(), Rational::integer(3));
    }

    #[test]
    fn simple_fractions() {
        pa::assert_eq!(approximate(0.5).unwrap(), Rational::new(1, 2).unwrap());
        pa::assert_eq!(approximate(-0.75).unwrap(), Rational::new(-3, 4).unwrap());
        pa::assert_eq!(approximate(1.0 / 3.0).unwrap(), Rational::new(1, 3).unwrap());
        pa::assert_eq!(approximate(-22.0 / 7.0).unwrap(), Rational::new(-22, 7).unwrap());
    }

    #[test]
    fn irrational_input_gets_a_close_convergent() {
        let r = approximate(std::f64::consts::SQRT_2).unwrap();
        assert!((r.to_f64() - std::f64::consts::SQRT_2).abs() <= std::f64::consts::SQRT_2 * 2e-6);
        assert!(r.denom() < 2000);
    }

    #[test]
    fn large_fractions_may_land_on_a_neighbour() {
        // Outside |p/q| ≤ 1 the relative stop test accepts an earlier convergent.
        let r = approximate(1742.0 / 581.0).unwrap();
        pa::assert_eq!(r, Rational::new(1739, 580).unwrap());
        assert!((r.to_f64() - 1742.0 / 581.0).abs() <= 1742.0 / 581.0 * RELATIVE);
    }

    #[test]
    fn non_finite_is_rejected() {
        assert_err!(approximate(f64::NAN));
        assert_err!(approximate(f64::INFINITY));
        assert_err!(approximate(f64::NEG_INFINITY));
    }

    #[test]
    fn huge_values_overflow() {
        assert!(matches!(
            approximate(1e30),
            Err(TabvarError::Overflow { .. })
        ));
    }

    #[test]
    fn new_normalizes_sign_and_terms() {
        let r = Rational::new(6, -8).unwrap();
        pa::assert_eq!((r.numer(), r.denom()), (-3, 4));
        assert_err!(Rational::new(1, 0));
    }

    #[test]
    fn display_is_typeset() {
        pa::assert_eq!(Rational::integer(-4).to_string(), "-4");
        pa::assert_eq!(Rational::new(3, 2).unwrap().to_string(), "\\frac{3}{2}");
        pa::assert_eq!(Rational::new(-3, 2).unwrap().to_string(), "-\\frac{3}{2}");
    }

    proptest! {
        #[test]
        fn round_trips_small_denominators(q in 1i64..=1000, p_frac in -1.0f64..=1.0) {
            let p = (p_frac * q as f64).round() as i64;
            let expected = Rational::new(p, q).unwrap();
            prop_assert_eq!(approximate(p as f64 / q as f64).unwrap(), expected);
        }

        #[test]
        fn approximation_is_idempotent(x in -1.0e4f64..1.0e4) {
            let once = approximate(x).unwrap();
            prop_assert_eq!(approximate(once.to_f64()).unwrap(), once);
        }
    }
}
