use std::fmt;

use num_integer::{Integer, Roots};
use snafu::prelude::*;

use crate::{
    InvalidCoefficientsSnafu, OverflowSnafu, Rational, TabvarError, approximate, tolerance,
};

/// `(x + y·√z) / w` with `z > 1` square-free, `y != 0` and `w > 0`.
///
/// Only constructed through [`Exact::surd`], which collapses the rational cases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Surd {
    x: i64,
    y: i64,
    z: u64,
    w: i64,
}

impl Surd {
    pub fn parts(&self) -> (i64, i64, u64, i64) {
        (self.x, self.y, self.z, self.w)
    }

    pub fn to_f64(&self) -> f64 {
        (self.x as f64 + self.y as f64 * (self.z as f64).sqrt()) / self.w as f64
    }
}

impl fmt::Display for Surd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Surd { x, y, z, w } = *self;
        if x == 0 && y < 0 && w != 1 {
            // -\frac{\sqrt{3}}{2} reads better than \frac{-\sqrt{3}}{2}
            return write!(f, "-{}", Surd { x, y: -y, z, w });
        }

        let mut top = String::new();
        if x != 0 {
            top.push_str(&x.to_string());
            if y > 0 {
                top.push('+');
            }
        }
        match y {
            1 => {}
            -1 => top.push('-'),
            _ => top.push_str(&y.to_string()),
        }
        top.push_str(&format!("\\sqrt{{{z}}}"));

        if w == 1 {
            write!(f, "{top}")
        } else {
            write!(f, "\\frac{{{top}}}{{{w}}}")
        }
    }
}

/// An exactly displayable real number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Exact {
    Rational(Rational),
    Surd(Surd),
}

impl Exact {
    /// Normalize `(x + y·√z) / w`: pull square factors out of `z`, make `w` positive and
    /// divide out the common factor of `x`, `y` and `w`. Degenerates to a rational when
    /// the radical vanishes.
    pub fn surd(x: i64, y: i64, z: u64, w: i64) -> Result<Self, TabvarError> {
        ensure!(
            w != 0,
            InvalidCoefficientsSnafu {
                reason: "surd with a zero denominator",
            }
        );
        let (outside, inside) = square_free_split(z);
        let overflow = OverflowSnafu { value: z as f64 };
        let outside = i64::try_from(outside).ok().context(overflow)?;
        let (mut x, mut y, mut w) = (x, y.checked_mul(outside).context(overflow)?, w);

        if y == 0 || inside == 0 {
            return Ok(Exact::Rational(Rational::new(x, w)?));
        }
        if inside == 1 {
            let num = x.checked_add(y).context(overflow)?;
            return Ok(Exact::Rational(Rational::new(num, w)?));
        }

        if w < 0 {
            (x, y, w) = (-x, -y, -w);
        }
        let g = x.gcd(&y).gcd(&w);
        Ok(Exact::Surd(Surd {
            x: x / g,
            y: y / g,
            z: inside,
            w: w / g,
        }))
    }

    /// `√r` for a non-negative rational, written as `√(pq)/q`.
    pub fn sqrt(r: Rational) -> Result<Self, TabvarError> {
        ensure!(
            !r.is_negative(),
            InvalidCoefficientsSnafu {
                reason: format!("square root of the negative value {r}"),
            }
        );
        let radicand = r
            .numer()
            .checked_mul(r.denom())
            .and_then(|v| u64::try_from(v).ok())
            .context(OverflowSnafu { value: r.to_f64() })?;
        Exact::surd(0, 1, radicand, r.denom())
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Exact::Rational(r) => r.to_f64(),
            Exact::Surd(s) => s.to_f64(),
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Exact::Rational(Rational::ZERO)
    }
}

impl std::ops::Neg for Exact {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Exact::Rational(r) => Exact::Rational(-r),
            Exact::Surd(s) => Exact::Surd(Surd {
                x: -s.x,
                y: -s.y,
                ..s
            }),
        }
    }
}

impl From<Rational> for Exact {
    fn from(r: Rational) -> Self {
        Exact::Rational(r)
    }
}

impl fmt::Display for Exact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exact::Rational(r) => r.fmt(f),
            Exact::Surd(s) => s.fmt(f),
        }
    }
}

/// Split `n` into `(q, r)` with `n = q²·r` and `r` square-free.
///
/// Trial division runs while `p³ <= m` for the unfactored remainder `m`. What is left then
/// has at most two prime factors, so it is either a perfect square or square-free.
pub fn square_free_split(n: u64) -> (u64, u64) {
    if n == 0 {
        return (0, 0);
    }
    let (mut outside, mut inside) = (1u64, 1u64);
    let mut m = n;
    let mut p = 2u64;
    while p.saturating_mul(p).saturating_mul(p) <= m {
        let mut count = 0u32;
        while m % p == 0 {
            m /= p;
            count += 1;
        }
        outside *= p.pow(count / 2);
        if count % 2 == 1 {
            inside *= p;
        }
        p += if p == 2 { 1 } else { 2 };
    }

    let root = Roots::sqrt(&m);
    if m > 1 && root * root == m {
        outside *= root;
    } else {
        inside *= m;
    }
    (outside, inside)
}

/// Real roots of `a·x² + b·x + c = 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuadraticRoots {
    NoRealRoot,
    Double(Rational),
    /// Ascending.
    Distinct(Exact, Exact),
}

/// Solve `a·x² + b·x + c = 0` exactly.
///
/// The coefficients are approximated as rationals and scaled to coprime integers, so the
/// discriminant is an exact integer. Roots are rational when it is a perfect square, and
/// otherwise share the form `(x ∓ y·√n) / w` with `n` square-free. The denominator is
/// made positive by flipping every sign when `a < 0`, which keeps the smaller root first.
pub fn solve(a: f64, b: f64, c: f64) -> Result<QuadraticRoots, TabvarError> {
    ensure!(
        !tolerance::is_zero(a),
        InvalidCoefficientsSnafu {
            reason: "a quadratic needs a non-zero leading coefficient",
        }
    );
    let [a, b, c] = integer_coefficients([a, b, c])?;
    let overflow = || OverflowSnafu {
        value: (b as f64).powi(2),
    };

    let disc = b
        .checked_mul(b)
        .zip(a.checked_mul(c).and_then(|ac| ac.checked_mul(4)))
        .and_then(|(bb, ac4)| bb.checked_sub(ac4))
        .with_context(overflow)?;

    if disc < 0 {
        return Ok(QuadraticRoots::NoRealRoot);
    }

    let (x, w) = if a > 0 { (-b, 2 * a) } else { (b, -2 * a) };
    let x = i64::try_from(x).ok().with_context(overflow)?;
    let w = i64::try_from(w).ok().with_context(overflow)?;

    if disc == 0 {
        return Ok(QuadraticRoots::Double(Rational::new(x, w)?));
    }
    let disc = u64::try_from(disc).ok().with_context(overflow)?;
    log::debug!("quadratic ({a}, {b}, {c}) has discriminant {disc}");

    Ok(QuadraticRoots::Distinct(
        Exact::surd(x, -1, disc, w)?,
        Exact::surd(x, 1, disc, w)?,
    ))
}

fn integer_coefficients(coeffs: [f64; 3]) -> Result<[i128; 3], TabvarError> {
    let mut rationals = [Rational::ZERO; 3];
    for (r, &c) in rationals.iter_mut().zip(&coeffs) {
        *r = approximate(c)?;
    }
    let common_den = rationals
        .iter()
        .fold(1i128, |acc, r| acc.lcm(&(r.denom() as i128)));

    let mut scaled = rationals.map(|r| r.numer() as i128 * (common_den / r.denom() as i128));
    let g = scaled.iter().fold(0i128, |acc, v| acc.gcd(v));
    if g > 1 {
        for v in scaled.iter_mut() {
            *v /= g;
        }
    }
    Ok(scaled)
}
