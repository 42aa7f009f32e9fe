use std::{fmt, str::FromStr};

use arrayvec::ArrayVec;
use fmtastic::Superscript;
use snafu::prelude::*;

use crate::{InvalidCoefficientsSnafu, NonFiniteSnafu, TabvarError, UnknownKindSnafu, tolerance};

/// The raw coefficient slots collected from a form. Which slots matter depends on the
/// [`FunctionTag`] they are read with.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub m: f64,
    pub n: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionTag {
    Linear,
    Quadratic,
    Cubic,
    Biquadratic,
    Rational11,
    Rational21,
}

impl FromStr for FunctionTag {
    type Err = TabvarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(FunctionTag::Linear),
            "quadratic" => Ok(FunctionTag::Quadratic),
            "cubic" => Ok(FunctionTag::Cubic),
            "biquadratic" => Ok(FunctionTag::Biquadratic),
            "rational-1-1" => Ok(FunctionTag::Rational11),
            "rational-2-1" => Ok(FunctionTag::Rational21),
            _ => UnknownKindSnafu { name: s }.fail(),
        }
    }
}

/// A function from one of the supported families, carrying exactly its coefficients.
#[derive(Clone, Copy, PartialEq)]
pub enum FunctionKind {
    /// `ax + b`
    Linear { a: f64, b: f64 },
    /// `ax² + bx + c`
    Quadratic { a: f64, b: f64, c: f64 },
    /// `ax³ + bx² + cx + d`
    Cubic { a: f64, b: f64, c: f64, d: f64 },
    /// `ax⁴ + bx² + c`
    Biquadratic { a: f64, b: f64, c: f64 },
    /// `(ax + b) / (cx + d)`
    Rational11 { a: f64, b: f64, c: f64, d: f64 },
    /// `(ax² + bx + c) / (mx + n)`
    Rational21 {
        a: f64,
        b: f64,
        c: f64,
        m: f64,
        n: f64,
    },
}

/// Terms as `(coefficient, exponent)`, highest exponent first.
pub type Terms = ArrayVec<(f64, u8), 5>;

/// The simplest form a [`FunctionKind`] reduces to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reduced {
    /// The same value everywhere.
    Constant { value: f64 },
    /// The same value everywhere except at `pole`, where it is undefined.
    ConstantOffPole { pole: f64, value: f64 },
    /// A function whose leading and denominator coefficients are non-zero. `hole` is a
    /// point removed from the domain by cancelling a common factor.
    Proper { kind: FunctionKind, hole: Option<f64> },
}

impl FunctionKind {
    pub fn from_coefficients(tag: FunctionTag, k: &Coefficients) -> Self {
        match tag {
            FunctionTag::Linear => FunctionKind::Linear { a: k.a, b: k.b },
            FunctionTag::Quadratic => FunctionKind::Quadratic {
                a: k.a,
                b: k.b,
                c: k.c,
            },
            FunctionTag::Cubic => FunctionKind::Cubic {
                a: k.a,
                b: k.b,
                c: k.c,
                d: k.d,
            },
            FunctionTag::Biquadratic => FunctionKind::Biquadratic {
                a: k.a,
                b: k.b,
                c: k.c,
            },
            FunctionTag::Rational11 => FunctionKind::Rational11 {
                a: k.a,
                b: k.b,
                c: k.c,
                d: k.d,
            },
            FunctionTag::Rational21 => FunctionKind::Rational21 {
                a: k.a,
                b: k.b,
                c: k.c,
                m: k.m,
                n: k.n,
            },
        }
    }

    pub fn tag(&self) -> FunctionTag {
        match self {
            FunctionKind::Linear { .. } => FunctionTag::Linear,
            FunctionKind::Quadratic { .. } => FunctionTag::Quadratic,
            FunctionKind::Cubic { .. } => FunctionTag::Cubic,
            FunctionKind::Biquadratic { .. } => FunctionTag::Biquadratic,
            FunctionKind::Rational11 { .. } => FunctionTag::Rational11,
            FunctionKind::Rational21 { .. } => FunctionTag::Rational21,
        }
    }

    /// Numerator terms, highest exponent first.
    pub fn numerator(&self) -> Terms {
        let terms: &[(f64, u8)] = match *self {
            FunctionKind::Linear { a, b } => &[(a, 1), (b, 0)],
            FunctionKind::Quadratic { a, b, c } => &[(a, 2), (b, 1), (c, 0)],
            FunctionKind::Cubic { a, b, c, d } => &[(a, 3), (b, 2), (c, 1), (d, 0)],
            FunctionKind::Biquadratic { a, b, c } => &[(a, 4), (b, 2), (c, 0)],
            FunctionKind::Rational11 { a, b, .. } => &[(a, 1), (b, 0)],
            FunctionKind::Rational21 { a, b, c, .. } => &[(a, 2), (b, 1), (c, 0)],
        };
        terms.iter().copied().collect()
    }

    /// Denominator terms for the rational families.
    pub fn denominator(&self) -> Option<Terms> {
        let terms: &[(f64, u8)] = match *self {
            FunctionKind::Rational11 { c, d, .. } => &[(c, 1), (d, 0)],
            FunctionKind::Rational21 { m, n, .. } => &[(m, 1), (n, 0)],
            _ => return None,
        };
        Some(terms.iter().copied().collect())
    }

    pub fn eval(&self, x: f64) -> f64 {
        let num = eval_terms(&self.numerator(), x);
        match self.denominator() {
            Some(den) => num / eval_terms(&den, x),
            None => num,
        }
    }

    /// Every coefficient must be finite before anything is computed from it.
    pub fn validate(&self) -> Result<(), TabvarError> {
        let coeffs = self
            .numerator()
            .into_iter()
            .chain(self.denominator().into_iter().flatten());
        for (value, _) in coeffs {
            ensure!(value.is_finite(), NonFiniteSnafu { value });
        }
        Ok(())
    }

    /// Rewrite into the simplest equivalent form, so that classification never meets a
    /// zero leading coefficient or a zero denominator.
    ///
    /// # Errors
    /// [`TabvarError::InvalidCoefficients`] when a denominator vanishes identically or a
    /// 2/1 rational collapses to a constant over a constant, and
    /// [`TabvarError::NonFinite`] for non-finite coefficients.
    pub fn reduce(self) -> Result<Reduced, TabvarError> {
        self.validate()?;
        let zero = tolerance::is_zero;

        let reduced = match self {
            FunctionKind::Linear { a, b } if zero(a) => Reduced::Constant { value: b },
            FunctionKind::Quadratic { a, b, c } if zero(a) => {
                return FunctionKind::Linear { a: b, b: c }.reduce();
            }
            FunctionKind::Cubic { a, b, c, d } if zero(a) => {
                return FunctionKind::Quadratic { a: b, b: c, c: d }.reduce();
            }
            FunctionKind::Biquadratic { a, b, c } if zero(a) => {
                return FunctionKind::Quadratic { a: b, b: 0.0, c }.reduce();
            }
            FunctionKind::Rational11 { c, .. } if zero(c) => {
                return InvalidCoefficientsSnafu {
                    reason: "the denominator cx+d of (ax+b)/(cx+d) needs c ≠ 0",
                }
                .fail();
            }
            FunctionKind::Rational11 { a, b, c, d } if zero(a * d - b * c) => {
                Reduced::ConstantOffPole {
                    pole: -d / c,
                    value: a / c,
                }
            }
            FunctionKind::Rational21 { a, b, c, m, n } if zero(m) => {
                ensure!(
                    !zero(n),
                    InvalidCoefficientsSnafu {
                        reason: "the denominator mx+n of (ax²+bx+c)/(mx+n) is identically zero",
                    }
                );
                let quadratic = FunctionKind::Quadratic {
                    a: a / n,
                    b: b / n,
                    c: c / n,
                };
                return match quadratic.reduce()? {
                    Reduced::Constant { .. } => InvalidCoefficientsSnafu {
                        reason: "(ax²+bx+c)/(mx+n) with a = b = m = 0 is constant",
                    }
                    .fail(),
                    reduced => Ok(reduced),
                };
            }
            FunctionKind::Rational21 { a, b, c, m, n } if zero(a) => {
                return FunctionKind::Rational11 { a: b, b: c, c: m, d: n }.reduce();
            }
            FunctionKind::Rational21 { a, b, c, m, n } => {
                // ax² + bx + c = (x - p)(ax + b + ap) + N(p) where p = -n/m is the pole.
                let p = -n / m;
                let remainder = a * p * p + b * p + c;
                if zero(remainder) {
                    Reduced::Proper {
                        kind: FunctionKind::Linear {
                            a: a / m,
                            b: (b + a * p) / m,
                        },
                        hole: Some(p),
                    }
                } else {
                    Reduced::Proper {
                        kind: self,
                        hole: None,
                    }
                }
            }
            kind => Reduced::Proper { kind, hole: None },
        };
        log::debug!("{self:?} reduces to {reduced:?}");
        Ok(reduced)
    }
}

fn eval_terms(terms: &[(f64, u8)], x: f64) -> f64 {
    terms
        .iter()
        .map(|&(coeff, exp)| coeff * x.powi(exp as i32))
        .sum()
}

fn write_terms(f: &mut fmt::Formatter<'_>, terms: &[(f64, u8)]) -> fmt::Result {
    for (i, &(coeff, exp)) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, " + ")?;
        }
        match exp {
            0 => write!(f, "{coeff}")?,
            1 => write!(f, "{coeff}x")?,
            _ => write!(f, "{coeff}x{}", Superscript(exp))?,
        }
    }
    Ok(())
}

impl fmt::Debug for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(", self.tag())?;
        match self.denominator() {
            Some(den) => {
                write!(f, "(")?;
                write_terms(f, &self.numerator())?;
                write!(f, ") / (")?;
                write_terms(f, &den)?;
                write!(f, ")")?;
            }
            None => write_terms(f, &self.numerator())?,
        }
        write!(f, ")")
    }
}
