use smallvec::{SmallVec, smallvec};

use crate::{
    Exact, FunctionKind, QuadraticRoots, Rational, Reduced, TabvarError, approximate, solve,
    tolerance,
};

/// Sign of the derivative along a monotonic branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub fn of(x: f64) -> Self {
        if x > 0.0 {
            Sign::Positive
        } else {
            Sign::Negative
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Sign::Positive => Sign::Negative,
            Sign::Negative => Sign::Positive,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Sign::Positive => '+',
            Sign::Negative => '-',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointKind {
    Min,
    Max,
    /// Zero derivative on both sides without a change of sign.
    Inflection,
    /// Vertical asymptote.
    Asymptote,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CriticalPoint {
    pub location: Exact,
    /// `None` at an asymptote, where the function has no value.
    pub value: Option<Exact>,
    pub kind: PointKind,
}

/// A limit at either end of the real line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Level {
    NegInfinity,
    PosInfinity,
    Finite(Exact),
}

/// Monotonic structure of a function over the whole real line.
///
/// `branches[i]` is the derivative sign left of `points[i]`, and the final branch extends
/// to `+∞`, so there is always one more branch than there are points.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    points: SmallVec<[CriticalPoint; 3]>,
    branches: SmallVec<[Sign; 4]>,
    left: Level,
    right: Level,
    hole: Option<Rational>,
}

impl Shape {
    fn new(
        points: SmallVec<[CriticalPoint; 3]>,
        branches: SmallVec<[Sign; 4]>,
        left: Level,
        right: Level,
    ) -> Self {
        debug_assert_eq!(branches.len(), points.len() + 1);
        Self {
            points,
            branches,
            left,
            right,
            hole: None,
        }
    }

    fn monotonic(sign: Sign, left: Level, right: Level) -> Self {
        Self::new(smallvec![], smallvec![sign], left, right)
    }

    /// Critical points, ascending by location.
    pub fn points(&self) -> &[CriticalPoint] {
        &self.points
    }

    pub fn branches(&self) -> &[Sign] {
        &self.branches
    }

    /// Each critical point with the derivative sign just before and just after it.
    pub fn boundaries(&self) -> impl Iterator<Item = (&CriticalPoint, Sign, Sign)> {
        self.points
            .iter()
            .zip(self.branches.windows(2))
            .map(|(p, pair)| (p, pair[0], pair[1]))
    }

    /// Limit at `-∞`.
    pub fn left(&self) -> Level {
        self.left
    }

    /// Limit at `+∞`.
    pub fn right(&self) -> Level {
        self.right
    }

    /// A point excluded from the domain by cancelling a common factor.
    pub fn hole(&self) -> Option<Rational> {
        self.hole
    }
}

/// Outcome of classification.
#[derive(Clone, Debug, PartialEq)]
pub enum Analysis {
    Shape(Shape),
    Constant { value: Rational },
    ConstantOffPole { pole: Rational, value: Rational },
}

/// Reduce and classify `kind`.
pub fn classify(kind: FunctionKind) -> Result<Analysis, TabvarError> {
    analyze(&kind.reduce()?)
}

/// Classify an already reduced function.
pub fn analyze(reduced: &Reduced) -> Result<Analysis, TabvarError> {
    let analysis = match *reduced {
        Reduced::Constant { value } => Analysis::Constant {
            value: approximate(value)?,
        },
        Reduced::ConstantOffPole { pole, value } => Analysis::ConstantOffPole {
            pole: approximate(pole)?,
            value: approximate(value)?,
        },
        Reduced::Proper { kind, hole } => {
            let mut shape = shape_of(kind)?;
            shape.hole = hole.map(approximate).transpose()?;
            Analysis::Shape(shape)
        }
    };
    log::debug!("classified as {analysis:?}");
    Ok(analysis)
}

fn point(
    kind: &FunctionKind,
    location: Exact,
    point_kind: PointKind,
) -> Result<CriticalPoint, TabvarError> {
    let value = approximate(kind.eval(location.to_f64()))?;
    Ok(CriticalPoint {
        location,
        value: Some(value.into()),
        kind: point_kind,
    })
}

fn asymptote(location: Rational) -> CriticalPoint {
    CriticalPoint {
        location: location.into(),
        value: None,
        kind: PointKind::Asymptote,
    }
}

/// Kinds of a local extremum pair when the derivative runs `s, -s, s`.
fn extremum_kinds(first: Sign) -> (PointKind, PointKind) {
    match first {
        Sign::Positive => (PointKind::Max, PointKind::Min),
        Sign::Negative => (PointKind::Min, PointKind::Max),
    }
}

/// Level reached at `±∞` by a branch heading up (`Positive`) or down.
fn unbounded(sign: Sign) -> Level {
    match sign {
        Sign::Positive => Level::PosInfinity,
        Sign::Negative => Level::NegInfinity,
    }
}

fn shape_of(kind: FunctionKind) -> Result<Shape, TabvarError> {
    let shape = match kind {
        FunctionKind::Linear { a, .. } => {
            let s = Sign::of(a);
            Shape::monotonic(s, unbounded(s.flip()), unbounded(s))
        }

        FunctionKind::Quadratic { a, b, .. } => {
            let s = Sign::of(a);
            let vertex = approximate(-b / (2.0 * a))?;
            let kind_at = if s == Sign::Positive {
                PointKind::Min
            } else {
                PointKind::Max
            };
            Shape::new(
                smallvec![point(&kind, vertex.into(), kind_at)?],
                smallvec![s.flip(), s],
                unbounded(s),
                unbounded(s),
            )
        }

        FunctionKind::Cubic { a, b, c, .. } => {
            // f' = 3ax² + 2bx + c, whose discriminant has the sign of b² - 3ac.
            let s = Sign::of(a);
            let (left, right) = (unbounded(s.flip()), unbounded(s));
            match solve(3.0 * a, 2.0 * b, c)? {
                QuadraticRoots::NoRealRoot => Shape::monotonic(s, left, right),
                QuadraticRoots::Double(x) => Shape::new(
                    smallvec![point(&kind, x.into(), PointKind::Inflection)?],
                    smallvec![s, s],
                    left,
                    right,
                ),
                QuadraticRoots::Distinct(x1, x2) => {
                    let (k1, k2) = extremum_kinds(s);
                    Shape::new(
                        smallvec![point(&kind, x1, k1)?, point(&kind, x2, k2)?],
                        smallvec![s, s.flip(), s],
                        left,
                        right,
                    )
                }
            }
        }

        FunctionKind::Biquadratic { a, b, .. } => {
            let s = Sign::of(a);
            let (outer, inner) = extremum_kinds(s.flip());
            let origin = Exact::from(Rational::ZERO);

            if tolerance::sign(a) * tolerance::sign(b) >= 0 {
                Shape::new(
                    smallvec![point(&kind, origin, outer)?],
                    smallvec![s.flip(), s],
                    unbounded(s),
                    unbounded(s),
                )
            } else {
                // f' = 2x(2ax² + b) also vanishes at ±√(-b/2a).
                let r = Exact::sqrt(approximate(-b / (2.0 * a))?)?;
                Shape::new(
                    smallvec![
                        point(&kind, -r, outer)?,
                        point(&kind, origin, inner)?,
                        point(&kind, r, outer)?
                    ],
                    smallvec![s.flip(), s, s.flip(), s],
                    unbounded(s),
                    unbounded(s),
                )
            }
        }

        FunctionKind::Rational11 { a, b, c, d } => {
            // f' = (ad - bc) / (cx + d)²
            let s = Sign::of(a * d - b * c);
            let level = Level::Finite(approximate(a / c)?.into());
            Shape::new(
                smallvec![asymptote(approximate(-d / c)?)],
                smallvec![s, s],
                level,
                level,
            )
        }

        FunctionKind::Rational21 { a, b, c, m, n } => {
            // f' = (Ax² + 2Bx + C) / (mx + n)² with A = am, B = an, C = bn - cm.
            let (big_a, big_b, big_c) = (a * m, a * n, b * n - c * m);
            let pole = asymptote(approximate(-n / m)?);
            let s = Sign::of(big_a);
            let slope = Sign::of(a / m);
            let (left, right) = (unbounded(slope.flip()), unbounded(slope));

            match solve(big_a, 2.0 * big_b, big_c)? {
                QuadraticRoots::Distinct(x1, x2) => {
                    let (k1, k2) = extremum_kinds(s);
                    Shape::new(
                        smallvec![point(&kind, x1, k1)?, pole, point(&kind, x2, k2)?],
                        smallvec![s, s.flip(), s.flip(), s],
                        left,
                        right,
                    )
                }
                // A double root of the numerator sits on the pole, which the reduction
                // has already cancelled, so the derivative keeps the sign of A.
                QuadraticRoots::NoRealRoot | QuadraticRoots::Double(_) => {
                    Shape::new(smallvec![pole], smallvec![s, s], left, right)
                }
            }
        }
    };
    Ok(shape)
}
