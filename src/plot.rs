use num_traits::ToPrimitive;
use smallvec::{SmallVec, smallvec};
use snafu::prelude::*;

use crate::{
    Analysis, FunctionKind, InvalidCoefficientsSnafu, NonFiniteSnafu, OverflowSnafu, Reduced,
    TabvarError, analyze, tolerance,
};

/// Widest window drawn on either axis. Every integer in it gets a tick.
pub const MAX_SPAN: u64 = 1000;

#[derive(Clone, Debug, PartialEq)]
pub struct PlotStyle {
    /// Samples per plotted curve.
    pub samples: u32,
    /// Distance kept from a vertical asymptote on either side.
    pub pole_gap: f64,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            samples: 200,
            pole_gap: 0.1,
        }
    }
}

/// Integer plotting window. Ticks sit on every integer inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub xmin: i64,
    pub xmax: i64,
    pub ymin: i64,
    pub ymax: i64,
}

impl Window {
    /// Tick positions on the x axis, skipping the origin.
    pub fn x_ticks(self) -> impl Iterator<Item = i64> {
        (self.xmin..=self.xmax).filter(|&x| x != 0)
    }

    pub fn y_ticks(self) -> impl Iterator<Item = i64> {
        (self.ymin..=self.ymax).filter(|&y| y != 0)
    }
}

/// One end of a curve's domain: the window edge, or a fixed abscissa.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bound {
    Window,
    At(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    /// A pgfmath expression in `\x`.
    pub expression: String,
    pub from: Bound,
    pub to: Bound,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Guide {
    Vertical(f64),
    Horizontal(f64),
    Line { slope: f64, intercept: f64 },
    /// Dashed drops from a point onto both axes.
    Drop { x: f64, y: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mark {
    Dot { x: f64, y: f64 },
    /// A point missing from the domain.
    Hole { x: f64, y: f64 },
}

/// Everything drawn in a function plot.
#[derive(Clone, Debug, PartialEq)]
pub struct Plot {
    pub window: Window,
    pub samples: u32,
    /// Drawn before clipping so they span the whole window.
    pub asymptotes: SmallVec<[Guide; 2]>,
    pub curves: SmallVec<[Curve; 2]>,
    pub guides: SmallVec<[Guide; 1]>,
    pub marks: SmallVec<[Mark; 1]>,
}

/// Build the plot of an already reduced function.
///
/// The window covers the critical points and asymptotes with fixed margins and always
/// contains the unit square around the origin. Curves of rational functions are split
/// around the vertical asymptote, never drawn across it.
pub fn plot(reduced: &Reduced, style: &PlotStyle) -> Result<Plot, TabvarError> {
    let plot = match *reduced {
        Reduced::Constant { value } => {
            let window = window(Span::new(-2.0, 2.0), Span::around(value, 1.0))?;
            Plot::new(window, style).with_curve(constant(value), Bound::Window, Bound::Window)
        }
        Reduced::ConstantOffPole { pole, value } => {
            let window = window(Span::around(pole, 2.0), Span::around(value, 1.0))?;
            let mut plot = Plot::new(window, style).split_around(constant(value), pole, style);
            plot.marks.push(Mark::Hole { x: pole, y: value });
            plot
        }
        Reduced::Proper { kind, hole } => {
            let extrema: SmallVec<[(f64, f64); 3]> = match analyze(reduced)? {
                Analysis::Shape(shape) => shape
                    .points()
                    .iter()
                    .filter_map(|p| p.value.map(|v| (p.location.to_f64(), v.to_f64())))
                    .collect(),
                _ => SmallVec::new(),
            };

            let (mut xs, mut ys) = spans(&kind, &extrema);
            if let Some(p) = hole {
                xs = xs.cover(p);
                ys = ys.cover(kind.eval(p));
            }

            let mut plot = proper(&kind, window(xs, ys)?, style);
            if let Some(p) = hole {
                plot.marks.push(Mark::Hole {
                    x: p,
                    y: kind.eval(p),
                });
            }
            plot
        }
    };
    log::debug!("plot window {:?}", plot.window);
    Ok(plot)
}

fn proper(kind: &FunctionKind, window: Window, style: &PlotStyle) -> Plot {
    let plot = Plot::new(window, style);
    let expression = pgf_expression(kind);

    match *kind {
        FunctionKind::Quadratic { a, b, .. } => {
            let x = -b / (2.0 * a);
            let y = kind.eval(x);
            let mut plot = plot.with_curve(expression, Bound::Window, Bound::Window);
            plot.guides.push(Guide::Drop { x, y });
            plot.marks.push(Mark::Dot { x, y });
            plot
        }
        FunctionKind::Rational11 { a, c, d, .. } => {
            let pole = -d / c;
            let mut plot = plot.split_around(expression, pole, style);
            plot.asymptotes = smallvec![Guide::Horizontal(a / c), Guide::Vertical(pole)];
            plot
        }
        FunctionKind::Rational21 { a, b, m, n, .. } => {
            // (ax² + bx + c) / (mx + n) = (a/m)x + (bm - an)/m² + r / (mx + n)
            let pole = -n / m;
            let mut plot = plot.split_around(expression, pole, style);
            plot.asymptotes = smallvec![
                Guide::Vertical(pole),
                Guide::Line {
                    slope: a / m,
                    intercept: (b * m - a * n) / (m * m),
                }
            ];
            plot
        }
        FunctionKind::Linear { .. }
        | FunctionKind::Cubic { .. }
        | FunctionKind::Biquadratic { .. } => {
            plot.with_curve(expression, Bound::Window, Bound::Window)
        }
    }
}

/// Unrounded extent of the interesting part of the graph, per kind.
fn spans(kind: &FunctionKind, extrema: &[(f64, f64)]) -> (Span, Span) {
    match *kind {
        FunctionKind::Linear { a, b } => (Span::around(-b / a, 1.0), Span::around(b, 1.0)),

        FunctionKind::Quadratic { a, b, .. } => {
            let x = -b / (2.0 * a);
            let y = kind.eval(x);
            let ys = if a > 0.0 {
                Span::new(if y > 0.0 { -1.0 } else { y - 1.125 }, y + 4.5)
            } else {
                Span::new(y - 4.5, if y < 0.0 { 1.0 } else { y + 1.125 })
            };
            (Span::around(x, 3.0), ys)
        }

        FunctionKind::Cubic { a, b, .. } => {
            // Centred on the inflection point.
            let x = -b / (3.0 * a);
            let start = (Span::around(x, 3.0), Span::around(kind.eval(x), 3.0));
            extrema.iter().fold(start, |(xs, ys), &(x, y)| {
                (xs.cover(x), ys.cover(y - 1.0).cover(y + 1.0))
            })
        }

        FunctionKind::Biquadratic { a, b, c } => {
            let bottom = c - b * b / (4.0 * a);
            let ys = match (a > 0.0, b > 0.0) {
                (true, true) => Span::new(c - 1.0, c + 4.0),
                (true, false) => Span::new(bottom - 1.0, (c + 2.0).max(bottom + 4.0)),
                (false, true) => Span::new((c - 2.0).min(bottom - 4.0), bottom + 1.0),
                (false, false) => Span::new(c - 4.0, c + 1.0),
            };
            let xs = extrema
                .iter()
                .fold(Span::new(-3.0, 3.0), |xs, &(x, _)| xs.cover(x - 1.0).cover(x + 1.0));
            (xs, ys)
        }

        FunctionKind::Rational11 { a, c, d, .. } => {
            (Span::around(-d / c, 3.5), Span::around(a / c, 3.5))
        }

        FunctionKind::Rational21 { a, b, m, n, .. } => {
            let ys = match extrema {
                [] => Span::around((b * m - 2.0 * a * n) / (m * m), 3.0),
                [(_, first), rest @ ..] => rest
                    .iter()
                    .fold(Span::around(*first, 3.0), |ys, &(_, y)| {
                        ys.cover(y - 3.0).cover(y + 3.0)
                    }),
            };
            (Span::around(-n / m, 4.0), ys)
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Span {
    lo: f64,
    hi: f64,
}

impl Span {
    fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    fn around(center: f64, margin: f64) -> Self {
        Self::new(center - margin, center + margin)
    }

    fn cover(self, x: f64) -> Self {
        Self::new(self.lo.min(x), self.hi.max(x))
    }
}

fn window(xs: Span, ys: Span) -> Result<Window, TabvarError> {
    let window = Window {
        xmin: integer(xs.lo.min(-1.0).floor())?,
        xmax: integer(xs.hi.max(1.0).ceil())?,
        ymin: integer(ys.lo.min(-1.0).floor())?,
        ymax: integer(ys.hi.max(1.0).ceil())?,
    };
    ensure!(
        window.xmax.abs_diff(window.xmin) <= MAX_SPAN
            && window.ymax.abs_diff(window.ymin) <= MAX_SPAN,
        InvalidCoefficientsSnafu {
            reason: format!(
                "plot window too large: [{}, {}] x [{}, {}]",
                window.xmin, window.xmax, window.ymin, window.ymax
            ),
        }
    );
    Ok(window)
}

fn integer(value: f64) -> Result<i64, TabvarError> {
    ensure!(value.is_finite(), NonFiniteSnafu { value });
    value.to_i64().context(OverflowSnafu { value })
}

impl Plot {
    fn new(window: Window, style: &PlotStyle) -> Self {
        Self {
            window,
            samples: style.samples,
            asymptotes: SmallVec::new(),
            curves: SmallVec::new(),
            guides: SmallVec::new(),
            marks: SmallVec::new(),
        }
    }

    fn with_curve(mut self, expression: String, from: Bound, to: Bound) -> Self {
        self.curves.push(Curve {
            expression,
            from,
            to,
        });
        self
    }

    fn split_around(self, expression: String, pole: f64, style: &PlotStyle) -> Self {
        self.with_curve(
            expression.clone(),
            Bound::Window,
            Bound::At(pole - style.pole_gap),
        )
        .with_curve(expression, Bound::At(pole + style.pole_gap), Bound::Window)
    }

    /// TikZ markup for the plot, axes and ticks included.
    pub fn render(&self) -> String {
        let w = &self.window;
        let mut block = String::from(
            "\\begin{tikzpicture}[scale=1, font=\\footnotesize, line join=round, line cap=round, >=stealth]\n",
        );
        block.push_str(&format!(
            "\\def\\xmin{{{}}}\\def\\xmax{{{}}}\\def\\ymin{{{}}}\\def\\ymax{{{}}}\n",
            w.xmin, w.xmax, w.ymin, w.ymax
        ));
        block.push_str(
            "\\draw[->] (\\xmin-0.2,0)--(\\xmax+0.2,0) node[below] {\\footnotesize $x$};\n",
        );
        block.push_str(
            "\\draw[->] (0,\\ymin-0.2)--(0,\\ymax+0.2) node[right] {\\footnotesize $y$};\n",
        );
        block.push_str("\\draw (0,0) node [below left] {\\footnotesize $O$};\n");

        let xs = join(w.x_ticks());
        if !xs.is_empty() {
            block.push_str(&format!(
                "\\foreach \\x in {{{xs}}}\\draw (\\x,0.1)--(\\x,-0.1) node [below] {{\\footnotesize $\\x$}};\n"
            ));
        }
        let ys = join(w.y_ticks());
        if !ys.is_empty() {
            block.push_str(&format!(
                "\\foreach \\y in {{{ys}}}\\draw (0.1,\\y)--(-0.1,\\y) node [left] {{\\footnotesize $\\y$}};\n"
            ));
        }

        for guide in &self.asymptotes {
            block.push_str(&guide.render());
        }
        block.push_str("\\clip (\\xmin,\\ymin) rectangle (\\xmax,\\ymax);\n");

        for curve in &self.curves {
            block.push_str(&format!(
                "\\draw[smooth,samples={},domain={}:{}] plot (\\x,{{{}}});\n",
                self.samples,
                bound(curve.from, "\\xmin"),
                bound(curve.to, "\\xmax"),
                curve.expression
            ));
        }
        for guide in &self.guides {
            block.push_str(&guide.render());
        }
        for mark in &self.marks {
            block.push_str(&mark.render());
        }

        block.push_str("\\end{tikzpicture}");
        block
    }
}

impl Guide {
    fn render(&self) -> String {
        match *self {
            Guide::Vertical(x) => {
                let x = num(x);
                format!("\\draw[dashed] ({x},\\ymin)--({x},\\ymax);\n")
            }
            Guide::Horizontal(y) => {
                let y = num(y);
                format!("\\draw[dashed] (\\xmin,{y})--(\\xmax,{y});\n")
            }
            Guide::Line { slope, intercept } => format!(
                "\\draw[dashed,domain=\\xmin:\\xmax] plot (\\x,{{{}}});\n",
                pgf_terms(&[(slope, 1), (intercept, 0)])
            ),
            Guide::Drop { x, y } => {
                let (x, y) = (num(x), num(y));
                format!("\\draw[dashed] ({x},0)--({x},{y})--(0,{y});\n")
            }
        }
    }
}

impl Mark {
    fn render(&self) -> String {
        match *self {
            Mark::Dot { x, y } => format!("\\fill ({},{}) circle (1pt);\n", num(x), num(y)),
            Mark::Hole { x, y } => format!(
                "\\draw[fill=white] ({},{}) circle (1.5pt);\n",
                num(x),
                num(y)
            ),
        }
    }
}

fn bound(bound: Bound, edge: &str) -> String {
    match bound {
        Bound::Window => edge.to_owned(),
        Bound::At(x) => num(x),
    }
}

fn join(ticks: impl Iterator<Item = i64>) -> String {
    ticks.map(|t| t.to_string()).collect::<Vec<_>>().join(",")
}

/// A coordinate rounded to two decimals.
fn num(x: f64) -> String {
    // Adding zero turns -0 into 0.
    let rounded = (x * 100.0).round() / 100.0 + 0.0;
    format!("{rounded}")
}

fn constant(value: f64) -> String {
    pgf_terms(&[(value, 0)])
}

/// `kind` as a pgfmath expression in `\x`, with full-precision coefficients.
pub fn pgf_expression(kind: &FunctionKind) -> String {
    let num = pgf_terms(&kind.numerator());
    match kind.denominator() {
        Some(den) => format!("({num})/({})", pgf_terms(&den)),
        None => num,
    }
}

fn pgf_terms(terms: &[(f64, u8)]) -> String {
    let parts: Vec<String> = terms
        .iter()
        .filter(|(coeff, _)| !tolerance::is_zero(*coeff))
        .map(|&(coeff, exp)| match exp {
            0 => format!("{coeff}"),
            1 => format!("{coeff}*(\\x)"),
            _ => format!("{coeff}*((\\x)^{exp})"),
        })
        .collect();
    if parts.is_empty() {
        return "0".to_owned();
    }
    parts.join("+").replace("+-", "-")
}
