use std::str::FromStr;

use snafu::prelude::*;

use crate::{InvalidCoefficientsSnafu, TabvarError, UnknownKindSnafu};

/// Solid figures drawn from a fixed template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Tetrahedron,
    Cone,
    Cylinder,
    Sphere,
    /// Right triangular prism.
    Prism,
    Parallelepiped,
}

impl FromStr for GeometryKind {
    type Err = TabvarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tetrahedron" => Ok(GeometryKind::Tetrahedron),
            "cone" => Ok(GeometryKind::Cone),
            "cylinder" => Ok(GeometryKind::Cylinder),
            "sphere" => Ok(GeometryKind::Sphere),
            "prism" => Ok(GeometryKind::Prism),
            "parallelepiped" => Ok(GeometryKind::Parallelepiped),
            _ => UnknownKindSnafu { name: s }.fail(),
        }
    }
}

/// Vertex labels and dimensions. Each figure reads only the fields it draws.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoParams {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
    pub s: String,
    pub m: String,
    pub n: String,
    pub p: String,
    pub q: String,
    /// Base radius.
    pub radius: f64,
    pub height: f64,
}

impl Default for GeoParams {
    fn default() -> Self {
        Self {
            a: "A".to_owned(),
            b: "B".to_owned(),
            c: "C".to_owned(),
            d: "D".to_owned(),
            s: "S".to_owned(),
            m: "M".to_owned(),
            n: "N".to_owned(),
            p: "P".to_owned(),
            q: "Q".to_owned(),
            radius: 2.0,
            height: 4.0,
        }
    }
}

impl GeoParams {
    /// Labels must be non-empty and free of the separators used in `\foreach` lists.
    fn label<'a>(&self, label: &'a str) -> Result<&'a str, TabvarError> {
        ensure!(
            !label.trim().is_empty() && !label.contains(['/', ',', '{', '}', '(', ')']),
            InvalidCoefficientsSnafu {
                reason: format!("vertex label {label:?} cannot be drawn"),
            }
        );
        Ok(label.trim())
    }

    fn dimension(&self, name: &str, value: f64) -> Result<f64, TabvarError> {
        ensure!(
            value.is_finite() && value > 0.0,
            InvalidCoefficientsSnafu {
                reason: format!("{name} must be a positive number, got {value}"),
            }
        );
        Ok(value)
    }
}

const SOLID: &str =
    "\\begin{tikzpicture}[scale=1,>=stealth, line join=round, line cap=round, line width=1pt]\n";
const ROUND: &str =
    "\\begin{tikzpicture}[scale=1, line join=round, line cap=round, line width=1pt]\n";
const END: &str = "\\end{tikzpicture}";

/// Draw `kind` with the labels and dimensions in `params`.
pub fn geometry(kind: GeometryKind, params: &GeoParams) -> Result<String, TabvarError> {
    let body = match kind {
        GeometryKind::Tetrahedron => {
            let (a, b, c, d) = (
                params.label(&params.a)?,
                params.label(&params.b)?,
                params.label(&params.c)?,
                params.label(&params.d)?,
            );
            format!(
                "{SOLID}\
                 \x20 \\foreach \\x/\\y/\\p in {{0/0/{b},1.3/-1.6/{c},4.5/0/{d},1/3.5/{a}}}{{\\path (\\x,\\y) coordinate (\\p);}}\n\
                 \x20 \\draw ({a})--({b})--({c})--({d})--({a})--({c});\n\
                 \x20 \\draw[dashed, line width=.8pt]({b})--({d});\n\
                 \x20 \\foreach \\x/\\g in {{{a}/90,{b}/-170,{c}/-110,{d}/-10}}\\draw[fill=white] (\\x) circle (.045)+(\\g:.3) node[black]{{$\\x$}};\n"
            )
        }

        GeometryKind::Cone => {
            let h = params.dimension("height", params.height)?;
            let r = params.dimension("radius", params.radius)?;
            // The apex must sit above the visible rim of the base ellipse.
            ensure!(
                0.45 * r < h,
                InvalidCoefficientsSnafu {
                    reason: format!("a cone of radius {r} needs a height above {}", 0.45 * r),
                }
            );
            format!(
                "{ROUND}\
                 \x20 \\def\\h{{{h}}}\n\
                 \x20 \\def\\R{{{r}}}\n\
                 \x20 \\pgfmathsetmacro\\r{{0.45*\\R}}\n\
                 \x20 \\pgfmathsetmacro\\g{{asin(\\r/\\h)}}\n\
                 \x20 \\pgfmathsetmacro\\xo{{\\R*cos(\\g)}}\n\
                 \x20 \\pgfmathsetmacro\\yo{{\\r*sin(\\g)}}\n\
                 \x20 \\path (0,0) coordinate (O)\n\
                 \x20 (0,\\h) coordinate (S)\n\
                 \x20 (180:\\R) coordinate (A)\n\
                 \x20 (0:\\R) coordinate (B);\n\
                 \x20 \\draw[dashed, line width=.8pt](\\xo,\\yo) arc (\\g:180-\\g:{{\\R}} and {{\\r}}) (A)--(B) (O)--(S);\n\
                 \x20 \\draw (S)--(-\\xo,\\yo) arc (180-\\g:360+\\g:{{\\R}} and {{\\r}})--(S);\n"
            )
        }

        GeometryKind::Cylinder => {
            let h = params.dimension("height", params.height)?;
            let r = params.dimension("radius", params.radius)?;
            format!(
                "{ROUND}\
                 \x20 \\def\\h{{{h}}}\n\
                 \x20 \\def\\R{{{r}}}\n\
                 \x20 \\pgfmathsetmacro\\r{{0.45*\\R}}\n\
                 \x20 \\path (0,0) coordinate (O)\n\
                 \x20 (0,\\h) coordinate (O')\n\
                 \x20 (180:\\R) coordinate (A)\n\
                 \x20 (0:\\R) coordinate (B)\n\
                 \x20 ($(B)+(O')$) coordinate (C)\n\
                 \x20 ($(A)+(O')$) coordinate (D);\n\
                 \x20 \\draw[dashed, line width=.8pt] (B) arc (0:180:{{\\R}} and {{\\r}});\n\
                 \x20 \\draw (O') ellipse ({{\\R}} and {{\\r}}) (C)--(B) arc (0:-180:{{\\R}} and {{\\r}})--(D);\n"
            )
        }

        GeometryKind::Sphere => {
            let r = params.dimension("radius", params.radius)?;
            format!(
                "{ROUND}\
                 \x20 \\def\\R{{{r}}}\n\
                 \x20 \\pgfmathsetmacro\\r{{0.45*\\R}}\n\
                 \x20 \\path (0,0) coordinate (O)\n\
                 \x20 (180:\\R) coordinate (A)\n\
                 \x20 (0:\\R) coordinate (B);\n\
                 \x20 \\draw[dashed, line width=.8pt] (B) arc (0:180:{{\\R}} and {{\\r}});\n\
                 \x20 \\draw (O) circle (\\R) (B) arc (0:-180:{{\\R}} and {{\\r}});\n"
            )
        }

        GeometryKind::Prism => {
            let (a, b, c) = (
                params.label(&params.a)?,
                params.label(&params.b)?,
                params.label(&params.c)?,
            );
            let (m, n, p) = (
                params.label(&params.m)?,
                params.label(&params.n)?,
                params.label(&params.p)?,
            );
            format!(
                "{SOLID}\
                 \x20 \\foreach \\x/\\y/\\p in {{0/0/{a},1.1/-1.5/{b},3.5/0/{c}}}{{\\path (\\x,\\y) coordinate (\\p);}}\n\
                 \x20 \\path ($({a})+(0,3.2)$) coordinate ({m});\n\
                 \x20 \\foreach \\x/\\y in {{{b}/{n},{c}/{p}}}{{\\path ($({m})+(\\x)-({a})$) coordinate (\\y);}}\n\
                 \x20 \\draw ({a})--({b})--({c})--({p})--({n})--({m})--cycle ({m})--({p}) ({b})--({n});\n\
                 \x20 \\draw[dashed, line width=.8pt]({a})--({c});\n\
                 \x20 \\foreach \\x/\\g in {{{a}/-170,{b}/-110,{c}/-10,{m}/170,{n}/80,{p}/10}}\\draw[fill=white] (\\x) circle (.045)+(\\g:.3) node[black]{{$\\x$}};\n"
            )
        }

        GeometryKind::Parallelepiped => {
            let (a, b, c, d) = (
                params.label(&params.a)?,
                params.label(&params.b)?,
                params.label(&params.c)?,
                params.label(&params.d)?,
            );
            let (m, n, p, q) = (
                params.label(&params.m)?,
                params.label(&params.n)?,
                params.label(&params.p)?,
                params.label(&params.q)?,
            );
            format!(
                "{SOLID}\
                 \x20 \\foreach \\x/\\y/\\p in {{0/0/{a},-1.1/-1.5/{b},2.5/-1.5/{c}}}{{\\path (\\x,\\y) coordinate (\\p);}}\n\
                 \x20 \\path ($({a})+({c})-({b})$) coordinate ({d})\n\
                 \x20 ($({a})+(0,3.2)$) coordinate ({m});\n\
                 \x20 \\foreach \\x/\\y in {{{b}/{n},{c}/{p},{d}/{q}}}{{\\path ($({m})+(\\x)-({a})$) coordinate (\\y);}}\n\
                 \x20 \\draw ({c})--({p}) ({n})--({m})--({q})--({p})--({n})--({b})--({c})--({d})--({q});\n\
                 \x20 \\draw[dashed, line width=.8pt] ({m})--({a})--({d})({a})--({b});\n\
                 \x20 \\foreach \\x/\\g in {{{a}/-170,{b}/-120,{c}/-50,{d}/-10,{m}/170,{n}/-145,{p}/-30,{q}/10}}\\draw[fill=white] (\\x) circle (.045)+(\\g:.3) node[black]{{$\\x$}};\n"
            )
        }
    };
    log::debug!("drew {kind:?}");
    Ok(format!("{body}{END}"))
}

#[cfg(test)]
mod tests {
    use assertables::{assert_contains, assert_err, assert_not_contains};
    use pretty_assertions as pa;

    use super::*;
    use crate::markup;

    const ALL: [GeometryKind; 6] = [
        GeometryKind::Tetrahedron,
        GeometryKind::Cone,
        GeometryKind::Cylinder,
        GeometryKind::Sphere,
        GeometryKind::Prism,
        GeometryKind::Parallelepiped,
    ];

    #[test]
    fn every_figure_is_one_region() {
        let params = GeoParams::default();
        for kind in ALL {
            let text = geometry(kind, &params).unwrap();
            assert!(markup::is_well_formed(&text), "{kind:?}");
            pa::assert_eq!(markup::extract_region(&text), Some(text.as_str()));
        }
    }

    #[test]
    fn labels_are_substituted() {
        let params = GeoParams {
            a: "S".to_owned(),
            b: "X".to_owned(),
            ..Default::default()
        };
        let text = geometry(GeometryKind::Tetrahedron, &params).unwrap();
        assert_contains!(text, "{0/0/X,1.3/-1.6/C,4.5/0/D,1/3.5/S}");
        assert_contains!(text, "\\draw (S)--(X)--(C)--(D)--(S)--(C);");
        assert_not_contains!(text, "{A}");
    }

    #[test]
    fn dimensions_are_substituted() {
        let params = GeoParams {
            radius: 1.5,
            height: 3.0,
            ..Default::default()
        };
        let text = geometry(GeometryKind::Cylinder, &params).unwrap();
        assert_contains!(text, "\\def\\h{3}");
        assert_contains!(text, "\\def\\R{1.5}");
    }

    #[test]
    fn bad_parameters_are_rejected() {
        let flat = GeoParams {
            height: 0.0,
            ..Default::default()
        };
        assert_err!(geometry(GeometryKind::Cone, &flat));

        let unbounded = GeoParams {
            radius: f64::INFINITY,
            ..Default::default()
        };
        assert_err!(geometry(GeometryKind::Sphere, &unbounded));

        let blank = GeoParams {
            c: " ".to_owned(),
            ..Default::default()
        };
        assert_err!(geometry(GeometryKind::Prism, &blank));

        let comma = GeoParams {
            q: "Q,R".to_owned(),
            ..Default::default()
        };
        assert_err!(geometry(GeometryKind::Parallelepiped, &comma));
    }

    #[test]
    fn kinds_parse() {
        pa::assert_eq!(
            "sphere".parse::<GeometryKind>().unwrap(),
            GeometryKind::Sphere
        );
        assert_err!("hexagon".parse::<GeometryKind>());
    }
}
