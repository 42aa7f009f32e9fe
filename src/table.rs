use crate::{CriticalPoint, Level, PointKind, Shape, Sign};

/// Layout of a tkz-tab variation table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableStyle {
    /// Width of the label column.
    pub lgt: f64,
    /// Distance between two value columns.
    pub espcl: f64,
    /// Margin at either end of a row.
    pub deltacl: f64,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            lgt: 1.2,
            espcl: 2.5,
            deltacl: 0.6,
        }
    }
}

/// Render `shape` as a tkz-tab variation table: the `x` row, the sign row of `y'` and the
/// arrow row of `y`, with a vertical double bar at each asymptote.
pub fn variation_table(shape: &Shape, style: &TableStyle) -> String {
    let mut block = String::from("\\begin{tikzpicture}\n");
    block.push_str(&format!(
        "\\tkzTabInit[nocadre,lgt={},espcl={},deltacl={}]\n",
        style.lgt, style.espcl, style.deltacl
    ));
    block.push_str("{$x$/0.6,$y'$/0.6,$y$/2}\n");

    let xs: Vec<String> = std::iter::once("$-\\infty$".to_owned())
        .chain(shape.points().iter().map(|p| format!("${}$", p.location)))
        .chain(std::iter::once("$+\\infty$".to_owned()))
        .collect();
    block.push_str(&format!("{{{}}}\n", xs.join(",")));

    block.push_str(&format!("\\tkzTabLine{{,{},}}\n", sign_row(shape)));
    block.push_str(&format!("\\tkzTabVar{{{}}}\n", variation_row(shape)));

    // A saddle has no arrow of its own; its value sits on the arrow crossing it.
    for (i, point) in shape.points().iter().enumerate() {
        if let (PointKind::Inflection, Some(value)) = (point.kind, point.value) {
            let column = i + 2;
            block.push_str(&format!(
                "\\tkzTabVal{{{}}}{{{}}}{{0.5}}{{}}{{${value}$}}\n",
                column - 1,
                column + 1
            ));
        }
    }

    block.push_str("\\end{tikzpicture}");
    block
}

fn sign_row(shape: &Shape) -> String {
    let mut cells = Vec::with_capacity(2 * shape.branches().len());
    for (i, branch) in shape.branches().iter().enumerate() {
        cells.push(branch.symbol().to_string());
        if let Some(point) = shape.points().get(i) {
            let mark = match point.kind {
                PointKind::Asymptote => "d",
                _ => "0",
            };
            cells.push(mark.to_owned());
        }
    }
    cells.join(",")
}

fn variation_row(shape: &Shape) -> String {
    let branches = shape.branches();
    let mut cells = Vec::with_capacity(branches.len() + 1);

    // The left end is low when the first branch climbs away from it.
    let first = branches.first().copied().unwrap_or(Sign::Positive);
    cells.push(format!("{}/{}", first.flip().symbol(), level(shape.left())));

    for (point, before, after) in shape.boundaries() {
        cells.push(variation_cell(point, before, after));
    }

    let last = branches.last().copied().unwrap_or(Sign::Positive);
    cells.push(format!("{}/{}", last.symbol(), level(shape.right())));
    cells.join(",")
}

fn variation_cell(point: &CriticalPoint, before: Sign, after: Sign) -> String {
    let value = || {
        point
            .value
            .map(|v| format!("${v}$"))
            .unwrap_or_default()
    };
    match point.kind {
        PointKind::Max => format!("+/{}", value()),
        PointKind::Min => format!("-/{}", value()),
        PointKind::Inflection => "R/".to_owned(),
        PointKind::Asymptote => {
            // Climbing into the pole from the left ends at +∞; climbing out of it on the
            // right starts from -∞.
            let left = unbounded(before);
            let right = unbounded(after.flip());
            format!(
                "{}D{}/{}/{}",
                before.symbol(),
                after.flip().symbol(),
                level(left),
                level(right)
            )
        }
    }
}

fn unbounded(sign: Sign) -> Level {
    match sign {
        Sign::Positive => Level::PosInfinity,
        Sign::Negative => Level::NegInfinity,
    }
}

fn level(level: Level) -> String {
    match level {
        Level::NegInfinity => "$-\\infty$".to_owned(),
        Level::PosInfinity => "$+\\infty$".to_owned(),
        Level::Finite(v) => format!("${v}$"),
    }
}
