use crate::{
    Analysis, CustomGraph, FunctionKind, GeoParams, GeometryKind, PlotStyle, Rational,
    TableStyle, TabvarError, analyze, geometry, notation, plot, variation_table,
};

/// One press of a "generate" button.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerationRequest {
    Table(FunctionKind),
    Plot(FunctionKind),
    Geometry(GeometryKind, GeoParams),
    CustomGraph(CustomGraph),
}

/// Turns requests into text documents: a caption followed by a drawing region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Generator {
    pub table: TableStyle,
    pub plot: PlotStyle,
}

impl Generator {
    /// Always produces something to display. Failures become an `Error: ...` line.
    pub fn generate(&self, request: &GenerationRequest) -> String {
        match self.try_generate(request) {
            Ok(text) => text,
            Err(e) => {
                log::info!("generation failed: {e}");
                format!("Error: {e}")
            }
        }
    }

    pub fn try_generate(&self, request: &GenerationRequest) -> Result<String, TabvarError> {
        match request {
            GenerationRequest::Table(kind) => self.table_document(kind),
            GenerationRequest::Plot(kind) => self.plot_document(kind),
            GenerationRequest::Geometry(kind, params) => geometry(*kind, params),
            GenerationRequest::CustomGraph(graph) => graph.render(),
        }
    }

    /// Caption and variation table, or a sentence explaining why there is none.
    pub fn table_document(&self, kind: &FunctionKind) -> Result<String, TabvarError> {
        let reduced = kind.reduce()?;
        let y = notation::function(kind)?;

        let text = match analyze(&reduced)? {
            Analysis::Shape(shape) => {
                let domain = match shape.hole() {
                    Some(p) => format!(", defined for $x\\neq {}$", display(p)),
                    None => String::new(),
                };
                format!(
                    "Variation table of $y={y}${domain}.\n\n{}",
                    variation_table(&shape, &self.table)
                )
            }
            Analysis::Constant { value } => format!(
                "The function $y={y}$ is constant, equal to ${}$, and has no variation table.",
                display(value)
            ),
            Analysis::ConstantOffPole { pole, value } => format!(
                "The function $y={y}$ is constant, equal to ${}$ on $\\mathbb{{R}}\\setminus\\{{{}\\}}$.",
                display(value),
                display(pole)
            ),
        };
        Ok(text)
    }

    /// Caption and plot.
    pub fn plot_document(&self, kind: &FunctionKind) -> Result<String, TabvarError> {
        let reduced = kind.reduce()?;
        let y = notation::function(kind)?;
        let figure = plot(&reduced, &self.plot)?;
        Ok(format!("Graph of $y={y}$.\n\n{}", figure.render()))
    }
}

/// A caption number, in the same display style as the typeset function.
fn display(r: Rational) -> String {
    notation::rewrite(&r.to_string())
}
