use snafu::prelude::*;

use crate::{InvalidCoefficientsSnafu, TabvarError};

/// A plot of a user-written pgfmath expression over a fixed window.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomGraph {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    /// Expression in `\x`. Empty draws only the axes.
    pub expression: String,
    pub x_ticks: Vec<f64>,
    pub y_ticks: Vec<f64>,
}

impl Default for CustomGraph {
    fn default() -> Self {
        Self {
            xmin: -5.0,
            xmax: 5.0,
            ymin: -5.0,
            ymax: 5.0,
            expression: String::new(),
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
        }
    }
}

impl CustomGraph {
    fn validate(&self) -> Result<(), TabvarError> {
        let bounds = [self.xmin, self.xmax, self.ymin, self.ymax];
        let ticks = self.x_ticks.iter().chain(&self.y_ticks);
        ensure!(
            bounds.iter().chain(ticks).all(|v| v.is_finite()),
            InvalidCoefficientsSnafu {
                reason: "window bounds and ticks must be finite",
            }
        );
        ensure!(
            self.xmin < self.xmax && self.ymin < self.ymax,
            InvalidCoefficientsSnafu {
                reason: format!(
                    "empty window [{}, {}] x [{}, {}]",
                    self.xmin, self.xmax, self.ymin, self.ymax
                ),
            }
        );

        // The expression is pasted inside braces, so it must not close them early.
        let mut depth = 0i32;
        for ch in self.expression.chars() {
            match ch {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            ensure!(
                depth >= 0,
                InvalidCoefficientsSnafu {
                    reason: "unbalanced braces in the expression",
                }
            );
        }
        ensure!(
            depth == 0,
            InvalidCoefficientsSnafu {
                reason: "unbalanced braces in the expression",
            }
        );
        Ok(())
    }

    /// TikZ markup for the graph. Axes run to the window edges and the curve is clipped a
    /// little inside them.
    pub fn render(&self) -> Result<String, TabvarError> {
        self.validate()?;

        let mut block = String::from(
            "\\begin{tikzpicture}[scale=1,>=stealth, line join=round, line cap=round, line width=1pt]\n",
        );
        block.push_str(&format!(
            "  \\tikzset{{declare function={{xmin={};xmax={};ymin={};ymax={};}},smooth,samples=450}}\n",
            self.xmin, self.xmax, self.ymin, self.ymax
        ));
        block.push_str("  \\path (0,0) node[below left]{$ O $};\n");

        if !self.x_ticks.is_empty() {
            block.push_str(&format!(
                "  \\foreach \\x in {{{}}}{{\\draw (\\x,-.05)--(\\x,.05);\\path (\\x,0)node[below]{{$\\x$}};}}\n",
                join(&self.x_ticks)
            ));
        }
        if !self.y_ticks.is_empty() {
            block.push_str(&format!(
                "  \\foreach \\y in {{{}}}{{\\draw (-.05,\\y)--(.05,\\y);\\path (0,\\y)node[left]{{$\\y$}};}}\n",
                join(&self.y_ticks)
            ));
        }

        block.push_str("  \\draw[->] (xmin,0)--(xmax,0) node[below]{$ x $};\n");
        block.push_str("  \\draw[->] (0,ymin)--(0,ymax) node[right]{$ y $};\n");
        block.push_str("  \\clip (xmin+.2,ymin+.2) rectangle (xmax-.2,ymax-.2);\n");

        let expression = self.expression.trim();
        if !expression.is_empty() {
            block.push_str(&format!(
                "  \\draw plot[domain=xmin+.2:xmax-.2] (\\x, {{{expression}}});\n"
            ));
        }
        block.push_str("\\end{tikzpicture}");
        Ok(block)
    }
}

fn join(ticks: &[f64]) -> String {
    ticks
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
