//! Variation tables and plots for the function families taught in high-school analysis.
//!
//! Coefficients flow one way: a [`FunctionKind`] is reduced to its simplest proper form,
//! classified into a [`Shape`], and rendered as typeset text plus drawing markup. The
//! markup is consumed by an external rendering service, see [`service`].

mod custom_graph;
mod document;
mod function;
mod geometry;
pub mod markup;
mod notation;
mod plot;
mod rational;
pub mod service;
mod shape;
mod surd;
mod table;
pub mod tolerance;

#[cfg(test)]
mod test_utils;

pub use custom_graph::*;
pub use document::*;
pub use function::*;
pub use geometry::*;
pub use notation::*;
pub use plot::*;
pub use rational::*;
pub use shape::*;
pub use surd::*;
pub use table::*;

use snafu::prelude::*;

#[derive(Debug, Snafu)]
pub enum TabvarError {
    #[snafu(display("Non-finite value cannot be written exactly: {}", value))]
    NonFinite { value: f64 },

    #[snafu(display("Value exceeds the exact integer range: {}", value))]
    Overflow { value: f64 },

    #[snafu(display("Invalid coefficients: {}", reason))]
    InvalidCoefficients { reason: String },

    #[snafu(display("Unknown function kind: {}", name))]
    UnknownKind { name: String },

    #[snafu(display("no valid markup found"))]
    NoMarkupFound,

    #[snafu(display("{} failed: {}", service, detail))]
    Collaborator { service: String, detail: String },
}
