//! Plot rendering.
//!
//! - fixed-grid terminal plots (`ascii`)
//! - SVG files via Plotters (`svg`)

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
