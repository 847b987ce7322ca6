//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input tables and their expected shapes (`SeriesTable`, `TableShape`)
//! - selector output (`BestFit`, `BestFitMapping`)
//! - classifier output (`AnnotatedTable`, `SeriesClassification`)
//! - run configuration (`RunConfig`)

pub mod types;

pub use types::*;
