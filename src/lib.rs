//! `ideal-fit` library crate.
//!
//! The binary (`ifit`) is a thin wrapper around this library so that:
//!
//! - the selector and classifier are testable without spawning processes
//! - the CLI and the TUI share one pipeline

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
