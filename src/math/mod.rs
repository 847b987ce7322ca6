//! Mathematical utilities: column-wise squared deviation.

pub mod deviation;

pub use deviation::*;
