//! Best-fit selection and test-point classification.
//!
//! Responsibilities:
//!
//! - choose the ideal column closest to each training column (`selection`)
//! - classify test points against the chosen columns (`classify`)
//!
//! Both stages are pure: they borrow the input tables and never log.

pub mod classify;
pub mod selection;

pub use classify::*;
pub use selection::*;
