//! gridsheet - grid data store with an embedded formula evaluator.
//!
//! Cells hold text; text starting with `=` is an arithmetic formula over
//! cell references (`A1`, `B12`), evaluated once when entered.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::*;
pub use domain::*;
