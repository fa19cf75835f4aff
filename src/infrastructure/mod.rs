//! Infrastructure layer providing external service integrations.
//!
//! File persistence for grids and the tracing setup used by the binary.

pub mod logging;
pub mod persistence;

pub use logging::*;
pub use persistence::*;
