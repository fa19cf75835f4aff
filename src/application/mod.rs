//! Application layer managing session state and edit workflows.
//!
//! Sits between the domain (grid, evaluator, sorting) and the terminal
//! host, turning user actions into grid operations.

pub mod state;

pub use state::*;
