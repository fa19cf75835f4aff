pub mod address;
pub mod errors;
pub mod models;
pub mod parser;
pub mod services;
pub mod sort;

pub use address::*;
pub use errors::*;
pub use models::*;
pub use services::*;
pub use sort::*;
