//! Product-specific store logic, including the stock reservation action.

pub mod entity;
pub mod validation;

pub use validation::*;
