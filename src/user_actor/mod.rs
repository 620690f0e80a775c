//! User-specific store logic and command validation.

pub mod entity;
pub mod validation;

pub use validation::*;
