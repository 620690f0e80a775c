//! Outbound handles: typed store clients and the HTTP downstream proxy.

#[macro_use]
mod macros;

pub mod downstream;
pub mod product_client;
pub mod user_client;

pub use downstream::*;
pub use product_client::*;
pub use user_client::*;
