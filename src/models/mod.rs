//! Data models for the portfolio catalogue.
//!
//! Field names follow the storage columns so payloads round-trip unchanged.

mod category;
mod display;
mod product;
mod revision;

pub use category::*;
pub use display::*;
pub use product::*;
pub use revision::*;
