//! Programmer traits and abstractions
//!
//! This module defines the operation set that every protocol dialect
//! implements, together with the small value types those operations exchange.

mod traits;
mod types;

pub use traits::*;
pub use types::*;
