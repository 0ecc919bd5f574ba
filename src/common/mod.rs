//! Common types, traits, and error definitions for grid_reroute
//!
//! This module provides the foundational building blocks shared by the
//! grid indexer, the hazard model, and the route search.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
