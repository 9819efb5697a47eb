//! Types library for the off-chain order book aggregator
//!
//! Shared type definitions for signed orders, exact integer amounts and the
//! aggregation error taxonomy. No I/O lives here.
//!
//! # Modules
//! - `ids`: Addresses and order hashes (case-insensitive hex)
//! - `numeric`: 256-bit token amounts with overflow-free `mul_div`
//! - `order`: Signed orders and per-pass order state
//! - `market`: Token pairs and book sides
//! - `pagination`: Page envelope
//! - `errors`: Error taxonomy

pub mod errors;
pub mod ids;
pub mod market;
pub mod numeric;
pub mod order;
pub mod pagination;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::market::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::pagination::*;
}
