//! # Encryption Service
//!
//! - `sdk` - the FHE capability surface consumed by the pipelines
//! - `manager` - process-wide, single-flight access to the initialized service

pub mod manager;
pub mod sdk;

pub use manager::*;
pub use sdk::*;
