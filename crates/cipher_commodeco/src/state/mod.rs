//! State structures shared by the trading pipelines

pub mod authorization;
pub mod commodity;
pub mod config;
pub mod order;
pub mod portfolio;

pub use authorization::*;
pub use commodity::*;
pub use config::*;
pub use order::*;
pub use portfolio::*;
