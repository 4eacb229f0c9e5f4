//! On-chain trading contract: ABI, boundary records and client

pub mod abi;
pub mod client;
pub mod records;

pub use client::*;
pub use records::*;
