//! # Cipher Commodeco: Confidential Commodity Trading
//!
//! Client-side core of a commodity trading dApp whose order fields never
//! touch the chain in the clear.
//!
//! ## Overview
//!
//! Orders are encrypted with an FHE SDK before they are written, and only the
//! account that placed an order can read it back.
//!
//! ## How it works
//! - The encryption service is initialized once and shared (`service`).
//! - Order and portfolio fields are packed into 32-bit values and encrypted
//!   as one batch with a single input proof (`pipeline`).
//! - Decryption is gated on ownership, then authorized by a wallet-signed
//!   EIP-712 permit over a fresh key pair (`pipeline`, `state`).
//! - `CommodecoClient` ties it to the trading contract (`client`, `contract`).
//!

pub mod client;
pub mod codec;
pub mod contract;
pub mod error;
pub mod pipeline;
pub mod service;
pub mod state;
pub mod wallet;

#[cfg(test)]
mod testing;

pub use client::CommodecoClient;
pub use codec::*;
pub use error::{BackendError, ContractError, Result, TradingError};
pub use pipeline::{
    encrypt_order, encrypt_portfolio, DecryptionContext, OrderDecryption, PortfolioDecryption,
};
pub use service::*;
pub use state::*;
pub use wallet::WalletSigner;
