//! Wallet Signing Capability
//!
//! Account connection and network selection live outside this crate; the
//! pipelines only need a way to get a typed-data signature from the
//! connected wallet.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;

use crate::error::BackendError;
use crate::state::DecryptionPermit;

#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Account the wallet signs for
    fn address(&self) -> Address;

    /// EIP-712 signature over `permit` (65 bytes, `r ‖ s ‖ v`)
    ///
    /// Fails when the user rejects the request or the wallet is gone.
    async fn sign_typed_data(&self, permit: &DecryptionPermit) -> Result<Bytes, BackendError>;
}
