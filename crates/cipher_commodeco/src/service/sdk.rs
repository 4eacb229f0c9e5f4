//! FHE SDK Capability
//!
//! The encryption service is an external collaborator. These traits are the
//! exact surface the pipelines consume from it; a binding to a concrete
//! relayer SDK implements them.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

use crate::codec::RawHandle;
use crate::error::BackendError;
use crate::state::{DecryptionPermit, KeyPair, NetworkConfig};

/// Shared, read-only handle to an initialized encryption service
pub type ServiceHandle = Arc<dyn EncryptionService>;

/// Plaintext values keyed by ciphertext handle
pub type ClearValues = HashMap<B256, U256>;

/// A ciphertext handle and the contract allowed to use it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleContractPair {
    pub handle: B256,
    pub contract_address: Address,
}

/// Output of one batch encryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedInputOutput {
    /// One handle per appended value, in append order
    pub handles: Vec<RawHandle>,
    /// Proof covering the whole batch
    pub input_proof: Vec<u8>,
}

/// Arguments of an authorized (user) decryption
#[derive(Debug, Clone, Copy)]
pub struct UserDecryptRequest<'a> {
    pub pairs: &'a [HandleContractPair],
    pub key_pair: &'a KeyPair,
    pub signature: &'a Bytes,
    pub contract_addresses: &'a [Address],
    pub user_address: Address,
    pub start_timestamp: u64,
    pub duration_days: u64,
}

/// Encrypted-input builder scoped to one (contract, account) pair
#[async_trait]
pub trait EncryptedInput: Send {
    /// Append a 32-bit value; chainable
    fn add32(&mut self, value: u32) -> &mut dyn EncryptedInput;

    /// Encrypt everything appended so far in one batch
    async fn encrypt(&mut self) -> Result<EncryptedInputOutput, BackendError>;
}

/// The FHE capability object
#[async_trait]
pub trait EncryptionService: Send + Sync {
    fn create_encrypted_input(
        &self,
        contract_address: Address,
        account_address: Address,
    ) -> Box<dyn EncryptedInput>;

    fn generate_keypair(&self) -> KeyPair;

    /// Permit over the given window; the chain id comes from the instance's network
    fn create_eip712(
        &self,
        public_key: &Bytes,
        contract_addresses: &[Address],
        start_timestamp: u64,
        duration_days: u64,
    ) -> DecryptionPermit;

    /// Decrypt handles the contract has made publicly decryptable
    async fn public_decrypt(
        &self,
        pairs: &[HandleContractPair],
    ) -> Result<ClearValues, BackendError>;

    /// Decrypt handles for the permit's signer
    async fn user_decrypt(
        &self,
        request: UserDecryptRequest<'_>,
    ) -> Result<ClearValues, BackendError>;
}

/// Steps that bring an encryption service into existence
#[async_trait]
pub trait ServiceBootstrap: Send + Sync {
    /// Resolves once the SDK's remote resources are reachable
    async fn wait_until_available(&self);

    /// One-time SDK setup (WASM modules, public key material)
    async fn init_sdk(&self) -> Result<(), BackendError>;

    /// Build a service bound to `network`
    async fn create_instance(&self, network: &NetworkConfig) -> Result<ServiceHandle, BackendError>;
}
