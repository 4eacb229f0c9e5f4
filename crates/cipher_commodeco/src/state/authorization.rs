//! Decryption Authorization
//!
//! A user decryption needs an ephemeral key pair and a wallet signature over
//! an EIP-712 permit binding the public key to a contract list and a
//! validity window:
//!
//! ```text
//! UserDecryptRequestVerification {
//!     publicKey,            // ephemeral, fresh per decryption
//!     contractAddresses,    // [trading contract]
//!     contractsChainId,     // chain the contracts live on
//!     startTimestamp,       // unix seconds
//!     durationDays,         // permit lifetime
//! }
//! ```

use std::borrow::Cow;
use std::fmt;

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{sol, Eip712Domain, SolStruct};

use super::config::NetworkConfig;

const SECONDS_PER_DAY: u64 = 86_400;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct UserDecryptRequestVerification {
        bytes publicKey;
        address[] contractAddresses;
        uint256 contractsChainId;
        uint256 startTimestamp;
        uint256 durationDays;
    }
}

/// EIP-712 domain under which decryption permits are signed
pub fn decryption_domain(network: &NetworkConfig) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Borrowed("Decryption")),
        Some(Cow::Borrowed("1")),
        Some(U256::from(network.gateway_chain_id)),
        Some(network.verifying_contract_address_decryption),
        None,
    )
}

/// Ephemeral key pair for one user decryption
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub public_key: Bytes,
    pub private_key: Bytes,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Typed-data message a wallet signs to authorize a user decryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptionPermit {
    pub domain: Eip712Domain,
    pub message: UserDecryptRequestVerification,
}

impl DecryptionPermit {
    pub fn new(
        domain: Eip712Domain,
        public_key: &Bytes,
        contract_addresses: &[Address],
        contracts_chain_id: u64,
        start_timestamp: u64,
        duration_days: u64,
    ) -> Self {
        Self {
            domain,
            message: UserDecryptRequestVerification {
                publicKey: public_key.clone(),
                contractAddresses: contract_addresses.to_vec(),
                contractsChainId: U256::from(contracts_chain_id),
                startTimestamp: U256::from(start_timestamp),
                durationDays: U256::from(duration_days),
            },
        }
    }

    /// Digest a wallet signs (`keccak256(0x1901 ‖ domainSeparator ‖ structHash)`)
    pub fn signing_hash(&self) -> B256 {
        self.message.eip712_signing_hash(&self.domain)
    }
}

/// Everything a user decryption call needs, produced fresh per attempt
#[derive(Debug, Clone)]
pub struct DecryptionAuthorization {
    pub key_pair: KeyPair,
    pub contract_addresses: Vec<Address>,
    pub start_timestamp: u64,
    pub duration_days: u64,
    pub permit: DecryptionPermit,
    pub signature: Bytes,
}

impl DecryptionAuthorization {
    /// Unix timestamp after which the relayer refuses the permit
    pub fn expires_at(&self) -> u64 {
        self.start_timestamp
            .saturating_add(self.duration_days.saturating_mul(SECONDS_PER_DAY))
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at()
    }
}
