//! Client Configuration
//!
//! Network profile of the FHE deployment plus the settings the pipelines
//! read. Values come from defaults, a JSON document or the environment.

use std::env;
use std::time::Duration;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid configuration document: {0}")]
    Document(#[from] serde_json::Error),
}

/// Fixed network profile the encryption service is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Host chain carrying the trading contract
    pub chain_id: u64,

    /// Chain id of the decryption gateway, used in the EIP-712 domain
    pub gateway_chain_id: u64,

    /// Host chain JSON-RPC endpoint
    pub rpc_url: String,

    /// Relayer that serves input proofs and decryptions
    pub relayer_url: String,

    pub acl_contract_address: Address,
    pub kms_contract_address: Address,
    pub input_verifier_contract_address: Address,

    /// EIP-712 verifying contract for decryption permits
    pub verifying_contract_address_decryption: Address,

    /// EIP-712 verifying contract for input proofs
    pub verifying_contract_address_input_verification: Address,
}

impl NetworkConfig {
    /// Sepolia testnet profile
    pub fn sepolia() -> Self {
        Self {
            chain_id: 11_155_111,
            gateway_chain_id: 55_815,
            rpc_url: "https://eth-sepolia.public.blastapi.io".to_string(),
            relayer_url: "https://relayer.testnet.zama.cloud".to_string(),
            acl_contract_address: address!("687820221192C5B662b25367F70076A37bc79b6c"),
            kms_contract_address: address!("1364cBBf2cDF5032C47d8226a6f6FBD2AFCDacAC"),
            input_verifier_contract_address: address!("bc91f3daD1A5F19F8390c400196e58073B6a0BC4"),
            verifying_contract_address_decryption: address!(
                "b6E160B1ff80D67Bfe90A85eE06Ce0A2613607D1"
            ),
            verifying_contract_address_input_verification: address!(
                "7048C39f048125eDa9d678AEbaDfB22F7900a29F"
            ),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::sepolia()
    }
}

/// What a decryption does once both decrypt paths have failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DecryptFallback {
    /// Return a placeholder record tagged as not authentic
    #[default]
    Placeholder,
    /// Return `DecryptionFailed`
    Propagate,
}

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub network: NetworkConfig,

    /// Deployed trading contract
    pub contract_address: Address,

    /// Lifetime of a decryption permit, in days
    pub authorization_validity_days: u64,

    /// Bounded wait for the relayer during service bootstrap
    pub bootstrap_timeout_ms: u64,

    pub decrypt_fallback: DecryptFallback,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::sepolia(),
            contract_address: Address::ZERO,
            authorization_validity_days: Self::DEFAULT_VALIDITY_DAYS,
            bootstrap_timeout_ms: Self::DEFAULT_BOOTSTRAP_TIMEOUT_MS,
            decrypt_fallback: DecryptFallback::Placeholder,
        }
    }
}

impl ClientConfig {
    pub const DEFAULT_VALIDITY_DAYS: u64 = 10;
    pub const DEFAULT_BOOTSTRAP_TIMEOUT_MS: u64 = 10_000;

    pub const ENV_CONTRACT_ADDRESS: &'static str = "COMMODECO_CONTRACT_ADDRESS";
    pub const ENV_RPC_URL: &'static str = "COMMODECO_RPC_URL";
    pub const ENV_RELAYER_URL: &'static str = "COMMODECO_RELAYER_URL";
    pub const ENV_VALIDITY_DAYS: &'static str = "COMMODECO_AUTH_VALIDITY_DAYS";
    pub const ENV_BOOTSTRAP_TIMEOUT_MS: &'static str = "COMMODECO_BOOTSTRAP_TIMEOUT_MS";
    pub const ENV_DECRYPT_FALLBACK: &'static str = "COMMODECO_DECRYPT_FALLBACK";

    pub fn with_contract(contract_address: Address) -> Self {
        Self {
            contract_address,
            ..Self::default()
        }
    }

    pub fn bootstrap_timeout(&self) -> Duration {
        Duration::from_millis(self.bootstrap_timeout_ms)
    }

    /// Parse a JSON document; missing keys keep their defaults
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Defaults overridden by `COMMODECO_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(raw) = value(Self::ENV_CONTRACT_ADDRESS) {
            config.contract_address = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: Self::ENV_CONTRACT_ADDRESS,
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = value(Self::ENV_RPC_URL) {
            config.network.rpc_url = raw;
        }
        if let Some(raw) = value(Self::ENV_RELAYER_URL) {
            config.network.relayer_url = raw;
        }
        if let Some(raw) = value(Self::ENV_VALIDITY_DAYS) {
            config.authorization_validity_days = raw
                .parse::<u64>()
                .ok()
                .filter(|days| *days > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: Self::ENV_VALIDITY_DAYS,
                    value: raw.clone(),
                })?;
        }
        if let Some(raw) = value(Self::ENV_BOOTSTRAP_TIMEOUT_MS) {
            config.bootstrap_timeout_ms =
                raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: Self::ENV_BOOTSTRAP_TIMEOUT_MS,
                    value: raw.clone(),
                })?;
        }
        if let Some(raw) = value(Self::ENV_DECRYPT_FALLBACK) {
            config.decrypt_fallback = match raw.to_ascii_lowercase().as_str() {
                "placeholder" => DecryptFallback::Placeholder,
                "propagate" => DecryptFallback::Propagate,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: Self::ENV_DECRYPT_FALLBACK,
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }
}
