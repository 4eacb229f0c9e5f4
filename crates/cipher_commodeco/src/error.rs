//! Error taxonomy for the trading client
//!
//! Every failure reaching the UI carries a readable message. Validation
//! errors are raised locally and never retried; backend errors keep their
//! original cause attached for diagnostics.

use std::error::Error as StdError;
use std::fmt;

use alloy_primitives::{Address, U256};
use thiserror::Error;

pub type Result<T, E = TradingError> = std::result::Result<T, E>;

/// Opaque failure reported by an external collaborator (FHE SDK, relayer,
/// wallet, RPC transport).
#[derive(Debug)]
pub struct BackendError {
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => f.write_str(&self.message),
        }
    }
}

impl StdError for BackendError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Failures talking to the trading contract
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("contract call `{method}` failed: {source}")]
    Call {
        method: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("malformed `{method}` response: {reason}")]
    MalformedResponse { method: &'static str, reason: String },
}

/// Errors surfaced by the encryption and decryption pipelines
#[derive(Debug, Error)]
pub enum TradingError {
    #[error("Failed to initialize encryption service: {reason}")]
    ServiceUnavailable { reason: String },

    #[error("Field `{field}` value {value} exceeds the 32-bit limit")]
    FieldOutOfRange { field: &'static str, value: String },

    #[error("Encryption backend error: {0}")]
    EncryptionBackend(#[source] BackendError),

    #[error("No encrypted data found for {record}")]
    NoEncryptedData { record: String },

    #[error("Account {account} is not the creator of order {order_id} (creator {creator})")]
    NotOrderOwner {
        order_id: u64,
        account: Address,
        creator: Address,
    },

    #[error("Account {account} cannot decrypt the portfolio of {trader}")]
    NotPortfolioOwner { account: Address, trader: Address },

    #[error("Wallet did not sign the decryption authorization: {0}")]
    SignatureRejected(#[source] BackendError),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(#[source] BackendError),

    #[error("Decrypted value {value} for `{field}` is not a valid plaintext")]
    UnexpectedPlaintext { field: &'static str, value: U256 },

    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl TradingError {
    pub(crate) fn out_of_range(field: &'static str, value: impl fmt::Display) -> Self {
        TradingError::FieldOutOfRange {
            field,
            value: value.to_string(),
        }
    }

    /// Errors caused by the request itself. Retrying the same call cannot
    /// succeed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TradingError::FieldOutOfRange { .. }
                | TradingError::NoEncryptedData { .. }
                | TradingError::NotOrderOwner { .. }
                | TradingError::NotPortfolioOwner { .. }
        )
    }
}

/// Early return with `err` unless `cond` holds.
macro_rules! require {
    ($cond:expr, $err:expr $(,)?) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}

pub(crate) use require;
