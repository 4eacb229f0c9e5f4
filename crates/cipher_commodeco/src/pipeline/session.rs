//! Shared Pipeline Mechanics
//!
//! Orders and portfolios go through the same two paths:
//!
//! ```text
//! encrypt:  values ──add32 × N──▶ encrypt() ──▶ N wire handles + proof
//!
//! decrypt:  handles ──drop unset──▶ (owner check, per record)
//!                 ──▶ fresh key pair + signed permit
//!                 ──▶ public decrypt ──miss──▶ user decrypt
//!                 ──▶ clear values keyed by handle
//! ```
//!
//! Steps run strictly in that order. No step is retried here.

use alloy_primitives::{Address, B256, U256};
use tracing::{debug, info, warn};

use crate::codec::{is_unset, proof_to_wire, to_wire_format};
use crate::contract::OrderBook;
use crate::error::{require, BackendError, Result, TradingError};
use crate::service::{ClearValues, EncryptionService, HandleContractPair, UserDecryptRequest};
use crate::state::{DecryptFallback, DecryptOutcome, DecryptionAuthorization, EncryptedBundle};
use crate::wallet::WalletSigner;

/// Encrypt `values` as one batch scoped to `(contract_address, account_address)`
pub(crate) async fn encrypt_fields<const N: usize>(
    service: &dyn EncryptionService,
    contract_address: Address,
    account_address: Address,
    values: [u32; N],
) -> Result<EncryptedBundle<N>> {
    let mut input = service.create_encrypted_input(contract_address, account_address);
    for value in values {
        input.add32(value);
    }
    debug!(fields = N, "🔄 Encrypting input batch");

    let output = input
        .encrypt()
        .await
        .map_err(TradingError::EncryptionBackend)?;

    require!(
        output.handles.len() == N,
        TradingError::EncryptionBackend(BackendError::new(format!(
            "expected {N} handles, got {}",
            output.handles.len()
        )))
    );
    require!(
        !output.input_proof.is_empty(),
        TradingError::EncryptionBackend(BackendError::new("empty input proof"))
    );

    let mut handles = [B256::ZERO; N];
    for (slot, raw) in handles.iter_mut().zip(output.handles) {
        *slot = to_wire_format(raw).map_err(|e| {
            TradingError::EncryptionBackend(BackendError::with_source("unusable ciphertext handle", e))
        })?;
    }

    require!(
        !handles.iter().any(is_unset),
        TradingError::EncryptionBackend(BackendError::new(
            "backend returned an unset ciphertext handle"
        ))
    );

    Ok(EncryptedBundle {
        handles,
        proof: proof_to_wire(&output.input_proof),
    })
}

/// Everything a decryption needs besides the record itself
///
/// The contract address is the order book's own address; the permit always
/// names exactly that one contract.
#[derive(Clone, Copy)]
pub struct DecryptionContext<'a> {
    pub service: &'a dyn EncryptionService,
    pub book: &'a dyn OrderBook,
    pub signer: &'a dyn WalletSigner,
    /// Account whose data is being decrypted
    pub account: Address,
    pub validity_days: u64,
    pub fallback: DecryptFallback,
}

impl DecryptionContext<'_> {
    /// Pair every set handle with the contract; unset slots are skipped
    pub(crate) fn handle_pairs(&self, handles: &[B256]) -> Vec<HandleContractPair> {
        let contract_address = self.book.address();
        handles
            .iter()
            .filter(|h| !is_unset(h))
            .map(|&handle| HandleContractPair {
                handle,
                contract_address,
            })
            .collect()
    }

    /// Fresh key pair and wallet signature over a permit starting now
    pub(crate) async fn authorize(&self) -> Result<DecryptionAuthorization> {
        let signer_address = self.signer.address();
        require!(
            signer_address == self.account,
            TradingError::SignatureRejected(BackendError::new(format!(
                "wallet signs for {signer_address}, decryption requested for {}",
                self.account
            )))
        );

        let key_pair = self.service.generate_keypair();
        let contract_addresses = vec![self.book.address()];
        let start_timestamp = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        let permit = self.service.create_eip712(
            &key_pair.public_key,
            &contract_addresses,
            start_timestamp,
            self.validity_days,
        );

        debug!(
            start_timestamp,
            duration_days = self.validity_days,
            "✍️ Requesting decryption permit signature"
        );
        let signature = self
            .signer
            .sign_typed_data(&permit)
            .await
            .map_err(TradingError::SignatureRejected)?;

        Ok(DecryptionAuthorization {
            key_pair,
            contract_addresses,
            start_timestamp,
            duration_days: self.validity_days,
            permit,
            signature,
        })
    }

    /// Public decrypt first; user decrypt only when that misses
    ///
    /// A public result that lacks any requested handle counts as a miss.
    pub(crate) async fn decrypt(
        &self,
        pairs: &[HandleContractPair],
        auth: &DecryptionAuthorization,
    ) -> Result<ClearValues> {
        match self.service.public_decrypt(pairs).await {
            Ok(values) if pairs.iter().all(|p| values.contains_key(&p.handle)) => {
                info!(handles = pairs.len(), "🔓 Public decryption succeeded");
                return Ok(values);
            }
            Ok(values) => warn!(
                requested = pairs.len(),
                returned = values.len(),
                "⚠️ Public decryption incomplete, falling back to user decryption"
            ),
            Err(e) => warn!(error = %e, "⚠️ Public decryption failed, falling back to user decryption"),
        }

        let values = self
            .service
            .user_decrypt(UserDecryptRequest {
                pairs,
                key_pair: &auth.key_pair,
                signature: &auth.signature,
                contract_addresses: &auth.contract_addresses,
                user_address: self.account,
                start_timestamp: auth.start_timestamp,
                duration_days: auth.duration_days,
            })
            .await
            .map_err(TradingError::DecryptionFailed)?;

        if let Some(missing) = pairs.iter().find(|p| !values.contains_key(&p.handle)) {
            return Err(TradingError::DecryptionFailed(BackendError::new(format!(
                "no plaintext returned for handle {}",
                missing.handle
            ))));
        }
        info!(handles = pairs.len(), "🔓 User decryption succeeded");
        Ok(values)
    }

    /// Apply the fallback policy to a failed decryption
    pub(crate) fn settle<T>(
        &self,
        result: Result<T>,
        placeholder: impl FnOnce() -> T,
    ) -> Result<DecryptOutcome<T>> {
        match (result, self.fallback) {
            (Ok(record), _) => Ok(DecryptOutcome::Real(record)),
            (Err(e), DecryptFallback::Propagate) => Err(e),
            (Err(e), DecryptFallback::Placeholder) => {
                warn!(error = %e, "⚠️ Decryption failed, returning placeholder data");
                Ok(DecryptOutcome::Placeholder {
                    record: placeholder(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

/// Plaintext of one field; an unset handle reads as zero
pub(crate) fn clear_u32(values: &ClearValues, handle: &B256, field: &'static str) -> Result<u32> {
    if is_unset(handle) {
        return Ok(0);
    }
    let value: U256 = *values.get(handle).ok_or_else(|| {
        TradingError::DecryptionFailed(BackendError::new(format!("no plaintext for `{field}`")))
    })?;
    u32::try_from(value).map_err(|_| TradingError::UnexpectedPlaintext { field, value })
}

// ============================================================================
// TESTS
// ============================================================================
