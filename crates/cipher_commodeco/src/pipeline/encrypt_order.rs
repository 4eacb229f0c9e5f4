//! Order Encryption
//!
//! The contract decodes the five handles positionally:
//!
//! ```text
//! [0] orderId  [1] orderType  [2] quantity  [3] priceCents  [4] commoditySymbolCode
//! ```
//!
//! Every field is range-checked before the service is touched, so an invalid
//! order never produces a partial encryption.

use alloy_primitives::Address;
use tracing::{debug, info};

use super::session::encrypt_fields;
use crate::error::Result;
use crate::service::EncryptionService;
use crate::state::{EncryptedOrderBundle, OrderPlaintext};

pub async fn encrypt_order(
    service: &dyn EncryptionService,
    contract_address: Address,
    account_address: Address,
    order: &OrderPlaintext,
) -> Result<EncryptedOrderBundle> {
    info!(order_id = order.order_id, contract = %contract_address, "🚀 Starting FHE order encryption");
    let values = order.field_values()?;
    debug!(?values, "📊 Order fields validated");

    let bundle = encrypt_fields(service, contract_address, account_address, values).await?;
    info!(proof_len = bundle.proof.len(), "✅ Order encrypted");
    Ok(bundle)
}

// ============================================================================
// TESTS
// ============================================================================
