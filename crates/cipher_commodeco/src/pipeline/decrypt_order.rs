//! Order Decryption
//!
//! ```text
//! ValidateHandles ─▶ VerifyOwnership ─▶ BuildAuthorization
//!        │                  │                   │
//!  NoEncryptedData     NotOrderOwner            ▼
//!                                    PublicDecrypt ─miss─▶ UserDecrypt
//!                                          │                   │
//!                                          └──────▶ ParseResult ◀┘
//! ```
//!
//! An order without an `orderType` has no valid reading, so that slot must be
//! set even though other unset slots read as 0.
//!
//! The first two gates always raise. Anything failing after them is handed
//! to the fallback policy and may come back as a tagged placeholder.

use alloy_primitives::{B256, U256};
use tracing::{debug, info};

use super::session::{clear_u32, DecryptionContext};
use crate::codec::is_unset;
use crate::contract::EncryptedOrderHandles;
use crate::error::{require, Result, TradingError};
use crate::service::{ClearValues, HandleContractPair};
use crate::state::{
    DecryptOutcome, DecryptedOrder, OrderType, ORDER_FIELDS, ORDER_FIELD_COUNT, PRICE_SCALE,
};

pub type OrderDecryption<'a> = DecryptionContext<'a>;

const ORDER_TYPE_SLOT: usize = 1;

impl DecryptionContext<'_> {
    pub async fn decrypt_order(
        &self,
        order_id: u64,
        handles: &EncryptedOrderHandles,
    ) -> Result<DecryptOutcome<DecryptedOrder>> {
        info!(order_id, "🚀 Starting FHE decryption process");

        let pairs = self.handle_pairs(handles.as_array());
        require!(
            !pairs.is_empty(),
            TradingError::NoEncryptedData {
                record: format!("order {order_id}"),
            }
        );
        require!(
            !is_unset(&handles.as_array()[ORDER_TYPE_SLOT]),
            TradingError::NoEncryptedData {
                record: format!("`{}` of order {order_id}", ORDER_FIELDS[ORDER_TYPE_SLOT]),
            }
        );

        let header = self.book.order_header(order_id).await?;
        require!(
            header.creator == self.account,
            TradingError::NotOrderOwner {
                order_id,
                account: self.account,
                creator: header.creator,
            }
        );
        debug!(order_id, symbol = %header.symbol, "✅ Ownership verified");

        let result = self.recover_order(handles.as_array(), &pairs).await;
        self.settle(result, || DecryptedOrder::placeholder(order_id))
    }

    async fn recover_order(
        &self,
        handles: &[B256; ORDER_FIELD_COUNT],
        pairs: &[HandleContractPair],
    ) -> Result<DecryptedOrder> {
        let auth = self.authorize().await?;
        let values = self.decrypt(pairs, &auth).await?;
        let order = parse_order(handles, &values)?;
        info!(order_id = order.order_id, "🎉 Order decrypted");
        Ok(order)
    }
}

fn parse_order(handles: &[B256; ORDER_FIELD_COUNT], values: &ClearValues) -> Result<DecryptedOrder> {
    let mut fields = [0u32; ORDER_FIELD_COUNT];
    for ((slot, handle), field) in fields.iter_mut().zip(handles).zip(ORDER_FIELDS) {
        *slot = clear_u32(values, handle, field)?;
    }
    let [order_id, order_type, quantity, price_cents, commodity_symbol_code] = fields;

    let order_type = OrderType::from_code(order_type).ok_or(TradingError::UnexpectedPlaintext {
        field: ORDER_FIELDS[ORDER_TYPE_SLOT],
        value: U256::from(order_type),
    })?;

    Ok(DecryptedOrder {
        order_id,
        order_type,
        quantity,
        price_dollars: f64::from(price_cents) / PRICE_SCALE,
        commodity_symbol_code,
        success: true,
    })
}

// ============================================================================
// TESTS
// ============================================================================
