//! Order State
//!
//! An order moves through four shapes:
//!
//! ```text
//! OrderRequest ──▶ OrderPlaintext ──▶ EncryptedOrderBundle ──▶ (chain)
//!                                                               │
//!                  DecryptOutcome<DecryptedOrder> ◀─────────────┘
//! ```

use alloy_primitives::{Bytes, B256};
use serde::{Deserialize, Serialize};

use crate::codec::{encode_symbol, proof_to_hex};
use crate::error::{Result, TradingError};

/// Largest value an encrypted field can carry
pub const MAX_FIELD_VALUE: u64 = u32::MAX as u64;

/// Number of encrypted fields in an order
pub const ORDER_FIELD_COUNT: usize = 5;

/// Field names in the order the contract decodes them
pub const ORDER_FIELDS: [&str; ORDER_FIELD_COUNT] = [
    "orderId",
    "orderType",
    "quantity",
    "priceCents",
    "commoditySymbolCode",
];

/// Price scale between dollars and the encrypted integer field
pub const PRICE_SCALE: f64 = 100.0;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Buy,
    Sell,
}

impl OrderType {
    pub const BUY_CODE: u32 = 1;
    pub const SELL_CODE: u32 = 2;

    pub fn code(self) -> u32 {
        match self {
            OrderType::Buy => Self::BUY_CODE,
            OrderType::Sell => Self::SELL_CODE,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            Self::BUY_CODE => Some(OrderType::Buy),
            Self::SELL_CODE => Some(OrderType::Sell),
            _ => None,
        }
    }
}

/// Order as entered by a trader: dollar price and ticker text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub order_id: u64,
    pub order_type: OrderType,
    pub quantity: u64,
    /// Price in dollars
    pub price: f64,
    pub commodity_symbol: String,
}

/// Numeric order fields ahead of encryption
///
/// Values are held wide so that out-of-range input can be reported instead
/// of being truncated; `field_values` enforces the 32-bit domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaintext {
    pub order_id: u64,
    pub order_type: OrderType,
    pub quantity: u64,
    pub price_cents: u64,
    pub commodity_symbol_code: u64,
}

impl OrderPlaintext {
    /// Scale the price to cents and fold the ticker into its code
    pub fn from_request(request: &OrderRequest) -> Result<Self> {
        Ok(Self {
            order_id: request.order_id,
            order_type: request.order_type,
            quantity: request.quantity,
            price_cents: dollars_to_cents("priceCents", request.price)?,
            commodity_symbol_code: u64::from(encode_symbol(&request.commodity_symbol)),
        })
    }

    /// The five field values in contract order, each checked against the
    /// 32-bit domain
    pub fn field_values(&self) -> Result<[u32; ORDER_FIELD_COUNT]> {
        let raw = [
            self.order_id,
            u64::from(self.order_type.code()),
            self.quantity,
            self.price_cents,
            self.commodity_symbol_code,
        ];

        let mut values = [0u32; ORDER_FIELD_COUNT];
        for ((slot, value), field) in values.iter_mut().zip(raw).zip(ORDER_FIELDS) {
            *slot = narrow(field, value)?;
        }
        Ok(values)
    }
}

/// Ciphertext handles plus the proof binding them to (contract, account)
///
/// Built once per submission attempt and consumed by the contract write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBundle<const N: usize> {
    pub handles: [B256; N],
    pub proof: Bytes,
}

impl<const N: usize> EncryptedBundle<N> {
    pub fn proof_hex(&self) -> String {
        proof_to_hex(&self.proof)
    }

    pub fn handle_hex(&self) -> [String; N] {
        self.handles.map(|h| h.to_string())
    }
}

pub type EncryptedOrderBundle = EncryptedBundle<ORDER_FIELD_COUNT>;

/// Plaintext recovered from an order's on-chain handles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptedOrder {
    pub order_id: u32,
    pub order_type: OrderType,
    pub quantity: u32,
    pub price_dollars: f64,
    pub commodity_symbol_code: u32,
    /// `false` only on placeholder records
    pub success: bool,
}

impl DecryptedOrder {
    /// Zeroed record standing in for an order that could not be decrypted
    pub fn placeholder(order_id: u64) -> Self {
        Self {
            order_id: u32::try_from(order_id).unwrap_or(u32::MAX),
            order_type: OrderType::Buy,
            quantity: 0,
            price_dollars: 0.0,
            commodity_symbol_code: 0,
            success: false,
        }
    }

    pub fn commodity_symbol(&self) -> String {
        crate::codec::decode_symbol(self.commodity_symbol_code)
    }
}

/// Result of a decryption that may have degraded to placeholder data
///
/// Callers must branch on the tag; a placeholder is never authentic.
#[derive(Debug, Clone, PartialEq)]
pub enum DecryptOutcome<T> {
    Real(T),
    Placeholder { record: T, reason: String },
}

impl<T> DecryptOutcome<T> {
    pub fn is_real(&self) -> bool {
        matches!(self, DecryptOutcome::Real(_))
    }

    pub fn record(&self) -> &T {
        match self {
            DecryptOutcome::Real(record) | DecryptOutcome::Placeholder { record, .. } => record,
        }
    }

    /// The record, only if it was really decrypted
    pub fn real(self) -> Option<T> {
        match self {
            DecryptOutcome::Real(record) => Some(record),
            DecryptOutcome::Placeholder { .. } => None,
        }
    }
}

pub(crate) fn narrow(field: &'static str, value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| TradingError::out_of_range(field, value))
}

/// `floor(dollars * 100)`, rejecting anything outside the unsigned 32-bit domain
pub(crate) fn dollars_to_cents(field: &'static str, dollars: f64) -> Result<u64> {
    let cents = (dollars * PRICE_SCALE).floor();
    if !cents.is_finite() || cents < 0.0 || cents > MAX_FIELD_VALUE as f64 {
        return Err(TradingError::out_of_range(field, cents));
    }
    Ok(cents as u64)
}
